//! Metrics publisher emits structured metrics through the regular application logging. A [Metric]
//! is a name, a type and a set of string attributes. Publishing the metric puts its attributes into
//! the diagnostic [context] of the current thread, emits exactly one `INFO` record on a
//! [Logger](logger::Logger) named after the metric type and restores the previous context.
//!
//! Any formatter or appender that reads the diagnostic context (e.g. [ContextFormat]) therefore sees
//! the metric as a map of attributes, while the surrounding application context stays untouched.
//!
//! ```
//! use metrics_publisher::Metric;
//!
//! Metric::custom("An event", "custom")
//!     .add_attribute("duration", "123")
//!     .publish();
//! ```
//!
//! Functions can be measured with the [timed] attribute, which publishes a metric with a
//! `duration` attribute (in milliseconds) after each call.
//!
//! This crate does not aggregate, sample or transport metrics. That is up to the log pipeline the
//! records end up in.

pub mod context;
pub mod error;
pub mod format;
pub mod logger;
pub mod metric;
pub mod record;
pub mod settings;

pub use error::Error;
pub use format::ContextFormat;
pub use metric::{Attributes, Metric};
pub use metrics_publisher_macros::timed;
