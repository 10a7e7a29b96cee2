//! The metric module provides [Metric], a named set of attributes that is published as a single log
//! record. The attributes are not part of the message but are put into the diagnostic
//! [context](crate::context) for the duration of the emission, so that any context aware formatter
//! or appender can pick them up as a map.
//!
//! ```
//! use metrics_publisher::Metric;
//!
//! Metric::functional("order placed")
//!     .add_attribute("orderId", "1234")
//!     .add_attribute("items", 3)
//!     .publish();
//! ```

use crate::context::{self, ContextMap};
use crate::error::Error;
use crate::logger::{Logger, get_logger};
use std::collections::btree_map;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::trace;

/// The type of [functional](Metric::functional) metrics.
pub const FUNCTIONAL_TYPE: &str = "FUNCTIONAL";

/// The type of [technical](Metric::technical) metrics.
pub const TECHNICAL_TYPE: &str = "TECHNICAL";

/// The reserved attribute holding the metric name.
pub const NAME_ATTRIBUTE: &str = "metricName";

/// The reserved attribute holding the metric type.
pub const TYPE_ATTRIBUTE: &str = "metricType";

/// The message of every published record. The payload lives in the context.
pub const PUBLISH_MESSAGE: &str = "publishing metric..";

/// [Metric] is a named metric of some type with a set of attributes. The name and type are stored
/// as the reserved attributes [NAME_ATTRIBUTE] and [TYPE_ATTRIBUTE], and the type names the
/// [Logger] that the metric is published on.
///
/// Attributes are first-writer-wins: once a key is present, later values for it are ignored. This
/// includes the reserved attributes. A metric can be shared between threads; adding attributes
/// and publishing are serialized per instance.
#[derive(Debug)]
pub struct Metric {
    name: String,
    kind: String,
    attributes: Mutex<ContextMap>,
    logger: Logger,
}

impl Metric {
    fn new(name: String, kind: String) -> Self {
        let attributes = ContextMap::from([
            (NAME_ATTRIBUTE.to_string(), Some(name.clone())),
            (TYPE_ATTRIBUTE.to_string(), Some(kind.clone())),
        ]);
        let logger = get_logger(&kind);
        Metric {
            name,
            kind,
            attributes: Mutex::new(attributes),
            logger,
        }
    }

    /// Creates a metric of the type [FUNCTIONAL_TYPE].
    pub fn functional(name: impl Into<String>) -> Self {
        Self::new(name.into(), FUNCTIONAL_TYPE.to_string())
    }

    /// Creates a metric of the type [TECHNICAL_TYPE].
    pub fn technical(name: impl Into<String>) -> Self {
        Self::new(name.into(), TECHNICAL_TYPE.to_string())
    }

    /// Creates a metric with a custom type.
    ///
    /// # Panics
    ///
    /// Panics if the type is empty. Use [Metric::try_custom] for types that are not known to be
    /// valid.
    pub fn custom(name: impl Into<String>, kind: impl Into<String>) -> Self {
        let kind = kind.into();
        assert!(!kind.is_empty(), "metric type must not be empty");
        Self::new(name.into(), kind)
    }

    /// Creates a metric with a custom type.
    ///
    /// # Errors
    ///
    /// - [Error::EmptyMetricType] if the type is empty.
    pub fn try_custom(name: impl Into<String>, kind: impl Into<String>) -> Result<Self, Error> {
        let kind = kind.into();
        if kind.is_empty() {
            return Err(Error::EmptyMetricType);
        }
        Ok(Self::new(name.into(), kind))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The type of the metric, which is also the name of its [Logger].
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Adds the attribute if no attribute with that key exists yet. A [None] key is ignored, a
    /// [None] value is stored as a null value. Returns the metric itself to allow chained calls.
    pub fn add_attribute(
        &self,
        key: impl IntoAttributeKey,
        value: impl IntoAttributeValue,
    ) -> &Self {
        if let Some(key) = key.into_attribute_key() {
            self.lock()
                .entry(key)
                .or_insert_with(|| value.into_attribute_value());
        }
        self
    }

    /// Same as [Metric::add_attribute], but takes and returns the metric by value.
    pub fn with_attribute(
        self,
        key: impl IntoAttributeKey,
        value: impl IntoAttributeValue,
    ) -> Self {
        self.add_attribute(key, value);
        self
    }

    /// Returns a read-only snapshot of the current attributes.
    pub fn attributes(&self) -> Attributes {
        Attributes {
            entries: self.lock().clone(),
        }
    }

    /// Publishes the metric as a single `INFO` record on its [Logger]. All attributes are put into
    /// the diagnostic context while the record is emitted, overwriting entries with the same key.
    /// Afterward, the context that was present before is reinstated (or cleared, if there was none),
    /// even if the subscriber panics.
    pub fn publish(&self) {
        let attributes = self.lock();
        let guard = context::overlay(attributes.iter());
        self.logger.info(PUBLISH_MESSAGE);
        drop(guard);
        trace!(metric = %self.name, kind = %self.kind, "published metric");
    }

    fn lock(&self) -> MutexGuard<'_, ContextMap> {
        // the map stays consistent even if a holder panicked
        self.attributes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// [Attributes] is a read-only snapshot of the attributes of a [Metric]. It offers no way to modify
/// the entries:
///
/// ```compile_fail
/// use metrics_publisher::Metric;
///
/// let metric = Metric::custom("An event", "custom");
/// metric.attributes().insert("someKey", "someValue");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attributes {
    entries: ContextMap,
}

impl Attributes {
    /// Returns the value of the attribute. [None] if the attribute is absent or its value is null.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key)?.as_deref()
    }

    /// Returns the raw entry of the attribute, distinguishing absent attributes (outer [None]) from
    /// null values (inner [None]).
    pub fn get_entry(&self, key: &str) -> Option<Option<&str>> {
        self.entries.get(key).map(Option::as_deref)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates the attributes ordered by key.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_deref()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Returns an owned copy of the attributes.
    pub fn to_map(&self) -> ContextMap {
        self.entries.clone()
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = (&'a String, &'a Option<String>);
    type IntoIter = btree_map::Iter<'a, String, Option<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// [IntoAttributeKey] converts a value into an attribute key. [None] keys are ignored by the
/// attribute setters.
pub trait IntoAttributeKey {
    fn into_attribute_key(self) -> Option<String>;
}

impl IntoAttributeKey for &str {
    fn into_attribute_key(self) -> Option<String> {
        Some(self.to_string())
    }
}

impl IntoAttributeKey for String {
    fn into_attribute_key(self) -> Option<String> {
        Some(self)
    }
}

impl IntoAttributeKey for &String {
    fn into_attribute_key(self) -> Option<String> {
        Some(self.clone())
    }
}

impl<K: IntoAttributeKey> IntoAttributeKey for Option<K> {
    fn into_attribute_key(self) -> Option<String> {
        self.and_then(IntoAttributeKey::into_attribute_key)
    }
}

/// [IntoAttributeValue] converts a value into a (nullable) attribute value. Primitive values are
/// rendered with their [Display](std::fmt::Display) implementation.
pub trait IntoAttributeValue {
    fn into_attribute_value(self) -> Option<String>;
}

impl IntoAttributeValue for &str {
    fn into_attribute_value(self) -> Option<String> {
        Some(self.to_string())
    }
}

impl IntoAttributeValue for String {
    fn into_attribute_value(self) -> Option<String> {
        Some(self)
    }
}

impl IntoAttributeValue for &String {
    fn into_attribute_value(self) -> Option<String> {
        Some(self.clone())
    }
}

impl<V: IntoAttributeValue> IntoAttributeValue for Option<V> {
    fn into_attribute_value(self) -> Option<String> {
        self.and_then(IntoAttributeValue::into_attribute_value)
    }
}

macro_rules! display_attribute_value {
    ($($ty:ty),*) => {
        $(
            impl IntoAttributeValue for $ty {
                fn into_attribute_value(self) -> Option<String> {
                    Some(self.to_string())
                }
            }
        )*
    };
}

display_attribute_value!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64
);

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn entries(attributes: &Attributes) -> Vec<(&str, Option<&str>)> {
        attributes.iter().collect()
    }

    #[test]
    fn new_functional() {
        // when
        let metric = Metric::functional("An event");

        // then
        assert_eq!(
            vec![
                ("metricName", Some("An event")),
                ("metricType", Some("FUNCTIONAL"))
            ],
            entries(&metric.attributes())
        );
        assert_eq!("FUNCTIONAL", metric.logger().name());
    }

    #[test]
    fn new_technical() {
        // when
        let metric = Metric::technical("An event");

        // then
        assert_eq!(
            vec![
                ("metricName", Some("An event")),
                ("metricType", Some("TECHNICAL"))
            ],
            entries(&metric.attributes())
        );
        assert_eq!("TECHNICAL", metric.logger().name());
    }

    #[test]
    fn new_custom() {
        // when
        let metric = Metric::custom("An event", "custom");

        // then
        assert_eq!("An event", metric.name());
        assert_eq!("custom", metric.kind());
        assert_eq!("custom", metric.logger().name());
        assert_eq!(
            vec![
                ("metricName", Some("An event")),
                ("metricType", Some("custom"))
            ],
            entries(&metric.attributes())
        );
    }

    #[test]
    #[should_panic(expected = "metric type must not be empty")]
    fn custom_empty_type() {
        Metric::custom("An event", "");
    }

    #[test]
    fn try_custom_empty_type() {
        let result = Metric::try_custom("An event", "");
        assert!(matches!(result, Err(Error::EmptyMetricType)));
    }

    #[test]
    fn try_custom_valid_type() {
        let metric = Metric::try_custom("An event", "custom").unwrap();
        assert_eq!(Some("custom"), metric.attributes().get(TYPE_ATTRIBUTE));
    }

    #[test]
    fn add_attribute() {
        // when
        let metric = Metric::custom("An event", "custom").with_attribute("new", "attribute");

        // then
        assert_eq!(
            vec![
                ("metricName", Some("An event")),
                ("metricType", Some("custom")),
                ("new", Some("attribute"))
            ],
            entries(&metric.attributes())
        );
    }

    #[test]
    fn add_attribute_first_writer_wins() {
        // when
        let metric = Metric::technical("An event")
            .with_attribute("key", "first")
            .with_attribute("key", "second");

        // then
        assert_eq!(Some("first"), metric.attributes().get("key"));
    }

    #[test]
    fn add_attribute_keeps_reserved() {
        // when
        let metric = Metric::technical("An event")
            .with_attribute(NAME_ATTRIBUTE, "other")
            .with_attribute(TYPE_ATTRIBUTE, "other");

        // then
        assert_eq!(Some("An event"), metric.attributes().get(NAME_ATTRIBUTE));
        assert_eq!(Some("TECHNICAL"), metric.attributes().get(TYPE_ATTRIBUTE));
    }

    #[test]
    fn add_attribute_ignores_none_key() {
        // when
        let metric = Metric::technical("An event").with_attribute(None::<&str>, "someValue");

        // then
        assert_eq!(2, metric.attributes().len());
    }

    #[test]
    fn add_attribute_keeps_none_value() {
        // when
        let metric = Metric::technical("An event").with_attribute("empty", None::<String>);

        // then
        assert!(metric.attributes().contains_key("empty"));
        assert_eq!(None, metric.attributes().get("empty"));
        assert_eq!(Some(None), metric.attributes().get_entry("empty"));
    }

    #[test]
    fn add_attribute_displays_primitives() {
        // when
        let metric = Metric::technical("An event")
            .with_attribute("duration", 123_u64)
            .with_attribute("success", true);

        // then
        assert_eq!(Some("123"), metric.attributes().get("duration"));
        assert_eq!(Some("true"), metric.attributes().get("success"));
    }

    #[test]
    fn add_attribute_returns_same_metric() {
        // given
        let metric = Metric::technical("An event");

        // when
        let chained = metric.add_attribute("key", "value");

        // then
        assert!(std::ptr::eq(&metric, chained));
    }

    #[test]
    fn attributes_are_a_snapshot() {
        // given
        let metric = Metric::technical("An event");
        let before = metric.attributes();

        // when
        metric.add_attribute("later", "value");

        // then
        assert!(!before.contains_key("later"));
        assert!(metric.attributes().contains_key("later"));
    }

    #[test]
    fn add_attribute_concurrently() {
        // given
        let metric = Arc::new(Metric::technical("An event"));

        // when
        let handles: Vec<_> = (0..8)
            .map(|index| {
                let metric = Arc::clone(&metric);
                thread::spawn(move || {
                    metric.add_attribute(format!("key{index}"), index);
                    metric.add_attribute("shared", index);
                    metric.publish();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // then
        let attributes = metric.attributes();
        assert_eq!(2 + 8 + 1, attributes.len());
        for index in 0..8 {
            assert_eq!(
                Some(index.to_string().as_str()),
                attributes.get(&format!("key{index}"))
            );
        }
        let shared: u32 = attributes.get("shared").unwrap().parse().unwrap();
        assert!(shared < 8);
    }
}
