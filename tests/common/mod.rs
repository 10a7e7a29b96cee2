//! The common module provides common utilities for the integration tests.
//!
//! The biggest contribution is the [TestAppender] that captures all records that are emitted while a
//! closure runs, so that tests can inspect the emitted logger names, messages and contexts.

use metrics_publisher::context::ContextMap;
use metrics_publisher::record::Record;
use std::sync::{Arc, Mutex};
use tracing::level_filters::LevelFilter;
use tracing::{Event, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};

#[derive(Clone, Default)]
pub struct TestAppender {
    records: Arc<Mutex<Vec<Record>>>,
}

impl TestAppender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the closure with this appender installed as the thread default.
    pub fn capture<R>(&self, f: impl FnOnce() -> R) -> R {
        tracing::subscriber::with_default(self.subscriber(), f)
    }

    /// Returns a subscriber that forwards all records of level `INFO` and above to this appender.
    pub fn subscriber(&self) -> impl Subscriber + Send + Sync + use<> {
        tracing_subscriber::registry().with(self.clone().with_filter(LevelFilter::INFO))
    }

    pub fn records(&self) -> Vec<Record> {
        self.records.lock().unwrap().clone()
    }
}

impl<S: Subscriber> Layer<S> for TestAppender {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        self.records.lock().unwrap().push(Record::from_event(event));
    }
}

/// [FailingAppender] panics on every record, like an appender whose backend is unavailable.
#[allow(dead_code)]
pub struct FailingAppender;

impl<S: Subscriber> Layer<S> for FailingAppender {
    fn on_event(&self, _event: &Event<'_>, _ctx: Context<'_, S>) {
        panic!("appender failed");
    }
}

/// Builds a context map from string pairs.
#[allow(dead_code)]
pub fn context_of(pairs: &[(&str, &str)]) -> ContextMap {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), Some(value.to_string())))
        .collect()
}
