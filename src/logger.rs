//! The logger module provides named loggers on top of [tracing]. Tracing only knows static
//! targets, so the name of a [Logger] is attached to every event as the `logger` field.
//! [Record](crate::record::Record) picks this field up as the logger name of the record.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock, Mutex, PoisonError};
use tracing::trace;

/// The name of the event field that carries the logger name.
pub const LOGGER_FIELD: &str = "logger";

/// All loggers that were requested so far, by name.
static LOGGERS: LazyLock<Mutex<HashMap<String, Logger>>> = LazyLock::new(Default::default);

/// Returns the logger with the provided name. Loggers are cached, so requesting the same name twice
/// returns handles to the same logger.
pub fn get_logger(name: &str) -> Logger {
    let mut loggers = LOGGERS.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(logger) = loggers.get(name) {
        return logger.clone();
    }
    trace!(logger_name = name, "creating logger");
    let logger = Logger {
        name: Arc::from(name),
    };
    loggers.insert(name.to_string(), logger.clone());
    logger
}

/// [Logger] is a cheap, cloneable handle of a named logger.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Logger {
    name: Arc<str>,
}

impl Logger {
    /// The name of the logger.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether both handles refer to the same cached logger.
    pub fn ptr_eq(&self, other: &Logger) -> bool {
        Arc::ptr_eq(&self.name, &other.name)
    }

    pub fn debug(&self, message: &str) {
        tracing::debug!(logger = %self.name, "{message}");
    }

    pub fn info(&self, message: &str) {
        tracing::info!(logger = %self.name, "{message}");
    }

    pub fn warn(&self, message: &str) {
        tracing::warn!(logger = %self.name, "{message}");
    }

    pub fn error(&self, message: &str) {
        tracing::error!(logger = %self.name, "{message}");
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Logger").field(&self.name()).finish()
    }
}
