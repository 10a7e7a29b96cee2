use crate::context::{self, ContextMap};
use crate::logger::LOGGER_FIELD;
use std::fmt;
use tracing::field::{Field, Visit};
use tracing::{Event, Level};

/// [Record] is a log record as seen by an appender. It is captured from a [tracing] event together
/// with the diagnostic context of the emitting thread at that moment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// The severity of the record.
    pub level: Level,

    /// The name of the emitting [Logger](crate::logger::Logger). Events that were not emitted by a
    /// named logger use their target instead.
    pub logger: String,

    /// The formatted message of the event.
    pub message: String,

    /// The diagnostic context at the time the event was dispatched.
    pub context: ContextMap,
}

impl Record {
    /// Captures a record from the event. Has to be called while the event is dispatched (e.g. from
    /// a layer or formatter) as the diagnostic context is read from the current thread.
    pub fn from_event(event: &Event<'_>) -> Self {
        let mut visitor = RecordVisitor::default();
        event.record(&mut visitor);
        let metadata = event.metadata();
        Record {
            level: *metadata.level(),
            logger: visitor
                .logger
                .unwrap_or_else(|| metadata.target().to_string()),
            message: visitor.message,
            context: context::snapshot().unwrap_or_default(),
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} - {}", self.level, self.logger, self.message)?;
        for (index, (key, value)) in self.context.iter().enumerate() {
            let separator = if index == 0 { " " } else { ";" };
            write!(f, "{separator}\"{key}={}\"", value.as_deref().unwrap_or_default())?;
        }
        Ok(())
    }
}

#[derive(Default)]
struct RecordVisitor {
    logger: Option<String>,
    message: String,
}

impl Visit for RecordVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            LOGGER_FIELD => self.logger = Some(value.to_string()),
            "message" => self.message = value.to_string(),
            _ => {}
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        match field.name() {
            LOGGER_FIELD => self.logger = Some(format!("{value:?}")),
            "message" => self.message = format!("{value:?}"),
            _ => {}
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn record(context: &[(&str, Option<&str>)]) -> Record {
        Record {
            level: Level::INFO,
            logger: "custom".to_string(),
            message: "publishing metric..".to_string(),
            context: context
                .iter()
                .map(|(key, value)| (key.to_string(), value.map(str::to_string)))
                .collect(),
        }
    }

    #[test]
    fn display_without_context() {
        assert_eq!("INFO custom - publishing metric..", record(&[]).to_string());
    }

    #[test]
    fn display_with_context() {
        // given
        let record = record(&[
            ("duration", Some("123")),
            ("metricName", Some("An event")),
            ("metricType", Some("custom")),
            ("empty", None),
        ]);

        // when
        let line = record.to_string();

        // then
        assert_eq!(
            "INFO custom - publishing metric.. \"duration=123\";\"empty=\";\"metricName=An event\";\"metricType=custom\"",
            line
        );
    }
}
