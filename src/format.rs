use crate::record::Record;
use std::fmt::{self, Write};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::{FormatTime, SystemTime};
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

/// [ContextFormat] is an event formatter for [tracing_subscriber::fmt] that renders each event as a
/// [Record], including the diagnostic context of the emitting thread. Lines look like
///
/// ```text
/// 2024-05-01T12:00:00.000000Z INFO custom - publishing metric.. "duration=123";"metricName=An event";"metricType=custom"
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ContextFormat {
    timestamp: bool,
}

impl ContextFormat {
    pub fn new() -> Self {
        Self { timestamp: true }
    }

    /// Sets whether each line is prefixed with the current system time.
    pub fn with_timestamp(mut self, timestamp: bool) -> Self {
        self.timestamp = timestamp;
        self
    }
}

impl Default for ContextFormat {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, N> FormatEvent<S, N> for ContextFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        if self.timestamp {
            SystemTime.format_time(&mut writer)?;
            writer.write_char(' ')?;
        }
        writeln!(writer, "{}", Record::from_event(event))
    }
}
