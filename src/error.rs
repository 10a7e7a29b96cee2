use config::ConfigError;
use tracing_subscriber::util::TryInitError;

/// [Error] is the error type of the metrics publisher. Publishing itself never fails, so these
/// errors only surface while constructing metrics or setting up the application logging.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A [EmptyMetricType] error indicates that a custom metric was requested with an empty type.
    /// The type is used as the logger name and therefore has to be non-empty.
    #[error("metric type must not be empty")]
    EmptyMetricType,

    /// A [Config] error wraps a [ConfigError] (e.g. the configuration file could not be parsed).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A [Init] error wraps a [TryInitError]. It indicates that a global default subscriber was
    /// already installed.
    #[error(transparent)]
    Init(#[from] TryInitError),
}
