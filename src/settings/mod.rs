//! The settings module defines the logging configuration of applications that publish metrics. It is
//! based on [config], a layered configuration system for Rust applications (with strong support for
//! 12-factor applications).
//!
//! # Layers
//!
//! The configuration consists of up to three layers. Upper layers overwrite lower layer configurations
//! (e.g. environment variables overwrite the default configuration).
//!
//! ## Layer 1 (Environment variables) \[optional\]
//!
//! The environment variables are the top most layer. They can be used to overwrite any previous configuration.
//! Environment variables have the format `[ENV_PREFIX]__[field]__[sub_field]` where `ENV_PREFIX` is
//! an environment variable defaulting to `METRICS_PUBLISHER`. That means, the nested settings field
//! `logging.level` can be overwritten by the environment variable `METRICS_PUBLISHER__LOGGING__LEVEL`.
//!
//! ## Layer 2 (Custom configuration) \[optional\]
//!
//! The next layer is an optional configuration file intended to be used by deployments and local testing. The file
//! location can be configured using the `CONFIG_FILE` environment variable, defaulting to `config/config`.
//! It can be of any file type supported by [config] (e.g. `config/config.toml`).
//!
//! ## Layer 3 (Default configuration)
//!
//! The default configuration provides default value for all settings fields. It is loaded from
//! `config/default.toml` at compile time.
//!
//! # Usage
//!
//! The configuration can be created by using [Settings::new] and then be used to install the
//! global subscriber with [init_logging].
//!
//! ```rs
//! let settings: Settings = Settings::new()?;
//! init_logging(&settings)?;
//! ```

mod parser;

use crate::error::Error;
use crate::format::ContextFormat;
use crate::settings::parser::parse_level_filter;

use std::env;

use config::{Config, ConfigError, Environment, File, FileFormat, Source};
use serde::Deserialize;
use tracing::metadata::LevelFilter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// The default configuration (embedded at compile time).
const DEFAULT_CONFIG: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config/default.toml"));

/// [Logging] hold the log configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Logging {
    /// The log level that should be printed. Directives from `RUST_LOG` take precedence.
    #[serde(deserialize_with = "parse_level_filter")]
    pub level: LevelFilter,

    /// Whether each line should be prefixed with a timestamp.
    pub timestamp: bool,
}

/// [Settings] holds all configuration for the application. I.g. one immutable instance is created
/// on startup.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// The logging configuration.
    pub logging: Logging,
}

impl Settings {
    /// Creates a new application configuration as described in the [module documentation](crate::settings).
    pub fn new() -> Result<Self, ConfigError> {
        // the environment prefix for all `Settings` fields
        let env_prefix = env::var("ENV_PREFIX").unwrap_or("metrics_publisher".into());
        // the path of the custom configuration file
        let config_file = env::var("CONFIG_FILE").unwrap_or("config/config".into());

        Self::from_sources(&env_prefix, File::with_name(&config_file).required(false))
    }

    fn from_sources(
        env_prefix: &str,
        custom: impl Source + Send + Sync + 'static,
    ) -> Result<Self, ConfigError> {
        let s = Config::builder()
            // load default configuration (embedded at compile time)
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            // load custom configuration from file (at runtime)
            .add_source(custom)
            // add in settings from the environment
            // e.g. `METRICS_PUBLISHER__LOGGING__LEVEL=debug` would set the `logging.level` key
            .add_source(Environment::with_prefix(env_prefix).separator("__"))
            .build()?;

        // you can deserialize (and thus freeze) the entire configuration as
        s.try_deserialize()
    }
}

/// Installs the global default subscriber. Events are filtered by `RUST_LOG` directives, falling
/// back to the configured level, and are written to stdout using the [ContextFormat], so published
/// metrics show their attributes.
///
/// # Errors
///
/// - [Error::Init] if a global default subscriber was already installed.
pub fn init_logging(settings: &Settings) -> Result<(), Error> {
    let filter = EnvFilter::builder()
        .with_default_directive(settings.logging.level.into())
        .from_env_lossy();
    let format = ContextFormat::new().with_timestamp(settings.logging.timestamp);

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().event_format(format))
        .try_init()?;
    Ok(())
}
