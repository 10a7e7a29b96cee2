use serde::Deserializer;
use serde::de::{Error, Unexpected, Visitor};
use std::fmt;
use std::str::FromStr;
use tracing::level_filters::LevelFilter;

/// Deserializer for [LevelFilter] from string. E.g. `info` or `off`.
pub fn parse_level_filter<'de, D>(deserializer: D) -> Result<LevelFilter, D::Error>
where
    D: Deserializer<'de>,
{
    struct LevelFilterVisitor;

    impl Visitor<'_> for LevelFilterVisitor {
        type Value = LevelFilter;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            write!(formatter, "a log level name or number")
        }

        fn visit_str<E>(self, value: &str) -> Result<LevelFilter, E>
        where
            E: Error,
        {
            match LevelFilter::from_str(value) {
                Ok(filter) => Ok(filter),
                Err(_) => Err(Error::invalid_value(
                    Unexpected::Str(value),
                    &"log level string or number",
                )),
            }
        }
    }

    deserializer.deserialize_str(LevelFilterVisitor)
}
