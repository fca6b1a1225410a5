//! Tracing/logging initialization.
//!
//! JSON lines by default; `STOREFRONT_LOG_FORMAT=pretty` switches to human-readable
//! output for local runs. Filtering follows `RUST_LOG` and falls back to `info`.

use thiserror::Error;
use tracing_subscriber::EnvFilter;

pub const LOG_FORMAT_VAR: &str = "STOREFRONT_LOG_FORMAT";

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown log format '{0}' (expected 'json' or 'pretty')")]
pub struct UnknownLogFormat(pub String);

impl core::str::FromStr for LogFormat {
    type Err = UnknownLogFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            other => Err(UnknownLogFormat(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservabilityConfig {
    pub format: LogFormat,
}

impl ObservabilityConfig {
    pub fn from_env() -> Result<Self, UnknownLogFormat> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, UnknownLogFormat>
    where
        F: Fn(&str) -> Option<String>,
    {
        let format = match lookup(LOG_FORMAT_VAR) {
            Some(raw) => raw.parse()?,
            None => LogFormat::default(),
        };
        Ok(Self { format })
    }
}

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = match config.format {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .with_timer(tracing_subscriber::fmt::time::SystemTime)
            .with_target(false)
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .pretty()
            .try_init(),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_is_the_default() {
        let cfg = ObservabilityConfig::from_lookup(|_| None).unwrap();
        assert_eq!(cfg.format, LogFormat::Json);
    }

    #[test]
    fn format_is_read_case_insensitively() {
        let cfg = ObservabilityConfig::from_lookup(|key| {
            (key == LOG_FORMAT_VAR).then(|| " Pretty ".to_string())
        })
        .unwrap();
        assert_eq!(cfg.format, LogFormat::Pretty);
    }

    #[test]
    fn unknown_format_is_an_error() {
        assert_eq!(
            "xml".parse::<LogFormat>(),
            Err(UnknownLogFormat("xml".to_string()))
        );
    }

    #[test]
    fn init_twice_is_harmless() {
        init(&ObservabilityConfig::default());
        init(&ObservabilityConfig {
            format: LogFormat::Pretty,
        });
    }
}
