//! Configuration loading and representation.
//!
//! Everything is read from the process environment once at startup:
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `USE_PERSISTENT_STORES` | `false` | Postgres stores instead of in-memory ones |
//! | `DATABASE_URL` | unset | required when persistent stores are enabled |
//! | `DATABASE_MAX_CONNECTIONS` | `5` | pool size |
//! | `STOREFRONT_DUPLICATE_LINES` | `merge` | `merge` or `reject` repeated products in a request |

use thiserror::Error;

use storefront_sales::DuplicateLinePolicy;

pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },

    #[error("{0} must be set when USE_PERSISTENT_STORES=true")]
    Missing(&'static str),
}

/// Database connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    /// `Some` when persistent (Postgres) stores are enabled.
    pub database: Option<DatabaseConfig>,
    pub duplicate_lines: DuplicateLinePolicy,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup (tests inject a map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let use_persistent = match lookup("USE_PERSISTENT_STORES") {
            Some(raw) => raw.trim().parse::<bool>().map_err(|e| ConfigError::Invalid {
                key: "USE_PERSISTENT_STORES",
                message: e.to_string(),
            })?,
            None => false,
        };

        let database = if use_persistent {
            let url = lookup("DATABASE_URL")
                .filter(|u| !u.trim().is_empty())
                .ok_or(ConfigError::Missing("DATABASE_URL"))?;
            let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
                Some(raw) => raw.trim().parse::<u32>().map_err(|e| ConfigError::Invalid {
                    key: "DATABASE_MAX_CONNECTIONS",
                    message: e.to_string(),
                })?,
                None => DEFAULT_MAX_CONNECTIONS,
            };
            Some(DatabaseConfig {
                url,
                max_connections,
            })
        } else {
            None
        };

        let duplicate_lines = match lookup("STOREFRONT_DUPLICATE_LINES") {
            Some(raw) => raw.parse::<DuplicateLinePolicy>().map_err(|e| {
                ConfigError::Invalid {
                    key: "STOREFRONT_DUPLICATE_LINES",
                    message: e.to_string(),
                }
            })?,
            None => DuplicateLinePolicy::default(),
        };

        Ok(Self {
            database,
            duplicate_lines,
        })
    }

    pub fn use_persistent_stores(&self) -> bool {
        self.database.is_some()
    }
}
