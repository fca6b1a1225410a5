//! Infrastructure layer: configuration and store adapters.
//!
//! The domain crates define the store traits; this crate provides the in-memory
//! implementations (tests/dev) and the PostgreSQL ones (production).

pub mod config;
pub mod memory;
pub mod postgres;

pub use config::{AppConfig, ConfigError, DatabaseConfig};
