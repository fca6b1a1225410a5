//! Tracing and logging (shared setup).

/// Initialize process-wide tracing/logging.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init(config: &ObservabilityConfig) {
    tracing::init(config);
}

/// Tracing configuration (format, filters).
pub mod tracing;

pub use tracing::{LogFormat, ObservabilityConfig, UnknownLogFormat};
