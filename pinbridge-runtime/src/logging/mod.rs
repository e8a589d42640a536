//! Logging infrastructure - structured tracing for registry traffic
//!
//! Design: Uses `tracing` for structured, contextual logging with:
//! - Configurable level from the environment
//! - Zero-cost when disabled
//! - Idempotent initialization (safe to call from every entry point)

use once_cell::sync::OnceCell;
use std::io;
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use crate::registry::{EntryInfo, HandleId, Identity};

pub use tracing::{debug, error, info, trace, warn};

static LOGGER_INITIALIZED: OnceCell<()> = OnceCell::new();

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Default log level
    pub level: Level,
    /// Enable JSON format (vs human-readable)
    pub json_format: bool,
    /// Show span events (enter/exit)
    pub show_spans: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            json_format: false,
            show_spans: false,
        }
    }
}

impl LogConfig {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        // PINBRIDGE_LOG_LEVEL: trace, debug, info, warn, error
        if let Ok(level_str) = std::env::var("PINBRIDGE_LOG_LEVEL") {
            config.level = parse_level(&level_str).unwrap_or(Level::WARN);
        }

        config.json_format = std::env::var("PINBRIDGE_LOG_JSON").is_ok();
        config.show_spans = std::env::var("PINBRIDGE_LOG_SPANS").is_ok();

        config
    }

    /// Verbose config for debugging handle leaks
    pub fn debug() -> Self {
        Self {
            level: Level::TRACE,
            json_format: false,
            show_spans: true,
        }
    }
}

fn parse_level(level: &str) -> Option<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

/// Initialize logging with configuration from the environment
pub fn init() {
    init_with_config(LogConfig::from_env());
}

/// Initialize logging with custom configuration
///
/// Only the first call installs a subscriber. If the host process already
/// installed one, that one wins.
pub fn init_with_config(config: LogConfig) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "pinbridge_runtime={}",
                config.level.as_str().to_lowercase()
            ))
        });

        let span_events = if config.show_spans {
            FmtSpan::ENTER | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        };

        let layer = if config.json_format {
            fmt::layer()
                .with_writer(io::stderr)
                .json()
                .with_span_events(span_events)
                .boxed()
        } else {
            fmt::layer()
                .with_writer(io::stderr)
                .compact()
                .with_span_events(span_events)
                .with_thread_ids(cfg!(debug_assertions))
                .boxed()
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(layer)
            .try_init()
            .ok();
    });
}

/// Check if logging is initialized
pub fn is_initialized() -> bool {
    LOGGER_INITIALIZED.get().is_some()
}

#[inline]
pub fn log_acquire(identity: Identity, handle_id: HandleId, ref_count: u32) {
    trace!(
        event = "acquire",
        identity = %identity,
        handle_id = handle_id.get(),
        ref_count,
        "handle acquired"
    );
}

#[inline]
pub fn log_release(identity: Identity, handle_id: HandleId, remaining: u32) {
    if remaining == 0 {
        trace!(
            event = "unpin",
            identity = %identity,
            handle_id = handle_id.get(),
            "last handle released, object unpinned"
        );
    } else {
        trace!(
            event = "release",
            identity = %identity,
            handle_id = handle_id.get(),
            ref_count = remaining,
            "handle released"
        );
    }
}

#[cold]
pub fn log_protocol_violation(message: &str) {
    error!(event = "protocol_violation", "{}", message);
}

/// Log handles the foreign side never released
pub fn log_leaked_handles(leaked: &[EntryInfo]) {
    for entry in leaked {
        warn!(
            event = "leaked_handle",
            identity = %entry.identity,
            handle_id = entry.handle_id.get(),
            ref_count = entry.ref_count,
            "handle still live at shutdown"
        );
    }
}

pub fn log_runtime_init() {
    info!(event = "runtime_init", "pinbridge runtime initializing");
}

pub fn log_runtime_shutdown(leaked: usize) {
    info!(
        event = "runtime_shutdown",
        leaked_handles = leaked,
        "pinbridge runtime shutting down"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = LogConfig::default();
        assert_eq!(config.level, Level::WARN);
        assert!(!config.json_format);

        let debug_config = LogConfig::debug();
        assert_eq!(debug_config.level, Level::TRACE);
        assert!(debug_config.show_spans);
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("DEBUG"), Some(Level::DEBUG));
        assert_eq!(parse_level("error"), Some(Level::ERROR));
        assert_eq!(parse_level("loud"), None);
    }

    #[test]
    fn test_init_idempotent() {
        init();
        init(); // Should not panic
        assert!(is_initialized());
    }
}
