//! Logging configuration and initialization.

use std::env;

use cloudcall_domain::{CloudCallError, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Multi-line, human-readable
    #[default]
    Pretty,
    /// Single line per event
    Compact,
    /// One JSON object per event
    Json,
}

impl LogFormat {
    /// Parse a format name; unknown names fall back to [`LogFormat::Pretty`].
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            "compact" => LogFormat::Compact,
            _ => LogFormat::Pretty,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Output format.
    pub format: LogFormat,
    /// Filter used when `RUST_LOG` is not set.
    pub default_level: String,
    /// Include source file and line.
    pub include_location: bool,
    /// Include the module path of the event.
    pub include_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Pretty,
            default_level: "info".to_string(),
            include_location: false,
            include_target: true,
        }
    }
}

impl LogConfig {
    /// Create config from environment variables
    ///
    /// Reads `CLOUDCALL_LOG_FORMAT` (pretty, compact or json) and
    /// `CLOUDCALL_LOG_LEVEL` (fallback when `RUST_LOG` is not set).
    pub fn from_env() -> Self {
        Self {
            format: env::var("CLOUDCALL_LOG_FORMAT")
                .map(|s| LogFormat::parse(&s))
                .unwrap_or_default(),
            default_level: env::var("CLOUDCALL_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            ..Self::default()
        }
    }

    /// JSON output with source locations.
    pub fn json() -> Self {
        Self { format: LogFormat::Json, include_location: true, ..Self::default() }
    }

    /// Single-line output.
    pub fn compact() -> Self {
        Self { format: LogFormat::Compact, ..Self::default() }
    }

    /// Override the fallback filter.
    pub fn with_default_level(mut self, level: impl Into<String>) -> Self {
        self.default_level = level.into();
        self
    }

    /// `RUST_LOG` when set, otherwise the configured default level.
    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.default_level))
    }
}

/// Install the global `tracing` subscriber.
///
/// Request URLs reach the logs only in redacted form, so no output format
/// needs extra scrubbing.
///
/// # Errors
/// [`CloudCallError::Config`] if a global subscriber is already installed.
pub fn init_logging(config: &LogConfig) -> Result<()> {
    let registry = tracing_subscriber::registry().with(config.env_filter());
    let layer = fmt::layer()
        .with_target(config.include_target)
        .with_file(config.include_location)
        .with_line_number(config.include_location);

    let installed = match config.format {
        LogFormat::Json => registry.with(layer.json().with_current_span(true)).try_init(),
        LogFormat::Compact => registry.with(layer.compact()).try_init(),
        LogFormat::Pretty => registry.with(layer.pretty()).try_init(),
    };

    installed.map_err(|e| CloudCallError::Config(format!("failed to install log subscriber: {e}")))
}
