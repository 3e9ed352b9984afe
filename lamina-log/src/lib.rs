//! Lamina Logging
//!
//! Per-invocation plumbing shared by every lamina event source:
//!
//! - **Carrier**: an immutable, copy-on-write value map threaded through the
//!   middleware chain of one invocation.
//! - **Correlation IDs**: attach, read and generate correlation identifiers.
//! - **Structured logging**: a JSON-lines [`Logger`] with static fields that is
//!   attached to the carrier by the logger middleware.
//!
//! # Usage
//!
//! ```rust
//! use lamina_log::{Carrier, Logger, Sink, correlation_id, logger, with_correlation_id, with_logger};
//!
//! let carrier = with_correlation_id(&Carrier::new(), "123abc");
//! assert_eq!(correlation_id(&carrier), "123abc");
//!
//! let carrier = with_logger(&carrier, Logger::new(Sink::stderr(), [("app", "demo")]));
//! logger(&carrier).unwrap().info().msg("hello");
//! ```
//!
//! # Environment Variables
//!
//! - `LAMINA_LOG_LEVEL=trace|debug|info|warn|error|off` - Set log level
//! - `LAMINA_LOG_FORMAT=json|compact` - Set output format
//! - `LAMINA_LOG_TIMESTAMPS=1|0` - Include the `time` field

mod carrier;
mod correlation;
mod logger;

pub use carrier::Carrier;
pub use correlation::{correlation_id, new_correlation_id, with_correlation_id};
pub use logger::{Entry, Logger, Sink, logger, with_logger};

use once_cell::sync::Lazy;
use std::env;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Log Levels
// ============================================================================

/// Log level for lamina loggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Level {
    /// Trace level (most verbose)
    Trace = 0,
    /// Debug level
    Debug = 1,
    /// Info level
    Info = 2,
    /// Warning level
    Warn = 3,
    /// Error level (least verbose)
    Error = 4,
    /// Off (no logging)
    Off = 5,
}

impl Level {
    /// Level name as written in the `level` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Off => "off",
        }
    }
}

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(Level::Trace),
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            "off" | "none" => Ok(Level::Off),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a level name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLevelError(String);

impl fmt::Display for ParseLevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown log level '{}'", self.0)
    }
}

impl std::error::Error for ParseLevelError {}

// ============================================================================
// Log Format
// ============================================================================

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// One JSON object per line (CloudWatch friendly, default)
    Json,
    /// `time LEVEL message key=value ...`
    Compact,
}

impl FromStr for Format {
    type Err = ParseFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "compact" => Ok(Format::Compact),
            _ => Err(ParseFormatError(s.to_string())),
        }
    }
}

/// Returned when a format name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFormatError(String);

impl fmt::Display for ParseFormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown log format '{}'", self.0)
    }
}

impl std::error::Error for ParseFormatError {}

// ============================================================================
// Configuration
// ============================================================================

/// Global configuration (lazy initialized from the environment).
static CONFIG: Lazy<LogConfig> = Lazy::new(LogConfig::from_env);

/// Logging configuration applied to newly created loggers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Minimum level written
    pub level: Level,
    /// Output format
    pub format: Format,
    /// Whether to include the `time` field
    pub timestamps: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::Info,
            format: Format::Json,
            timestamps: true,
        }
    }
}

impl LogConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let level = env::var("LAMINA_LOG_LEVEL")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.level);

        let format = env::var("LAMINA_LOG_FORMAT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.format);

        let timestamps = env::var("LAMINA_LOG_TIMESTAMPS")
            .map(|v| v == "1" || v.to_lowercase() == "true")
            .unwrap_or(defaults.timestamps);

        Self {
            level,
            format,
            timestamps,
        }
    }

    /// Set the minimum level.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set the output format.
    pub fn format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    /// Enable or disable the `time` field.
    pub fn timestamps(mut self, enabled: bool) -> Self {
        self.timestamps = enabled;
        self
    }

    /// Check if a level passes this configuration's threshold.
    #[inline]
    pub fn is_enabled(&self, level: Level) -> bool {
        level != Level::Off && level >= self.level
    }
}

/// Get the global configuration read from the environment.
pub fn config() -> &'static LogConfig {
    &CONFIG
}

// ============================================================================
// Tests
// ============================================================================
