//! Marquee Logging
//!
//! Structured logging for the Marquee backend on top of `tracing`, configured
//! from the environment.
//!
//! # Usage
//!
//! ```rust
//! use marquee_log::{debug, info, warn};
//!
//! marquee_log::init();
//!
//! info!("Server started on port {}", 3000);
//! let order_id = "order_abc";
//! debug!(%order_id, "Order created");
//! warn!(target: "marquee::payments", "Webhook secret not set");
//! ```
//!
//! # Environment Variables
//!
//! - `MARQUEE_DEBUG=1` - Enable debug logging
//! - `MARQUEE_LOG_LEVEL=trace|debug|info|warn|error|off` - Set log level
//! - `MARQUEE_LOG_FORMAT=json|pretty|compact` - Set output format (default `json`)
//! - `MARQUEE_LOG_COLOR=1|0` - Enable/disable colors
//! - `MARQUEE_LOG_MODULE=1|0` - Include the event target
//! - `RUST_LOG` - Full filter directive, overrides the level when set

use once_cell::sync::OnceCell;
use std::env;
use tracing_subscriber::EnvFilter;

pub use tracing::{debug, error, info, trace, warn};

// ============================================================================
// Log Levels
// ============================================================================

/// Log level for Marquee logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
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
    /// Get level from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Some(Level::Trace),
            "debug" => Some(Level::Debug),
            "info" => Some(Level::Info),
            "warn" | "warning" => Some(Level::Warn),
            "error" => Some(Level::Error),
            "off" | "none" => Some(Level::Off),
            _ => None,
        }
    }

    /// Directive understood by `EnvFilter`.
    pub fn as_filter(&self) -> &'static str {
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

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_filter().to_uppercase())
    }
}

// ============================================================================
// Log Format
// ============================================================================

/// Output format for log messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Multi-line human-readable format
    Pretty,
    /// Compact single-line format
    Compact,
    /// JSON format for structured logging
    Json,
}

impl Format {
    /// Get format from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Some(Format::Pretty),
            "compact" => Some(Format::Compact),
            "json" => Some(Format::Json),
            _ => None,
        }
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Whether debug mode is enabled
    pub debug: bool,
    /// Minimum log level
    pub level: Level,
    /// Output format
    pub format: Format,
    /// Whether colors are enabled
    pub color: bool,
    /// Whether to include the event target
    pub module_path: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            debug: false,
            level: Level::Info,
            format: Format::Json,
            color: false,
            module_path: true,
        }
    }
}

impl LogConfig {
    /// Create config from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let flag = |key: &str| {
            lookup(key).map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        };

        let debug = flag("MARQUEE_DEBUG").unwrap_or(false);

        let level = lookup("MARQUEE_LOG_LEVEL")
            .and_then(|s| Level::parse(&s))
            .unwrap_or(if debug { Level::Debug } else { Level::Info });

        let format = lookup("MARQUEE_LOG_FORMAT")
            .and_then(|s| Format::parse(&s))
            .unwrap_or(Format::Json);

        let color = flag("MARQUEE_LOG_COLOR")
            .unwrap_or_else(|| lookup("NO_COLOR").is_none() && lookup("TERM").is_some());

        let module_path = flag("MARQUEE_LOG_MODULE").unwrap_or(true);

        Self {
            debug,
            level: if debug { level.min(Level::Debug) } else { level },
            format,
            // JSON output doesn't use colors
            color: color && format != Format::Json,
            module_path,
        }
    }

    /// Filter honoring `RUST_LOG` when set, else the configured level.
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.level.as_filter()))
    }

    /// Install this configuration as the global subscriber.
    ///
    /// Returns `false` if a global subscriber was already installed.
    pub fn install(&self) -> bool {
        let builder = tracing_subscriber::fmt()
            .with_env_filter(self.env_filter())
            .with_ansi(self.color)
            .with_target(self.module_path)
            .with_writer(std::io::stderr);

        let result = match self.format {
            #[cfg(feature = "json")]
            Format::Json => builder.json().try_init(),
            #[cfg(not(feature = "json"))]
            Format::Json => builder.compact().try_init(),
            Format::Pretty => builder.pretty().try_init(),
            Format::Compact => builder.compact().try_init(),
        };

        result.is_ok()
    }
}

// ============================================================================
// Public API
// ============================================================================

static CONFIG: OnceCell<LogConfig> = OnceCell::new();

/// Initialize logging from the environment.
///
/// Safe to call more than once; only the first call installs a subscriber.
pub fn init() -> &'static LogConfig {
    init_with(LogConfig::from_env())
}

/// Initialize logging with an explicit configuration.
pub fn init_with(config: LogConfig) -> &'static LogConfig {
    CONFIG.get_or_init(|| {
        config.install();
        config
    })
}

/// Configuration the logger was initialized with, if any.
pub fn config() -> Option<&'static LogConfig> {
    CONFIG.get()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> LogConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        LogConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_level_ordering() {
        assert!(Level::Trace < Level::Debug);
        assert!(Level::Debug < Level::Info);
        assert!(Level::Info < Level::Warn);
        assert!(Level::Warn < Level::Error);
        assert!(Level::Error < Level::Off);
    }

    #[test]
    fn test_level_parse() {
        assert_eq!(Level::parse("debug"), Some(Level::Debug));
        assert_eq!(Level::parse("DEBUG"), Some(Level::Debug));
        assert_eq!(Level::parse("warning"), Some(Level::Warn));
        assert_eq!(Level::parse("invalid"), None);
        assert_eq!(Level::Warn.to_string(), "WARN");
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(Format::parse("pretty"), Some(Format::Pretty));
        assert_eq!(Format::parse("Compact"), Some(Format::Compact));
        assert_eq!(Format::parse("json"), Some(Format::Json));
        assert_eq!(Format::parse("xml"), None);
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.level, Level::Info);
        assert_eq!(config.format, Format::Json);
        assert!(!config.color);
        assert!(config.module_path);
    }

    #[test]
    fn test_debug_flag_lowers_level() {
        let config = config_from(&[("MARQUEE_DEBUG", "true"), ("MARQUEE_LOG_LEVEL", "warn")]);
        assert!(config.debug);
        assert_eq!(config.level, Level::Debug);

        let config = config_from(&[("MARQUEE_DEBUG", "1"), ("MARQUEE_LOG_LEVEL", "trace")]);
        assert_eq!(config.level, Level::Trace);
    }

    #[test]
    fn test_color_only_for_text_formats() {
        let config = config_from(&[("MARQUEE_LOG_COLOR", "1")]);
        assert!(!config.color);

        let config = config_from(&[("MARQUEE_LOG_COLOR", "1"), ("MARQUEE_LOG_FORMAT", "pretty")]);
        assert!(config.color);
    }

    #[test]
    fn test_init_is_idempotent() {
        let first = init_with(LogConfig::default()) as *const LogConfig;
        let second = init() as *const LogConfig;
        assert_eq!(first, second);
        assert!(config().is_some());

        // Macros resolve through the re-exports
        info!("info message");
        debug!(order_id = "order_abc", "debug message");
        warn!(target: "test", "with target");
    }
}
