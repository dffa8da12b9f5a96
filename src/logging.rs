//! Tracing setup for the bridge and its host binary.
//!
//! Diagnostics go to stderr so that script `print` output on stdout stays
//! clean for piping. `RUST_LOG` overrides the configured level.
//!
//! # Example
//! ```no_run
//! use pnr_script::{config::BridgeConfig, logging};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BridgeConfig::load()?;
//! logging::init_from_config(&config)?;
//! tracing::info!(arch = %config.arch, "bridge starting");
//! # Ok(())
//! # }
//! ```

use std::io::IsTerminal;

use serde::{Deserialize, Serialize};
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::BridgeConfig;

/// Output format for log events
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Multi-line, colored when stderr is a terminal (for development)
    #[default]
    Pretty,
    /// One line per event, no colors
    Compact,
    /// JSON objects for log aggregation
    Json,
}

/// Logging options
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Default level when `RUST_LOG` is unset
    pub level: Level,
    /// Output format
    pub format: LogFormat,
    /// Whether to include file and line numbers
    pub with_file_and_line: bool,
    /// Whether to enable ANSI colors (only for Pretty format)
    pub with_ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::Pretty,
            with_file_and_line: false,
            with_ansi: std::io::stderr().is_terminal(),
        }
    }
}

impl LoggingConfig {
    /// Build logging options from the bridge configuration
    pub fn from_bridge_config(config: &BridgeConfig) -> Result<Self, String> {
        Ok(Self {
            level: parse_log_level(&config.log.level)?,
            format: config.log.format,
            ..Default::default()
        })
    }

    /// Settings at `level` with the default format.
    pub fn new(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    /// Use `format` for console output.
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Raise the level by `steps` (one per `-v` on the command line).
    pub fn with_verbosity(mut self, steps: u8) -> Self {
        for _ in 0..steps {
            self.level = if self.level == Level::ERROR {
                Level::WARN
            } else if self.level == Level::WARN {
                Level::INFO
            } else if self.level == Level::INFO {
                Level::DEBUG
            } else {
                Level::TRACE
            };
        }
        self
    }
}

/// Initialize logging from the bridge configuration
pub fn init_from_config(config: &BridgeConfig) -> Result<(), String> {
    init(LoggingConfig::from_bridge_config(config)?)
}

/// Install the global subscriber.
///
/// Idempotent: a subscriber that is already installed (common in tests) is
/// left in place and `Ok(())` is returned.
pub fn init(config: LoggingConfig) -> Result<(), String> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_to_filter_string(config.level)));

    let layer = match config.format {
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_writer(std::io::stderr)
            .with_file(config.with_file_and_line)
            .with_line_number(config.with_file_and_line)
            .with_ansi(config.with_ansi)
            .with_filter(env_filter)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .with_file(config.with_file_and_line)
            .with_line_number(config.with_file_and_line)
            .with_ansi(false)
            .with_filter(env_filter)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_file(config.with_file_and_line)
            .with_line_number(config.with_file_and_line)
            .with_filter(env_filter)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(layer)
        .try_init()
        .or_else(|e| {
            if tracing::dispatcher::has_been_set() {
                Ok(())
            } else {
                Err(format!("Failed to initialize logging: {}", e))
            }
        })
}

/// Parse log level string into tracing Level
fn parse_log_level(level: &str) -> Result<Level, String> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(format!(
            "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
            level
        )),
    }
}

fn level_to_filter_string(level: Level) -> String {
    level.as_str().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_level() {
        assert!(matches!(parse_log_level("trace"), Ok(Level::TRACE)));
        assert!(matches!(parse_log_level("warn"), Ok(Level::WARN)));
        assert!(matches!(parse_log_level("Debug"), Ok(Level::DEBUG)));
        assert!(parse_log_level("invalid").is_err());
    }

    #[test]
    fn test_from_bridge_config() {
        let mut bridge = BridgeConfig::default();
        bridge.log.level = "error".to_string();
        bridge.log.format = LogFormat::Compact;

        let config = LoggingConfig::from_bridge_config(&bridge).unwrap();
        assert_eq!(config.level, Level::ERROR);
        assert_eq!(config.format, LogFormat::Compact);
    }

    #[test]
    fn test_verbosity_saturates_at_trace() {
        assert_eq!(LoggingConfig::new(Level::WARN).with_verbosity(1).level, Level::INFO);
        assert_eq!(LoggingConfig::new(Level::INFO).with_verbosity(5).level, Level::TRACE);
        assert_eq!(LoggingConfig::new(Level::ERROR).with_verbosity(0).level, Level::ERROR);
    }

    #[test]
    fn test_format_names() {
        let format: LogFormat = serde_json::from_str("\"json\"").unwrap();
        assert_eq!(format, LogFormat::Json);
    }
}
