//! Bridge configuration using Figment
//!
//! Configuration is loaded from:
//! 1. `pnr-script.toml` in the working directory, or the file given with `--config`
//! 2. Environment variables prefixed with `PNR_SCRIPT_` (nested keys split on `__`)
//!
//! Every key has a default, so an absent file yields a usable configuration.
//!
//! # Example
//! ```no_run
//! use pnr_script::config::BridgeConfig;
//!
//! let config = BridgeConfig::load()?;
//! println!("Architecture: {}", config.arch);
//! # Ok::<(), pnr_script::error::ConfigError>(())
//! ```

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::logging::LogFormat;

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "pnr-script.toml";

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "PNR_SCRIPT_";

/// Top-level bridge configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Program name presented to scripts as `pnr::ARGV[0]`
    pub program_name: String,
    /// Fabric family whose identifier types are registered
    pub arch: String,
    /// Operation budget per execution (0 = unlimited)
    pub max_operations: u64,
    /// Maximum script call depth (0 = engine default)
    pub max_call_levels: usize,
    /// Logging settings
    pub log: LogConfig,
    /// Interactive console settings
    pub repl: ReplConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Logging level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format (pretty, compact, json)
    pub format: LogFormat,
}

/// Interactive console configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplConfig {
    /// History file; defaults to the user state directory
    pub history_file: Option<PathBuf>,
    /// Maximum number of history entries kept on disk
    pub history_length: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            program_name: "pnr-script".to_string(),
            arch: "ecp5".to_string(),
            max_operations: 0,
            max_call_levels: 0,
            log: LogConfig::default(),
            repl: ReplConfig::default(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            history_file: None,
            history_length: 4096,
        }
    }
}

const VALID_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl BridgeConfig {
    /// Load configuration from `pnr-script.toml` and environment variables
    ///
    /// Environment variables override the file, e.g.
    /// `PNR_SCRIPT_LOG__LEVEL=debug` or `PNR_SCRIPT_ARCH=ecp5`.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load configuration from a specific file path
    ///
    /// A missing file is not an error; defaults and environment still apply.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config: Self = Self::figment(path.as_ref()).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// The provider chain, exposed so callers can layer further overrides.
    pub fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.program_name.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "program_name",
                reason: "must not be empty".to_string(),
            });
        }

        if self.arch.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "arch",
                reason: "must not be empty".to_string(),
            });
        }

        if crate::scripting::arch::lookup(&self.arch).is_none() {
            return Err(ConfigError::Invalid {
                key: "arch",
                reason: format!(
                    "unknown family '{}', expected one of: {}",
                    self.arch,
                    crate::scripting::arch::available().collect::<Vec<_>>().join(", ")
                ),
            });
        }

        if !VALID_LEVELS.contains(&self.log.level.to_lowercase().as_str()) {
            return Err(ConfigError::Invalid {
                key: "log.level",
                reason: format!(
                    "'{}' is not one of: {}",
                    self.log.level,
                    VALID_LEVELS.join(", ")
                ),
            });
        }

        if self.repl.history_length == 0 {
            return Err(ConfigError::Invalid {
                key: "repl.history_length",
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_are_valid() {
        let config = BridgeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.arch, "ecp5");
        assert_eq!(config.max_operations, 0);
    }

    #[test]
    #[serial]
    fn missing_file_falls_back_to_defaults() {
        let config = BridgeConfig::load_from("does-not-exist.toml").unwrap();
        assert_eq!(config, BridgeConfig::default());
    }

    #[test]
    #[serial]
    fn file_values_are_loaded() {
        let file = write_config(
            r#"
                program_name = "pnr-flow"
                max_operations = 5000

                [log]
                level = "debug"
                format = "json"
            "#,
        );

        let config = BridgeConfig::load_from(file.path()).unwrap();
        assert_eq!(config.program_name, "pnr-flow");
        assert_eq!(config.max_operations, 5000);
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.log.format, LogFormat::Json);
        assert_eq!(config.repl.history_length, 4096);
    }

    #[test]
    #[serial]
    fn env_overrides_file() {
        let file = write_config("[log]\nlevel = \"debug\"\n");
        std::env::set_var("PNR_SCRIPT_LOG__LEVEL", "warn");
        std::env::set_var("PNR_SCRIPT_REPL__HISTORY_LENGTH", "16");

        let result = BridgeConfig::load_from(file.path());

        std::env::remove_var("PNR_SCRIPT_LOG__LEVEL");
        std::env::remove_var("PNR_SCRIPT_REPL__HISTORY_LENGTH");

        let config = result.unwrap();
        assert_eq!(config.log.level, "warn");
        assert_eq!(config.repl.history_length, 16);
    }

    #[test]
    #[serial]
    fn invalid_file_value_is_a_load_error() {
        let file = write_config("max_operations = \"lots\"\n");
        let err = BridgeConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }

    #[test]
    fn invalid_log_level_is_rejected() {
        let mut config = BridgeConfig::default();
        config.log.level = "loud".to_string();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "log.level", .. }));
    }

    #[test]
    fn empty_arch_is_rejected() {
        let mut config = BridgeConfig::default();
        config.arch = " ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_arch_is_rejected() {
        let mut config = BridgeConfig::default();
        config.arch = "ice40".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("unknown family 'ice40'"));
    }
}
