//! HAP controller configuration
//!
//! Loads the knobs the protocol stack needs to behave (HTTP timeouts,
//! GATT MTU/watchdog, TLV limits) from a file, environment overrides, or
//! built-in defaults. Nothing in this crate is HAP-protocol logic —
//! the defaults here just size the transports' own state.
//!
//! # Configuration sources (priority order)
//!
//! 1. **Environment variables**: `HAP_*` prefixed variables override all
//! 2. **Config file**: `hap.toml` in the current directory or `~/.config/hap/`
//! 3. **Defaults**: sensible defaults for interactive use
//!
//! # Example hap.toml
//!
//! ```toml
//! [http]
//! connect_timeout_secs = 10
//! request_timeout_secs = 10
//! max_pipelined_requests = 10
//!
//! [gatt]
//! mtu = 104
//! watchdog_secs = 10
//! max_fragment_retries = 3
//!
//! [tlv]
//! max_chunk_len = 255
//!
//! [logging]
//! level = "info"
//! format = "compact"
//! ```
//!
//! # Environment variable overrides
//!
//! ```bash
//! export HAP_HTTP_REQUEST_TIMEOUT_SECS=20
//! export HAP_GATT_WATCHDOG_SECS=15
//! export HAP_LOGGING_LEVEL=debug
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Errors that can occur during configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file not found.
    #[error("configuration file not found: {0}")]
    FileNotFound(PathBuf),

    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to parse TOML.
    #[error("failed to parse TOML in {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    ValidationError(String),
}

/// Top-level HAP controller configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HapConfig {
    pub http: HttpConfig,
    pub gatt: GattConfig,
    pub tlv: TlvConfig,
    pub logging: LoggingConfig,
}

/// HAP-over-HTTP transport tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Time allowed for the initial TCP connect before giving up.
    pub connect_timeout_secs: u64,
    /// Time allowed for a single request/response before giving up.
    pub request_timeout_secs: u64,
    /// Maximum in-flight requests pipelined on one connection (spec §5).
    pub max_pipelined_requests: usize,
}

/// HAP-over-GATT transport tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GattConfig {
    /// Default encrypted-chunk size assumed before MTU negotiation
    /// completes (spec §4.4 caps the HAP payload at 496 bytes regardless).
    pub mtu: usize,
    /// Seconds before a pending GATT operation is rejected on either
    /// timeout or an unexpected peripheral disconnect (spec §6).
    pub watchdog_secs: u64,
    /// Maximum reassembly retries for a fragmented characteristic write.
    pub max_fragment_retries: u32,
}

/// TLV codec limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TlvConfig {
    /// Maximum bytes per TLV chunk before fragmentation kicks in (spec §4.1).
    pub max_chunk_len: usize,
}

/// Logging configuration. This crate never installs a subscriber —
/// these fields only describe what the caller's own `tracing` setup
/// should look like.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace).
    pub level: String,
    /// Log format (compact, pretty, json).
    pub format: String,
}

impl Default for HapConfig {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            gatt: GattConfig::default(),
            tlv: TlvConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 10,
            request_timeout_secs: 10,
            max_pipelined_requests: 10,
        }
    }
}

impl Default for GattConfig {
    fn default() -> Self {
        Self {
            mtu: 104,
            watchdog_secs: 10,
            max_fragment_retries: 3,
        }
    }
}

impl Default for TlvConfig {
    fn default() -> Self {
        Self { max_chunk_len: 255 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
        }
    }
}

impl HapConfig {
    /// Loads configuration with the following priority:
    /// 1. Environment variables (`HAP_*`)
    /// 2. Config file, if one is found in a standard location
    /// 3. Defaults
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::find_config_file() {
            Some(path) => Self::load_from_file(&path)?,
            None => HapConfig::default(),
        };

        config = Self::apply_env_overrides(config);
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a specific file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::ParseError {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Finds a config file in standard locations:
    /// 1. `./hap.toml` (current directory)
    /// 2. `~/.config/hap/hap.toml`
    fn find_config_file() -> Option<PathBuf> {
        let local_config = PathBuf::from("hap.toml");
        if local_config.exists() {
            return Some(local_config);
        }

        if let Some(home_dir) = dirs::home_dir() {
            let user_config = home_dir.join(".config").join("hap").join("hap.toml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        None
    }

    /// Applies `HAP_*` environment variable overrides on top of whatever
    /// was loaded from file/defaults.
    fn apply_env_overrides(mut config: Self) -> Self {
        if let Ok(secs) = std::env::var("HAP_HTTP_CONNECT_TIMEOUT_SECS") {
            if let Ok(secs) = secs.parse() {
                config.http.connect_timeout_secs = secs;
            }
        }
        if let Ok(secs) = std::env::var("HAP_HTTP_REQUEST_TIMEOUT_SECS") {
            if let Ok(secs) = secs.parse() {
                config.http.request_timeout_secs = secs;
            }
        }
        if let Ok(secs) = std::env::var("HAP_GATT_WATCHDOG_SECS") {
            if let Ok(secs) = secs.parse() {
                config.gatt.watchdog_secs = secs;
            }
        }
        if let Ok(mtu) = std::env::var("HAP_GATT_MTU") {
            if let Ok(mtu) = mtu.parse() {
                config.gatt.mtu = mtu;
            }
        }
        if let Ok(level) = std::env::var("HAP_LOGGING_LEVEL") {
            config.logging.level = level;
        }

        config
    }

    /// Validates configuration values.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.tlv.max_chunk_len == 0 || self.tlv.max_chunk_len > 255 {
            return Err(ConfigError::ValidationError(
                "tlv.max_chunk_len must be between 1 and 255".to_string(),
            ));
        }

        if self.gatt.mtu < 7 {
            return Err(ConfigError::ValidationError(
                "gatt.mtu must be at least 7 bytes (the minimum ATT MTU)".to_string(),
            ));
        }

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "logging.level must be one of: {}",
                valid_levels.join(", ")
            )));
        }

        Ok(())
    }

    /// Saves configuration to a file.
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::ValidationError(format!("failed to serialize config: {e}")))?;

        fs::write(path, toml_string).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn default_config_is_valid() {
        let config = HapConfig::default();
        assert_eq!(config.tlv.max_chunk_len, 255);
        assert_eq!(config.gatt.watchdog_secs, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn loads_from_toml() {
        let toml_content = r#"
[http]
request_timeout_secs = 20

[gatt]
watchdog_secs = 15
"#;
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = HapConfig::load_from_file(temp_file.path()).unwrap();
        assert_eq!(config.http.request_timeout_secs, 20);
        assert_eq!(config.gatt.watchdog_secs, 15);
        // Fields absent from the file keep their defaults.
        assert_eq!(config.tlv.max_chunk_len, 255);
    }

    #[test]
    fn rejects_chunk_len_out_of_range() {
        let mut config = HapConfig::default();
        config.tlv.max_chunk_len = 0;
        assert!(config.validate().is_err());

        config.tlv.max_chunk_len = 256;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_unknown_log_level() {
        let mut config = HapConfig::default();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn save_and_load_roundtrip() {
        let config = HapConfig::default();
        let temp_file = NamedTempFile::new().unwrap();

        config.save_to_file(temp_file.path()).unwrap();
        let loaded = HapConfig::load_from_file(temp_file.path()).unwrap();

        assert_eq!(config.http.request_timeout_secs, loaded.http.request_timeout_secs);
        assert_eq!(config.gatt.mtu, loaded.gatt.mtu);
    }
}
