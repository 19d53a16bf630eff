//! TOML configuration.
//!
//! ```toml
//! [stream]
//! end_of_stream = "zero"   # or "none"
//! read_size = 8192
//!
//! [serial]
//! baudRate = 115200
//!
//! [request]
//! filters = [{ usbVendorId = 0x2047 }]
//!
//! [log]
//! filter = "info"
//! ```

use crate::error::{Error, Result};
use crate::hub::{RequestOptions, SerialOptions};
use crate::stream::StreamConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default tracing filter when neither the config nor `RUST_LOG` sets one
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub stream: StreamConfig,
    pub serial: SerialOptions,
    pub request: RequestOptions,
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Config {
    /// `<config dir>/serialhub/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("serialhub").join("config.toml"))
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let wrap = |source: Error| Error::Config {
            path: path.to_path_buf(),
            source: Box::new(source),
        };
        let text = fs::read_to_string(path).map_err(|e| wrap(e.into()))?;
        Self::from_toml_str(&text).map_err(wrap)
    }

    /// Load from [`Config::default_path`] if that file exists, else defaults.
    pub fn load_or_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => {
                tracing::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.stream.validate()?;
        self.serial.validate()?;
        self.request.validate()?;
        Ok(())
    }
}
