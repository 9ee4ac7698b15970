//! Configuration management for LineForge.
//!
//! Configuration is loaded from the platform config directory
//! (`.../lineforge/config.toml`) with defaults for every field.

mod plan;
mod types;
mod validate;

pub use plan::*;
pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for LineForge.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Input discovery settings
    pub input: InputConfig,

    /// Pipeline execution settings
    pub pipeline: PipelineConfig,

    /// Stage A settings
    pub preprocess: PreprocessConfig,

    /// Stage B settings
    pub pad: PadConfig,

    /// Stage C settings
    pub trace: TraceConfig,

    /// Stage D settings
    pub export: ExportConfig,

    /// External tool locations
    pub tools: ToolsConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.lineforge.lineforge/config.toml
    /// - Linux: ~/.config/lineforge/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\lineforge\config\config.toml
    ///
    /// Falls back to ~/.lineforge/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "lineforge", "lineforge")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".lineforge").join("config.toml")
            })
    }

    /// Get the resolved per-run log directory (with ~ expansion).
    pub fn log_dir(&self) -> PathBuf {
        expand_tilde(&self.logging.dir)
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

/// Expand a leading `~` in a configured path.
pub(crate) fn expand_tilde(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    let expanded = shellexpand::tilde(&path_str);
    PathBuf::from(expanded.into_owned())
}
