//! Configuration file support for pxlabel.
//!
//! This module provides serialization and deserialization of session settings:
//! the class definitions, the file naming rules used when saving, the number
//! of buffered frames and the log level.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::FRAME_NUMBER_FILL;
use crate::model::{ClassCatalog, ClassProperty, default_classes};
use pxlabel_plane::{DEFAULT_BUFFER_LEN, FrameNumber};

/// Log level setting for the engine and tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Token replaced by the directory of the opened file (with trailing separator).
pub const TOKEN_DIR: &str = "{dir}";
/// Token replaced by the file name of the opened file.
pub const TOKEN_NAME: &str = "{name}";
/// Token replaced by the zero-filled frame number.
pub const TOKEN_FRAME: &str = "{frame}";

/// Where an opened image or video lives.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SourceInfo {
    /// Directory, including the trailing separator when not empty
    pub directory: String,
    /// File name without directory
    pub file_name: String,
}

impl SourceInfo {
    /// Split a path into directory and file name.
    pub fn from_path(path: &Path) -> Self {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                format!("{}{}", parent.display(), std::path::MAIN_SEPARATOR)
            }
            _ => String::new(),
        };
        Self {
            directory,
            file_name,
        }
    }
}

/// File naming templates for saved annotations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingRules {
    /// Template for the per-frame identity image
    #[serde(default = "default_image_rule")]
    pub image_file: String,
    /// Template for the session summary
    #[serde(default = "default_summary_rule")]
    pub summary_file: String,
}

fn default_image_rule() -> String {
    format!("{TOKEN_DIR}{TOKEN_NAME}_annotations/{TOKEN_FRAME}.png")
}

fn default_summary_rule() -> String {
    format!("{TOKEN_DIR}{TOKEN_NAME}_annotations/summary.json")
}

impl Default for NamingRules {
    fn default() -> Self {
        Self {
            image_file: default_image_rule(),
            summary_file: default_summary_rule(),
        }
    }
}

impl NamingRules {
    /// File name of the identity image of `frame`.
    pub fn image_file_name(&self, source: &SourceInfo, frame: FrameNumber) -> String {
        let frame = format!("{:0width$}", frame, width = FRAME_NUMBER_FILL);
        Self::expand(&self.image_file, source).replace(TOKEN_FRAME, &frame)
    }

    /// File name of the session summary. Frame tokens are left out.
    pub fn summary_file_name(&self, source: &SourceInfo) -> String {
        Self::expand(&self.summary_file, source).replace(TOKEN_FRAME, "")
    }

    fn expand(rule: &str, source: &SourceInfo) -> String {
        rule.replace(TOKEN_DIR, &source.directory)
            .replace(TOKEN_NAME, &source.file_name)
    }
}

/// Session configuration that can be exported and imported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Number of video frames kept in memory
    #[serde(default = "default_buffer_len")]
    pub buffer_len: usize,

    /// File naming rules
    #[serde(default)]
    pub naming: NamingRules,

    /// Class definitions, in id order (the first one is class 1)
    pub classes: Vec<ClassProperty>,
}

fn default_buffer_len() -> usize {
    DEFAULT_BUFFER_LEN
}

impl SessionConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            log_level: LogLevel::default(),
            buffer_len: default_buffer_len(),
            naming: NamingRules::default(),
            classes: default_classes(),
        }
    }

    /// Build the class catalog described by this configuration.
    pub fn catalog(&self) -> ClassCatalog {
        self.classes.iter().cloned().collect()
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        // Validate version compatibility
        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        Ok(config)
    }

    /// Get the default filename for config export.
    pub fn default_filename() -> &'static str {
        "pxlabel-config.json"
    }

    /// Get the default config file path for auto-load/save.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn default_path() -> Option<std::path::PathBuf> {
        // Try to use XDG config directory, fall back to home directory
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("pxlabel").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home_dir| {
                home_dir
                    .join(".config")
                    .join("pxlabel")
                    .join(Self::default_filename())
            })
        }
    }

    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to a file, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Try to load configuration from the default path.
    /// Returns None if the file doesn't exist or can't be read.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return None;
        }

        match Self::load(&path) {
            Ok(config) => Some(config),
            Err(e) => {
                log::warn!("Failed to load config file {:?}: {}", path, e);
                None
            }
        }
    }

    /// Save configuration to the default path.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_default_path(&self) -> Result<(), ConfigError> {
        let path = Self::default_path().ok_or_else(|| {
            ConfigError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine config directory",
            ))
        })?;
        self.save(&path)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
