//! Configuration for the prompt-stream driver.
//!
//! This module provides TOML configuration file loading from
//! `~/.prompt-stream/config.toml`.
//!
//! # Configuration File
//!
//! ```toml
//! # Prompt shown below the last printed line
//! prompt = "$ "
//!
//! # Status icon shown before the prompt ("" for none)
//! status_icon = "🧪"
//!
//! # Prompts and icons cycled after every input line
//! prompts = [">>> ", "# ", "$ ", "> "]
//! status_icons = ["⏳", "💀", "🙈"]
//!
//! # Input that ends the session (case-insensitive)
//! quit_command = "quit"
//!
//! # Log level used when PROMPT_STREAM_LOG is not set
//! log_level = "info"
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Directory under the home directory holding config and log files
pub const APP_DIR: &str = ".prompt-stream";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Could not determine home directory")]
    NoHome,
}

/// Main configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Initial prompt
    pub prompt: String,
    /// Initial status icon, empty for none
    pub status_icon: String,
    /// Prompts cycled per input line
    pub prompts: Vec<String>,
    /// Status icons cycled per input line
    pub status_icons: Vec<String>,
    /// Input that ends the session
    pub quit_command: String,
    /// Default log filter
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prompt: "$ ".to_string(),
            status_icon: "🧪".to_string(),
            prompts: vec![">>> ", "# ", "$ ", "> "]
                .into_iter()
                .map(String::from)
                .collect(),
            status_icons: vec!["⏳", "💀", "🙈"]
                .into_iter()
                .map(String::from)
                .collect(),
            quit_command: "quit".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// A missing file gives the defaults; an unreadable or invalid one is an error.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::config_path().ok_or(ConfigError::NoHome)?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_toml_string()?;
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// `~/.prompt-stream/config.toml`
    pub fn config_path() -> Option<PathBuf> {
        app_dir().map(|dir| dir.join("config.toml"))
    }

    /// `~/.prompt-stream/prompt-stream.log`
    pub fn log_path() -> Option<PathBuf> {
        app_dir().map(|dir| dir.join("prompt-stream.log"))
    }

    /// Initial status icon, `None` when disabled
    pub fn initial_icon(&self) -> Option<&str> {
        Some(self.status_icon.as_str()).filter(|icon| !icon.is_empty())
    }

    /// Whether `input` is the quit command
    pub fn is_quit(&self, input: &str) -> bool {
        !self.quit_command.is_empty() && input.trim().eq_ignore_ascii_case(&self.quit_command)
    }
}

fn app_dir() -> Option<PathBuf> {
    home_dir().map(|home| home.join(APP_DIR))
}

// Get home directory
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("USERPROFILE")
        .or_else(|| std::env::var_os("HOME"))
        .map(PathBuf::from)
}
