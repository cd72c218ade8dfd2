//! Configuration file parser for ~/.config/atomfeed/config.toml.
//!
//! The config file is optional: a missing file yields `Config::default()`.
//! Unknown keys are ignored by serde, though we log a warning when the file
//! contains potential typos.
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::atom::tree::output_encoding;
use crate::atom::Mode;
use crate::fetch::FetchOptions;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),

    /// `encoding` names an encoding documents cannot be written in.
    #[error("Unsupported output encoding: {0}")]
    UnsupportedEncoding(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Validation mode used when reading feeds ("strict" or "lenient").
    pub mode: Mode,

    /// Encoding name written into the XML declaration.
    pub encoding: String,

    /// Indentation width for written XML. 0 = compact output.
    pub indent: usize,

    /// Per-request timeout for remote feeds, in seconds.
    pub fetch_timeout_secs: u64,

    /// Largest accepted remote feed body, in bytes.
    pub max_feed_bytes: usize,

    /// Retries after HTTP 429 / 5xx responses.
    pub max_retries: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: Mode::Lenient,
            encoding: "utf-8".to_string(),
            indent: 2,
            fetch_timeout_secs: 30,
            max_feed_bytes: 10 * 1024 * 1024,
            max_retries: 3,
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: &'static [&'static str] = &[
        "mode",
        "encoding",
        "indent",
        "fetch_timeout_secs",
        "max_feed_bytes",
        "max_retries",
    ];

    /// Default location: `$HOME/.config/atomfeed/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        let home = std::env::var_os("HOME")?;
        Some(
            PathBuf::from(home)
                .join(".config")
                .join("atomfeed")
                .join("config.toml"),
        )
    }

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // File deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        Self::from_toml(&content, path)
    }

    fn from_toml(content: &str, path: &Path) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(content)?;
        if let Some(label) = config.declared_encoding() {
            output_encoding(label)
                .map_err(|_| ConfigError::UnsupportedEncoding(label.to_string()))?;
        }
        tracing::info!(path = %path.display(), mode = ?config.mode, "Loaded configuration");
        Ok(config)
    }

    /// Encoding for the XML declaration, `None` when configured empty.
    pub fn declared_encoding(&self) -> Option<&str> {
        Some(self.encoding.as_str()).filter(|e| !e.is_empty())
    }

    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            timeout: Duration::from_secs(self.fetch_timeout_secs),
            max_bytes: self.max_feed_bytes,
            max_retries: self.max_retries,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
