//! Configuration for the gaimin tools.
//!
//! Settings come from three places, read once at startup:
//! the environment (optionally seeded from `.env`), an optional TOML file at
//! `~/.config/gaimin-tools/config.toml` (or a custom path), and CLI flags,
//! which the binaries apply on top.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::lipsync::{PollOptions, DEFAULT_BASE_URL, DEFAULT_OUTPUT_FILE, DEFAULT_POLL_INTERVAL};
use crate::text2image::DEFAULT_GENERATE_URL;

/// Environment variable holding the lip-sync API key.
pub const LIPSYNC_API_KEY_ENV: &str = "LIPSYNC_API_KEY";

/// Configuration file structure.
#[derive(Debug, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub lipsync: LipsyncConfig,
    #[serde(default)]
    pub text2image: Text2ImageConfig,
}

#[derive(Debug, Deserialize, Default, PartialEq)]
pub struct LipsyncConfig {
    pub base_url: Option<String>,
    pub poll_interval_secs: Option<u64>,
    pub timeout_secs: Option<u64>,
    pub output: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default, PartialEq)]
pub struct Text2ImageConfig {
    pub url: Option<String>,
}

impl Config {
    /// Load configuration from a file path.
    ///
    /// With `None`, the default path is tried and a missing file yields the
    /// default config. An explicit path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (default_path(), false),
        };

        if !path.exists() {
            if explicit {
                return Err(ConfigError::NotFound { path });
            }
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::Io {
            path: path.clone(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse { path, source: e })
    }

    /// Text-to-image endpoint, falling back to the public one.
    pub fn text2image_url(&self) -> String {
        self.text2image
            .url
            .clone()
            .unwrap_or_else(|| DEFAULT_GENERATE_URL.to_string())
    }
}

/// Everything the lip-sync tool needs, resolved once and passed down explicitly.
#[derive(Debug, Clone, PartialEq)]
pub struct LipsyncSettings {
    pub api_key: String,
    pub base_url: String,
    pub output: PathBuf,
    pub poll: PollOptions,
}

impl LipsyncSettings {
    /// Resolve settings from a config file and an environment lookup.
    ///
    /// `lookup` is normally `|k| std::env::var(k).ok()`; taking it as a
    /// parameter keeps the environment out of the rest of the program.
    pub fn resolve<F>(config: &Config, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(LIPSYNC_API_KEY_ENV)
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let lipsync = &config.lipsync;
        Ok(Self {
            api_key,
            base_url: lipsync
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            output: lipsync
                .output
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILE)),
            poll: PollOptions {
                interval: lipsync
                    .poll_interval_secs
                    .map(Duration::from_secs)
                    .unwrap_or(DEFAULT_POLL_INTERVAL),
                timeout: lipsync.timeout_secs.map(Duration::from_secs),
            },
        })
    }
}

/// Load `.env` from the working directory without overriding existing variables.
pub fn load_dotenv() {
    // dotenv::dotenv() returns Err if .env doesn't exist, which is fine
    let _ = dotenv::dotenv();
}

/// Errors that can occur when resolving configuration.
#[derive(Debug)]
pub enum ConfigError {
    MissingApiKey,
    NotFound {
        path: PathBuf,
    },
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MissingApiKey => write!(
                f,
                "{} environment variable is not set.",
                LIPSYNC_API_KEY_ENV
            ),
            ConfigError::NotFound { path } => {
                write!(f, "Config file '{}' does not exist", path.display())
            }
            ConfigError::Io { path, source } => {
                write!(
                    f,
                    "Failed to read config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::Parse { path, source } => {
                write!(
                    f,
                    "Failed to parse config file '{}': {}",
                    path.display(),
                    source
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("gaimin-tools").join("config.toml"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config/gaimin-tools/config.toml")
        })
}
