use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::dispatch::DEFAULT_MAX_ATTEMPTS;
use crate::{mlog_debug, Error, Result};

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-05-20";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Environment variables consulted for the API key, in priority order.
const API_KEY_VARS: &[&str] = &["MAI_API_KEY", "GEMINI_API_KEY"];

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub endpoint: Option<String>,
    pub max_attempts: Option<u32>,
    pub request_timeout_secs: Option<u64>,
}

impl Config {
    pub fn mai_dir() -> Result<PathBuf> {
        Ok(dirs::home_dir().ok_or(Error::NoHomeDir)?.join(".mai"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::mai_dir()?.join("mai.toml"))
    }

    /// Load `~/.mai/mai.toml` and apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Load a config file without environment overrides. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        mlog_debug!("Config::load path={}", path.display());
        if !path.exists() {
            mlog_debug!("Config file not found, using defaults");
            return Ok(Self::default());
        }
        let config: Self = toml::from_str(&fs::read_to_string(path)?)?;
        mlog_debug!(
            "Config loaded: model={:?}, endpoint={:?}, max_attempts={:?}, api_key set={}",
            config.model,
            config.endpoint,
            config.max_attempts,
            config.api_key.is_some()
        );
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        mlog_debug!("Config saved to {}", path.display());
        Ok(())
    }

    /// Overlay the API key from the first non-empty variable `lookup` returns.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let from_env = API_KEY_VARS
            .iter()
            .filter_map(|name| lookup(name))
            .find(|value| !value.trim().is_empty());
        if let Some(key) = from_env {
            self.api_key = Some(key);
        }
    }

    pub fn effective_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(Error::MissingApiKey)
    }

    pub fn effective_model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn effective_endpoint(&self) -> &str {
        self.endpoint
            .as_deref()
            .unwrap_or(DEFAULT_ENDPOINT)
            .trim_end_matches('/')
    }

    pub fn effective_max_attempts(&self) -> u32 {
        self.max_attempts
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_MAX_ATTEMPTS)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .filter(|secs| *secs > 0)
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    /// API key with all but the last four characters hidden, for display.
    /// Keys of four characters or fewer are hidden entirely.
    pub fn masked_api_key(&self) -> String {
        match self.effective_api_key() {
            Ok(key) => {
                let chars: Vec<char> = key.chars().collect();
                if chars.len() <= 4 {
                    return "****".to_string();
                }
                let hidden = chars.len() - 4;
                let tail: String = chars[hidden..].iter().collect();
                format!("{}{}", "*".repeat(hidden.min(8)), tail)
            }
            Err(_) => "(not set)".to_string(),
        }
    }
}
