//! Configuration management for WilTV
//!
//! Handles config file loading/saving and environment overrides.
//! Config is stored at ~/.config/wiltv/config.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::DEFAULT_BASE_URL;
use crate::focus::FocusSettings;
use crate::paging::DEFAULT_PAGE_SIZE;
use crate::player::PlayerType;

/// Environment variable overriding the API base URL
pub const API_URL_ENV: &str = "WILTV_API_URL";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// REST API base URL
    pub api_base_url: String,
    /// Items requested per page
    pub page_size: u32,
    /// Name reported to the service at login
    pub device_name: String,
    /// Local media player used for playback
    pub player: PlayerType,
    /// Focus restoration timing
    pub focus: FocusConfig,
}

/// Focus restoration timing in milliseconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FocusConfig {
    pub settle_delay_ms: u64,
    pub retry_delay_ms: u64,
    pub max_retries: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            device_name: "WilTV Terminal".to_string(),
            player: PlayerType::default(),
            focus: FocusConfig::default(),
        }
    }
}

impl Default for FocusConfig {
    fn default() -> Self {
        let settings = FocusSettings::default();
        Self {
            settle_delay_ms: settings.settle_delay.as_millis() as u64,
            retry_delay_ms: settings.retry_delay.as_millis() as u64,
            max_retries: settings.max_retries,
        }
    }
}

impl FocusConfig {
    pub fn settings(&self) -> FocusSettings {
        FocusSettings {
            settle_delay: Duration::from_millis(self.settle_delay_ms),
            retry_delay: Duration::from_millis(self.retry_delay_ms),
            max_retries: self.max_retries,
        }
    }
}

impl Config {
    /// Get config file path (~/.config/wiltv/config.toml)
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("wiltv").join("config.toml"))
    }

    /// Load config from the default path, or return default if not found
    pub fn load() -> Self {
        Self::path()
            .and_then(|p| std::fs::read_to_string(p).ok())
            .and_then(|s| toml::from_str::<Config>(&s).ok())
            .unwrap_or_default()
            .with_env_overrides()
    }

    /// Load config from an explicit path; unlike [`Config::load`] errors are reported
    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read {}", path.display()))?;
        let config: Config =
            toml::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;
        Ok(config.with_env_overrides())
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                self.api_base_url = url;
            }
        }
        self
    }
}
