use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::{redirect, Client, ClientBuilder};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, RemoteError};
use crate::present::DisplayZone;
use crate::repository::SyncConfig;

const APP_DIR: &str = "readfeed";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReaderConfig {
    pub remote: RemoteConfig,
    pub sync: SyncSettings,
    pub display: DisplayConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RemoteConfig {
    pub base_url: String,
    pub request_timeout_seconds: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SyncSettings {
    pub fetch_timeout_seconds: u64,
    pub retry_attempts: u8,
    pub retry_backoff_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DisplayConfig {
    /// strftime pattern, see `chrono::format::strftime`.
    pub date_pattern: String,
    pub timezone: DisplayZone,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StorageConfig {
    /// Article cache location. `None` keeps it next to the config file.
    pub cache_file: Option<PathBuf>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://medium.com/".to_owned(),
            request_timeout_seconds: 10,
            user_agent: concat!("ReadFeed/", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            fetch_timeout_seconds: 30,
            retry_attempts: 0,
            retry_backoff_ms: 500,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            date_pattern: "%b %d, %Y".to_owned(),
            timezone: DisplayZone::Local,
        }
    }
}

impl RemoteConfig {
    pub fn build_client(&self) -> Result<Client, RemoteError> {
        let client = ClientBuilder::new()
            .redirect(redirect::Policy::limited(5))
            .user_agent(self.user_agent.clone())
            .timeout(Duration::from_secs(self.request_timeout_seconds))
            .build()?;
        Ok(client)
    }
}

impl SyncSettings {
    pub fn to_sync_config(&self) -> SyncConfig {
        SyncConfig {
            fetch_timeout: Duration::from_secs(self.fetch_timeout_seconds),
            max_retries: self.retry_attempts,
            retry_backoff: Duration::from_millis(self.retry_backoff_ms),
        }
    }
}

impl ReaderConfig {
    /// `~/.config/readfeed` on Linux.
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(dir.join(APP_DIR))
    }

    pub fn config_file_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    pub fn cache_file_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.storage.cache_file {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::config_dir()?.join("articles.json")),
        }
    }

    /// Loads the default config file, or falls back to (and tries to save)
    /// the defaults.
    pub fn load() -> Self {
        let loaded = Self::config_file_path().and_then(|path| Self::load_from(&path));
        match loaded {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "unable to load configuration, using defaults");
                let default_config = Self::default();
                if let Err(save_err) = default_config.save() {
                    warn!(error = %save_err, "unable to save default configuration");
                }
                default_config
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
