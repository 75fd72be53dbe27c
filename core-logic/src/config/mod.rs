//! # Client Configuration
//!
//! Process-wide settings that govern every API client created for a run.
//! A run takes one [`ClientConfig`] snapshot and never sees later edits.

use crate::error::{ConfigError, CoreError};
use crate::storage::JsonStore;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

pub const DEFAULT_USER_AGENT: &str =
    "Sky-Live-com.tgc.sky.win/0.28.1.310103 (To Be Filled By O.E.M.; win 10.0.22621; en)";
pub const DEFAULT_BASE_URL: &str = "https://live.radiance.thatgamecompany.com";

pub const MAX_WORKERS_RANGE: (usize, usize) = (1, 20);
pub const MAX_RETRIES_RANGE: (u32, u32) = (1, 10);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub user_agent: String,
    /// Concurrent workers for batch runs (1-20)
    pub max_workers: usize,
    /// Per-request timeout in seconds
    pub request_timeout: u64,
    /// Attempt bound for one logical request (1-10)
    pub max_retries: u32,
    pub base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_workers: 10,
            request_timeout: 10,
            max_retries: 3,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "user_agent".to_string(),
                reason: "User Agent cannot be empty".to_string(),
            });
        }

        let (min_w, max_w) = MAX_WORKERS_RANGE;
        if !(min_w..=max_w).contains(&self.max_workers) {
            return Err(ConfigError::InvalidValue {
                field: "max_workers".to_string(),
                reason: format!("must be {}-{}, got {}", min_w, max_w, self.max_workers),
            });
        }

        if self.request_timeout < 1 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout".to_string(),
                reason: "must be >= 1 second".to_string(),
            });
        }

        let (min_r, max_r) = MAX_RETRIES_RANGE;
        if !(min_r..=max_r).contains(&self.max_retries) {
            return Err(ConfigError::InvalidValue {
                field: "max_retries".to_string(),
                reason: format!("must be {}-{}, got {}", min_r, max_r, self.max_retries),
            });
        }

        self.host()?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// Host component of `base_url`, sent verbatim as the `Host` header.
    pub fn host(&self) -> Result<String, ConfigError> {
        let invalid = || ConfigError::InvalidBaseUrl {
            url: self.base_url.clone(),
        };
        let url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        if url.scheme() != "https" && url.scheme() != "http" {
            return Err(invalid());
        }
        let host = url.host_str().ok_or_else(invalid)?;
        Ok(match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        })
    }

    /// `base_url` with any trailing slash removed, ready for `format!("{}{}", base, path)`.
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

/// Loads and persists [`ClientConfig`] as a JSON document.
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Absent file: defaults are written and returned. Keys missing from the
    /// file are filled from defaults. Corrupt or out-of-range content falls
    /// back to defaults without touching the file.
    pub fn load(&self) -> ClientConfig {
        if !self.path.exists() {
            let config = ClientConfig::default();
            match JsonStore::save(&self.path, &config) {
                Ok(()) => info!("Created default config at {}", self.path.display()),
                Err(e) => warn!("Could not write default config: {}", e),
            }
            return config;
        }

        let Some(config) = JsonStore::load::<ClientConfig>(&self.path) else {
            return ClientConfig::default();
        };

        match config.validate() {
            Ok(()) => config,
            Err(e) => {
                warn!(
                    "Config {} rejected ({}). Using defaults.",
                    self.path.display(),
                    e
                );
                ClientConfig::default()
            }
        }
    }

    pub fn save(&self, config: &ClientConfig) -> Result<(), CoreError> {
        config.validate()?;
        JsonStore::save(&self.path, config)?;
        Ok(())
    }

    pub fn reset(&self) -> Result<ClientConfig, CoreError> {
        let config = ClientConfig::default();
        self.save(&config)?;
        Ok(config)
    }
}
