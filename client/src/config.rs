//! Client configuration: a TOML file plus `OKAPI_*` environment overrides.

use std::{fs, path::Path, time::Duration};

use common::browse_config::BrowseConfig;
use serde::Deserialize;

use crate::error::{BrowseError, Result};
use crate::http_utils::request_cache::DEFAULT_MAX_ENTRIES;


#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OkapiConfig {
    pub url: String,
    pub tenant: Option<String>,
    pub token: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for OkapiConfig {
    fn default() -> Self {
        OkapiConfig {
            url: "http://localhost:9130".to_string(),
            tenant: Some("diku".to_string()),
            token: None,
            timeout_seconds: 30,
        }
    }
}


#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Cache namespace; separates browse caches of different screens or users.
    pub namespace: String,
    /// Unset means a fetched page is reused until the cache is invalidated.
    pub stale_time_seconds: Option<u64>,
    /// Finished pages kept in the request cache.
    pub cache_max_entries: usize,
    pub okapi: OkapiConfig,
    pub browse: BrowseConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            namespace: "inventory".to_string(),
            stale_time_seconds: None,
            cache_max_entries: DEFAULT_MAX_ENTRIES,
            okapi: OkapiConfig::default(),
            browse: BrowseConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Reads `path` when given (defaults otherwise), then applies environment
    /// overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let content = fs::read_to_string(path).map_err(|e| {
                    BrowseError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
                })?;
                Self::from_toml_str(&content)?
            }
            None => ClientConfig::default(),
        };
        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| BrowseError::Config(e.to_string()))
    }

    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("OKAPI_URL") {
            self.okapi.url = url;
        }
        if let Some(tenant) = lookup("OKAPI_TENANT") {
            self.okapi.tenant = Some(tenant);
        }
        if let Some(token) = lookup("OKAPI_TOKEN") {
            self.okapi.token = Some(token);
        }
    }

    pub fn stale_time(&self) -> Option<Duration> {
        self.stale_time_seconds.map(Duration::from_secs)
    }
}
