use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{FilterError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub quick_filter: QuickFilterConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// JSON key-value file holding preferences and id sets
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
    /// Namespace prefixed to every key
    #[serde(default = "default_module_id")]
    pub module_id: String,
    /// Forum user id, used to migrate favorites saved under the old key
    #[serde(default)]
    pub user_id: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            module_id: default_module_id(),
            user_id: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuickFilterConfig {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Queries shorter than this restore the unfiltered list
    #[serde(default = "default_min_query_len")]
    pub min_query_len: usize,
}

impl Default for QuickFilterConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            min_query_len: default_min_query_len(),
        }
    }
}

impl QuickFilterConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from(".thread-filter/store.json")
}

fn default_module_id() -> String {
    "FilterThreads".to_string()
}

fn default_debounce_ms() -> u64 {
    200
}

fn default_min_query_len() -> usize {
    3
}

impl Config {
    pub async fn load(path: &Path) -> Result<Self> {
        // If file doesn't exist, return default config with warning
        if !path.exists() {
            tracing::warn!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| FilterError::ConfigError(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| FilterError::ConfigError(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;

        tracing::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                FilterError::ConfigError(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| FilterError::ConfigError(format!("Failed to serialize config: {}", e)))?;

        tokio::fs::write(path, content)
            .await
            .map_err(|e| FilterError::ConfigError(format!("Failed to write config file: {}", e)))?;

        tracing::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.quick_filter.debounce_ms == 0 {
            return Err(FilterError::ConfigError(
                "quick_filter.debounce_ms must be at least 1".to_string(),
            ));
        }
        if self.quick_filter.debounce_ms > 5000 {
            return Err(FilterError::ConfigError(
                "quick_filter.debounce_ms cannot exceed 5000".to_string(),
            ));
        }

        if self.quick_filter.min_query_len == 0 {
            return Err(FilterError::ConfigError(
                "quick_filter.min_query_len must be at least 1".to_string(),
            ));
        }

        if self.store.module_id.is_empty() {
            return Err(FilterError::ConfigError(
                "store.module_id cannot be empty".to_string(),
            ));
        }
        if self.store.module_id.chars().any(char::is_whitespace) {
            return Err(FilterError::ConfigError(
                "store.module_id cannot contain whitespace".to_string(),
            ));
        }

        tracing::debug!("Configuration validation passed");
        Ok(())
    }

    /// Create an example configuration file
    pub async fn create_example(path: &Path) -> Result<()> {
        let config = Self::default();
        config.save(path).await
    }
}
