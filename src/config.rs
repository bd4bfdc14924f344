use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub youtube: YouTubeConfig,

    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory for the persistent per-user stores. Empty means in-memory
    /// only (nothing survives a restart).
    pub data_path: String,

    pub log_level: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_path: "data".to_string(),
            log_level: "info".to_string(),
            worker_threads: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub enabled: bool,

    pub port: u16,

    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 6791,
            cors_allowed_origins: vec![
                "http://localhost:6791".to_string(),
                "http://127.0.0.1:6791".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YouTubeConfig {
    /// Data API v3 key. Empty serves fixed demo items instead of calling out.
    pub api_key: String,

    pub base_url: String,

    pub max_results: u32,

    /// Request timeout in seconds (default: 30)
    pub request_timeout_seconds: u32,
}

impl Default for YouTubeConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://www.googleapis.com/youtube/v3".to_string(),
            max_results: 8,
            request_timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Freshness window for cached search results (default: 30)
    pub ttl_minutes: u32,

    /// Per-user bound on cached searches; oldest evicted first (default: 50)
    pub max_entries: usize,

    /// Per-user bound on the recent-searches list (default: 10)
    pub recent_searches_limit: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_minutes: 30,
            max_entries: crate::constants::cache::MAX_ENTRIES,
            recent_searches_limit: crate::constants::cache::RECENT_SEARCHES_LIMIT,
        }
    }
}

impl CacheConfig {
    #[must_use]
    pub fn settings(&self) -> crate::services::CacheSettings {
        crate::services::CacheSettings {
            ttl: std::time::Duration::from_secs(u64::from(self.ttl_minutes) * 60),
            max_entries: self.max_entries,
            recent_searches_limit: self.recent_searches_limit,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![];

        paths.push(PathBuf::from("config.toml"));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("tubefeed").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".tubefeed").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.cache.ttl_minutes == 0 {
            anyhow::bail!("Cache TTL must be greater than zero");
        }

        if self.cache.max_entries == 0 {
            anyhow::bail!("Cache entry bound must be greater than zero");
        }

        if self.server.enabled && self.server.port == 0 {
            anyhow::bail!("Server port must be set when the server is enabled");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.cache.ttl_minutes, 30);
        assert_eq!(config.cache.max_entries, 50);
        assert_eq!(config.cache.recent_searches_limit, 10);
        assert_eq!(config.server.port, 6791);
        assert!(config.youtube.api_key.is_empty());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[youtube]"));
        assert!(toml_str.contains("[cache]"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [cache]
            ttl_minutes = 5
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.cache.ttl_minutes, 5);

        assert_eq!(config.cache.max_entries, 50);
    }

    #[test]
    fn test_validate_rejects_zero_ttl() {
        let mut config = Config::default();
        config.cache.ttl_minutes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_cache_settings_conversion() {
        let config = Config::default();
        let settings = config.cache.settings();
        assert_eq!(settings.ttl, std::time::Duration::from_secs(30 * 60));
    }
}
