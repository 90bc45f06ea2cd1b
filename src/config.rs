//! Configuration management for Zvuk Fetcher
//!
//! This module provides unified configuration management with automatic
//! first-run initialization, multi-source loading, and zero-config defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::app::{ClientConfig, OrchestratorConfig, PacingConfig, PaginationConfig};
use crate::constants::{files, http, limits, pacing, zvuk};
use crate::errors::{AppError, ConfigError, ConfigResult, Result};

/// Config file looked for in the working directory
pub const LOCAL_CONFIG_FILE: &str = "zvuk-fetcher.toml";

/// Directory name under the user config directory
pub const CONFIG_DIR_NAME: &str = "zvuk-fetcher";

/// Unified application configuration for TOML serialization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP client settings
    pub client: ClientConfigToml,
    /// Request pacing
    pub pacing: PacingConfig,
    /// Where and how listings are downloaded
    pub download: DownloadConfigToml,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// TOML-friendly client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfigToml {
    /// Service base URL
    pub base_url: String,
    /// Browser identification string
    pub user_agent: String,
    /// Enable HTTP/2 adaptive window tuning
    pub http2: bool,
    /// Catalog request timeout in seconds
    pub request_timeout_secs: u64,
    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
    /// Whole media transfer timeout in seconds
    pub media_timeout_secs: u64,
    /// Connection pool idle timeout in seconds (None = no timeout)
    pub pool_idle_timeout_secs: Option<u64>,
    /// Ceiling on catalog requests per second
    pub rate_limit_rps: u32,
    /// Retries on transport failures (0 = none)
    pub max_retries: u32,
    /// Base backoff delay in milliseconds
    pub retry_base_delay_ms: u64,
}

impl Default for ClientConfigToml {
    fn default() -> Self {
        Self {
            base_url: zvuk::BASE_URL.to_string(),
            user_agent: http::USER_AGENT.to_string(),
            http2: true,
            request_timeout_secs: http::DEFAULT_TIMEOUT.as_secs(),
            connect_timeout_secs: http::CONNECT_TIMEOUT.as_secs(),
            media_timeout_secs: http::MEDIA_TIMEOUT.as_secs(),
            pool_idle_timeout_secs: Some(http::POOL_IDLE_TIMEOUT.as_secs()),
            rate_limit_rps: limits::DEFAULT_RATE_LIMIT_RPS,
            max_retries: limits::DEFAULT_MAX_RETRIES,
            retry_base_delay_ms: limits::RETRY_BASE_DELAY_MS,
        }
    }
}

/// TOML-friendly download configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfigToml {
    /// Root directory for collection folders
    pub destination_root: PathBuf,
    /// Items requested per listing page
    pub page_size: u32,
    /// Hard bound on pages per listing
    pub max_pages: usize,
}

impl Default for DownloadConfigToml {
    fn default() -> Self {
        Self {
            destination_root: PathBuf::from(files::DEFAULT_DOWNLOAD_ROOT),
            page_size: limits::DEFAULT_PAGE_SIZE,
            max_pages: limits::DEFAULT_MAX_PAGES,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level used when no verbosity flag is given
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl AppConfig {
    /// Convert TOML-friendly configuration to runtime configuration
    pub fn to_runtime_config(&self) -> (ClientConfig, PacingConfig, OrchestratorConfig) {
        (
            self.client.to_runtime_config(),
            self.pacing.clone(),
            self.download.to_runtime_config(),
        )
    }

    /// Replace the download root, as the `--output` flag does
    pub fn with_destination_root(mut self, root: Option<PathBuf>) -> Self {
        if let Some(root) = root {
            self.download.destination_root = root;
        }
        self
    }

    /// Check every value that would fail at runtime
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationFailed` listing every problem found.
    pub fn validate(&self) -> ConfigResult<()> {
        let mut errors = self.pacing.validate();

        if self.client.rate_limit_rps == 0 {
            errors.push("client.rate_limit_rps must be at least 1".to_string());
        }
        if url::Url::parse(&self.client.base_url).is_err() {
            errors.push(format!(
                "client.base_url '{}' is not a valid URL",
                self.client.base_url
            ));
        }
        if self.download.page_size == 0 {
            errors.push("download.page_size must be at least 1".to_string());
        }
        if self.download.max_pages == 0 {
            errors.push("download.max_pages must be at least 1".to_string());
        }
        if self.download.destination_root.as_os_str().is_empty() {
            errors.push("download.destination_root cannot be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::ValidationFailed { errors })
        }
    }

    /// Load configuration with multi-source precedence:
    /// 1. Default values
    /// 2. Config file (explicit path, or the first one found)
    ///
    /// CLI overrides are applied by the caller.
    pub async fn load(config_file_override: Option<PathBuf>) -> Result<Self> {
        let config_path = match config_file_override {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound { path }.into());
                }
                Some(path)
            }
            None => Self::find_config_file(),
        };

        let config = match config_path {
            Some(path) => Self::load_from_file(&path).await?,
            None => {
                debug!("No config file found, using defaults");
                Self::default()
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Initialize configuration on first run
    ///
    /// Creates a default config file in the user config directory if none
    /// exists and tells the user where it is.
    pub async fn initialize_first_run() -> Result<Option<PathBuf>> {
        let Some(config_path) = Self::get_default_config_path() else {
            debug!("No user config directory; skipping first-run config");
            return Ok(None);
        };

        if config_path.exists() {
            return Ok(Some(config_path));
        }

        info!("Creating default configuration file...");

        if let Some(parent) = config_path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                AppError::generic(format!(
                    "Failed to create config directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        tokio::fs::write(&config_path, Self::generate_default_config_content())
            .await
            .map_err(|e| {
                AppError::generic(format!(
                    "Failed to write config file {}: {}",
                    config_path.display(),
                    e
                ))
            })?;

        println!("Created default configuration file:");
        println!("   {}", config_path.display());
        println!("   You can customize settings by editing this file.");
        println!();

        Ok(Some(config_path))
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let search_paths = std::iter::once(PathBuf::from(format!("./{}", LOCAL_CONFIG_FILE)))
            .chain(Self::get_default_config_path());

        for path in search_paths {
            if path.exists() {
                debug!("Found config file: {}", path.display());
                return Some(path);
            }
        }

        None
    }

    /// Default config file path for the current user
    pub fn get_default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join("config.toml"))
    }

    /// Load configuration from a TOML file
    async fn load_from_file(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            AppError::generic(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let config: AppConfig = toml::from_str(&content).map_err(ConfigError::InvalidFormat)?;

        info!("Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Generate default configuration content with helpful comments
    pub fn generate_default_config_content() -> String {
        format!(
            r#"# Zvuk Fetcher Configuration
# This file was automatically generated on first run.
# You can customize any of these settings to suit your needs.

[client]
base_url = "{base_url}"
http2 = true
request_timeout_secs = {request_timeout}
connect_timeout_secs = {connect_timeout}
media_timeout_secs = {media_timeout}
pool_idle_timeout_secs = {pool_idle}
# Ceiling on catalog requests per second
rate_limit_rps = {rate_limit}
# Retries on network failures; 0 means every failure is final
max_retries = {max_retries}
retry_base_delay_ms = {retry_delay}

[pacing]
# Rest on every Nth track of a collection (0 = never)
rest_every = {rest_every}

[pacing.track]
# Pause before each track
min = "{track_min}"
max = "{track_max}"

[pacing.rest]
min = "{rest_min}"
max = "{rest_max}"

[pacing.collection]
# Pause between collections
min = "{collection_min}"
max = "{collection_max}"

[download]
destination_root = "{root}"
page_size = {page_size}
max_pages = {max_pages}

[logging]
level = "warn"  # error, warn, info, debug, trace
"#,
            base_url = zvuk::BASE_URL,
            request_timeout = http::DEFAULT_TIMEOUT.as_secs(),
            connect_timeout = http::CONNECT_TIMEOUT.as_secs(),
            media_timeout = http::MEDIA_TIMEOUT.as_secs(),
            pool_idle = http::POOL_IDLE_TIMEOUT.as_secs(),
            rate_limit = limits::DEFAULT_RATE_LIMIT_RPS,
            max_retries = limits::DEFAULT_MAX_RETRIES,
            retry_delay = limits::RETRY_BASE_DELAY_MS,
            rest_every = pacing::REST_EVERY,
            track_min = as_toml_duration(pacing::TRACK_MIN),
            track_max = as_toml_duration(pacing::TRACK_MAX),
            rest_min = as_toml_duration(pacing::REST_MIN),
            rest_max = as_toml_duration(pacing::REST_MAX),
            collection_min = as_toml_duration(pacing::COLLECTION_MIN),
            collection_max = as_toml_duration(pacing::COLLECTION_MAX),
            root = files::DEFAULT_DOWNLOAD_ROOT,
            page_size = limits::DEFAULT_PAGE_SIZE,
            max_pages = limits::DEFAULT_MAX_PAGES,
        )
    }
}

/// Whole-second duration in the form `humantime_serde` reads back
fn as_toml_duration(duration: Duration) -> String {
    format!("{}s", duration.as_secs())
}

impl ClientConfigToml {
    /// Convert to runtime ClientConfig
    pub fn to_runtime_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url.clone(),
            user_agent: self.user_agent.clone(),
            http2: self.http2,
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            media_timeout: Duration::from_secs(self.media_timeout_secs),
            pool_idle_timeout: self.pool_idle_timeout_secs.map(Duration::from_secs),
            rate_limit_rps: self.rate_limit_rps,
            max_retries: self.max_retries,
            retry_base_delay: Duration::from_millis(self.retry_base_delay_ms),
        }
    }
}

impl DownloadConfigToml {
    /// Convert to runtime OrchestratorConfig
    pub fn to_runtime_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            destination_root: self.destination_root.clone(),
            pagination: PaginationConfig {
                page_size: self.page_size,
                max_pages: self.max_pages,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::DelayBounds;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_default_config_creation() {
        let config = AppConfig::default();

        assert_eq!(config.client.rate_limit_rps, limits::DEFAULT_RATE_LIMIT_RPS);
        assert_eq!(config.client.max_retries, 0);
        assert_eq!(config.download.page_size, 100);
        assert_eq!(config.logging.level, "warn");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_file_generation() {
        let content = AppConfig::generate_default_config_content();

        let parsed: AppConfig = toml::from_str(&content).unwrap();

        assert_eq!(parsed, AppConfig::default());
        assert!(content.contains("# Zvuk Fetcher Configuration"));
        assert!(content.contains("[pacing.track]"));
        assert!(content.contains("[client]"));
    }

    #[tokio::test]
    async fn test_config_loading_nonexistent_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.toml");

        let result = AppConfig::load(Some(config_path)).await;
        assert!(matches!(
            result,
            Err(AppError::Config(ConfigError::NotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn test_config_loading_partial_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test_config.toml");

        let test_config = r#"
[client]
rate_limit_rps = 5
max_retries = 2

[pacing]
rest_every = 5

[pacing.track]
min = "500ms"
max = "2s"

[download]
destination_root = "./music"

[logging]
level = "debug"
"#;
        tokio::fs::write(&config_path, test_config).await.unwrap();

        let config = AppConfig::load(Some(config_path)).await.unwrap();

        assert_eq!(config.client.rate_limit_rps, 5);
        assert_eq!(config.client.max_retries, 2);
        assert_eq!(config.pacing.rest_every, 5);
        assert_eq!(
            config.pacing.track,
            DelayBounds::new(Duration::from_millis(500), Duration::from_secs(2))
        );
        assert_eq!(config.pacing.rest, PacingConfig::default().rest);
        assert_eq!(config.download.destination_root, PathBuf::from("./music"));
        assert_eq!(config.download.page_size, limits::DEFAULT_PAGE_SIZE);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.client.base_url, zvuk::BASE_URL);
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("bad.toml");

        let test_config = r#"
[pacing.collection]
min = "60s"
max = "30s"

[download]
page_size = 0
"#;
        tokio::fs::write(&config_path, test_config).await.unwrap();

        match AppConfig::load(Some(config_path)).await {
            Err(AppError::Config(ConfigError::ValidationFailed { errors })) => {
                assert_eq!(errors.len(), 2);
                assert!(errors[0].starts_with("pacing.collection"));
                assert!(errors[1].starts_with("download.page_size"));
            }
            other => panic!("Expected validation failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("broken.toml");
        tokio::fs::write(&config_path, "[client\nrate_limit_rps = ")
            .await
            .unwrap();

        let result = AppConfig::load(Some(config_path)).await;
        assert!(matches!(
            result,
            Err(AppError::Config(ConfigError::InvalidFormat(_)))
        ));
    }

    #[test]
    fn test_runtime_conversion_and_override() {
        let config = AppConfig::default().with_destination_root(Some(PathBuf::from("/tmp/out")));
        let (client, pacing, orchestrator) = config.to_runtime_config();

        assert_eq!(client.request_timeout, http::DEFAULT_TIMEOUT);
        assert_eq!(client.retry_base_delay, Duration::from_millis(1000));
        assert_eq!(pacing, PacingConfig::default());
        assert_eq!(orchestrator.destination_root, PathBuf::from("/tmp/out"));
        assert_eq!(orchestrator.pagination, PaginationConfig::default());

        let unchanged = AppConfig::default().with_destination_root(None);
        assert_eq!(
            unchanged.download.destination_root,
            PathBuf::from(files::DEFAULT_DOWNLOAD_ROOT)
        );
    }
}
