use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Configuration loading error: {0}")]
    ConfigLoad(#[from] ConfigError),
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

pub type Result<T> = std::result::Result<T, ConfigurationError>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    /// General system settings
    pub system: SystemSettings,

    /// Explorer (OKLink) scraping configuration
    pub explorer: ExplorerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemSettings {
    /// Enable debug mode (verbose request logging)
    pub debug_mode: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorerConfig {
    /// Prefix every explorer request goes through. Points at a local development
    /// proxy or a deployed forwarder; the explorer itself does not allow direct
    /// cross-origin access.
    pub base_url: String,

    /// Locale segment tried first (e.g. "zh-hans"). Empty means canonical path only.
    pub default_locale: String,

    /// Request timeout in seconds, applied per fetch
    pub request_timeout_seconds: u64,

    /// User-Agent sent with each request (the forwarder may override it)
    pub user_agent: Option<String>,

    /// Accept-Language sent with each request
    pub accept_language: Option<String>,

    /// Maximum number of addresses looked up at once in batch mode
    pub batch_concurrency: usize,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000/oklink".to_string(),
            default_locale: "zh-hans".to_string(),
            request_timeout_seconds: 30,
            user_agent: Some(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36"
                    .to_string(),
            ),
            accept_language: Some("zh-CN,zh;q=0.9,en;q=0.8".to_string()),
            batch_concurrency: 4,
        }
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            system: SystemSettings { debug_mode: false },
            explorer: ExplorerConfig::default(),
        }
    }
}

impl ExplorerConfig {
    /// Validate explorer configuration
    pub fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigurationError::InvalidValue(format!(
                "Explorer base URL must start with http:// or https://, got '{}'",
                self.base_url
            )));
        }

        if self.request_timeout_seconds == 0 {
            return Err(ConfigurationError::InvalidValue(
                "Request timeout must be greater than 0".to_string(),
            ));
        }

        if self.batch_concurrency == 0 {
            return Err(ConfigurationError::InvalidValue(
                "Batch concurrency must be greater than 0".to_string(),
            ));
        }

        if self.default_locale.contains('/') {
            return Err(ConfigurationError::InvalidValue(format!(
                "Default locale must be a single path segment, got '{}'",
                self.default_locale
            )));
        }

        Ok(())
    }
}

impl SystemConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path("config.toml")
    }

    /// Load configuration from a specific file path
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let mut config_builder = Config::builder()
            // Start with defaults
            .add_source(Config::try_from(&SystemConfig::default())?);

        if config_path.as_ref().exists() {
            info!(
                "Loading configuration from: {}",
                config_path.as_ref().display()
            );
            config_builder = config_builder.add_source(File::from(config_path.as_ref()));
        } else {
            debug!("Config file not found, using defaults and environment variables");
        }

        // SCOUT__EXPLORER__BASE_URL=https://proxy.example/oklink
        config_builder = config_builder.add_source(
            Environment::with_prefix("SCOUT")
                .try_parsing(true)
                .separator("__"),
        );

        let config = config_builder.build()?;
        let mut system_config: SystemConfig = config.try_deserialize()?;

        let trimmed = system_config.explorer.base_url.trim_end_matches('/').to_string();
        if trimmed != system_config.explorer.base_url {
            debug!(
                "Trimmed trailing slash from explorer base URL: '{}' -> '{}'",
                system_config.explorer.base_url, trimmed
            );
            system_config.explorer.base_url = trimmed;
        }

        system_config.explorer.default_locale =
            system_config.explorer.default_locale.trim().to_string();

        system_config.validate()?;

        Ok(system_config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        self.explorer.validate()
    }
}
