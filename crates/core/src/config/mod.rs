//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (NFZQ_*)
//! 2. TOML config file (if NFZQ_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (NFZQ_*)
/// 2. TOML config file (if NFZQ_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to SQLite cache database.
    ///
    /// Set via NFZQ_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Socket address the HTTP endpoint listens on.
    ///
    /// Set via NFZQ_BIND_ADDR environment variable.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Base URL of the NFZ queue directory API.
    ///
    /// Set via NFZQ_NFZ_BASE_URL environment variable.
    #[serde(default = "default_nfz_base_url")]
    pub nfz_base_url: String,

    /// User-Agent string for upstream requests.
    ///
    /// Set via NFZQ_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Upstream request timeout in milliseconds.
    ///
    /// Set via NFZQ_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Upper bound on pages followed for a single query.
    ///
    /// Set via NFZQ_MAX_PAGES environment variable.
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Google Geocoding API key. The hardcoded geocoder is used when unset.
    ///
    /// Set via NFZQ_GOOGLE_API_KEY environment variable.
    #[serde(default)]
    pub google_api_key: Option<String>,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./nfz-queues-cache.sqlite")
}

fn default_bind_addr() -> String {
    "127.0.0.1:3000".into()
}

fn default_nfz_base_url() -> String {
    "https://api.nfz.gov.pl".into()
}

fn default_user_agent() -> String {
    "nfz-queues/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_max_pages() -> usize {
    1_000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            bind_addr: default_bind_addr(),
            nfz_base_url: default_nfz_base_url(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            max_pages: default_max_pages(),
            google_api_key: None,
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `NFZQ_`
    /// 2. TOML file from `NFZQ_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("NFZQ_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("NFZQ_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Google API key, if one is configured and non-blank.
    pub fn google_api_key(&self) -> Option<&str> {
        self.google_api_key.as_deref().filter(|key| !key.trim().is_empty())
    }
}
