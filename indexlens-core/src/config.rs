//! TOML configuration.
//!
//! Every section and field is optional; a missing file or section falls back to
//! the defaults below.
//!
//! ```toml
//! [catalog]
//! url = "https://en.wikipedia.org/wiki/List_of_S%26P_500_companies"
//! timeout_secs = 30
//!
//! [prices]
//! max_retries = 3
//! base_delay_ms = 500
//! timeout_secs = 30
//! breaker_cooldown_secs = 1800
//! parallel = false
//!
//! [analysis]
//! ma_windows = [10, 20, 50]
//! ytd_batch_size = 10
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::wikipedia::DEFAULT_CATALOG_URL;
use crate::indicators::DEFAULT_MA_WINDOWS;

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "indexlens.toml";

/// Upper bound for `prices.max_retries`; backoff doubles per attempt.
pub const MAX_RETRIES_LIMIT: u32 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub prices: PriceConfig,
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub url: String,
    pub timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_CATALOG_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceConfig {
    pub base_url: String,
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub timeout_secs: u64,
    pub breaker_cooldown_secs: u64,
    /// Fetch symbols of a batch on the rayon pool.
    pub parallel: bool,
}

impl Default for PriceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://query2.finance.yahoo.com".to_string(),
            max_retries: 3,
            base_delay_ms: 500,
            timeout_secs: 30,
            breaker_cooldown_secs: 30 * 60,
            parallel: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub ma_windows: Vec<usize>,
    /// How many leading symbols of the selection the year-to-date batch covers.
    pub ytd_batch_size: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            ma_windows: DEFAULT_MA_WINDOWS.to_vec(),
            ytd_batch_size: 10,
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given, else `indexlens.toml` if present, else defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::from_file(p),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.analysis.ma_windows.contains(&0) {
            return Err(ConfigError::Invalid(
                "analysis.ma_windows must not contain 0".into(),
            ));
        }
        if self.analysis.ytd_batch_size == 0 {
            return Err(ConfigError::Invalid(
                "analysis.ytd_batch_size must be at least 1".into(),
            ));
        }
        if self.prices.max_retries > MAX_RETRIES_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "prices.max_retries must be at most {MAX_RETRIES_LIMIT}"
            )));
        }
        if self.catalog.url.trim().is_empty() {
            return Err(ConfigError::Invalid("catalog.url must not be empty".into()));
        }
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(format!("serialize config: {e}")))
    }
}
