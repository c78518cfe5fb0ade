use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};
use tracing::debug;

/// Environment variable holding the FRED API key (required for rate data).
pub const FRED_API_KEY_ENV: &str = "FRED_API_KEY";

/// Environment variable holding the BLS API key (optional; raises the rate
/// limit).
pub const BLS_API_KEY_ENV: &str = "BLS_API_KEY";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct YahooProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BlsProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FredProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DamodaranProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub yahoo: Option<YahooProviderConfig>,
    pub bls: Option<BlsProviderConfig>,
    pub fred: Option<FredProviderConfig>,
    pub damodaran: Option<DamodaranProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            yahoo: Some(YahooProviderConfig {
                base_url: "https://query1.finance.yahoo.com".to_string(),
            }),
            bls: Some(BlsProviderConfig {
                base_url: "https://api.bls.gov".to_string(),
            }),
            fred: Some(FredProviderConfig {
                base_url: "https://api.stlouisfed.org".to_string(),
            }),
            damodaran: Some(DamodaranProviderConfig {
                base_url: "https://pages.stern.nyu.edu".to_string(),
            }),
        }
    }
}

fn default_cache_ttl_hours() -> u64 {
    12
}

fn default_lookback_years() -> u32 {
    5
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// How long fetched market/economic data stays valid.
    #[serde(default = "default_cache_ttl_hours")]
    pub cache_ttl_hours: u64,
    /// History window requested from the price, employment and rate sources.
    #[serde(default = "default_lookback_years")]
    pub lookback_years: u32,
    pub data_path: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            providers: ProvidersConfig::default(),
            cache_ttl_hours: default_cache_ttl_hours(),
            lookback_years: default_lookback_years(),
            data_path: None,
        }
    }
}

impl AppConfig {
    /// Loads the config from the default location, falling back to defaults
    /// when no file exists (every setting has a usable default).
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config file at {}, using defaults",
                config_path.display()
            );
            return Ok(AppConfig::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("in", "codito", "sectorscope")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn cache_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path).join("cache"));
        }
        let proj_dirs = ProjectDirs::from("in", "codito", "sectorscope")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().join("cache"))
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_hours * 3600)
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}
