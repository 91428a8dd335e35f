use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use crate::provider::openweather::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};

pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";
pub const BASE_URL_ENV: &str = "OPENWEATHER_BASE_URL";
pub const TIMEOUT_SECS_ENV: &str = "CITYWEATHER_TIMEOUT_SECS";
pub const LOCATIONS_ENV: &str = "CITYWEATHER_LOCATIONS";

/// Settings for the OpenWeather client.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    /// Override for the API root, e.g. a proxy.
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Where countries and cities come from.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct LocationsConfig {
    /// A dr5hn `countries+cities.json` or `countries+states+cities.json`.
    /// The bundled directory is used when unset.
    pub dataset_path: Option<PathBuf>,
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Example TOML:
    /// [openweather]
    /// api_key = "..."
    ///
    /// [locations]
    /// dataset_path = "/data/countries+states+cities.json"
    #[serde(default)]
    pub openweather: ProviderConfig,

    #[serde(default)]
    pub locations: LocationsConfig,
}

impl Config {
    /// Load the config file (or defaults if it doesn't exist yet), then apply
    /// environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        let mut cfg = Self::load_from(&path)?;
        cfg.apply_env(std::env::vars());
        Ok(cfg)
    }

    /// Load only what is on disk at `path`.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to the default location.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save config to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "cityweather", "cityweather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Environment values win over the file. Blank values are ignored.
    pub fn apply_env<I, K, V>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map: HashMap<String, String> = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        let non_blank = |key: &str| {
            map.get(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(key) = non_blank(API_KEY_ENV) {
            self.openweather.api_key = Some(key);
        }
        if let Some(url) = non_blank(BASE_URL_ENV) {
            self.openweather.base_url = Some(url);
        }
        if let Some(secs) = non_blank(TIMEOUT_SECS_ENV).and_then(|v| v.parse::<u64>().ok()) {
            self.openweather.timeout_secs = Some(secs).filter(|secs| *secs > 0);
        }
        if let Some(path) = non_blank(LOCATIONS_ENV) {
            self.locations.dataset_path = Some(PathBuf::from(path));
        }
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.openweather.api_key = Some(api_key.trim().to_string());
    }

    /// Returns the API key, if a non-blank one is present.
    pub fn api_key(&self) -> Option<&str> {
        self.openweather
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    pub fn is_configured(&self) -> bool {
        self.api_key().is_some()
    }

    pub fn base_url(&self) -> &str {
        self.openweather
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn location_dataset(&self) -> Option<&Path> {
        self.locations
            .dataset_path
            .as_deref()
            .filter(|path| !path.as_os_str().is_empty())
    }

    pub fn timeout_secs(&self) -> u64 {
        self.openweather
            .timeout_secs
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
    }
}
