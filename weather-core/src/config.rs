use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::error::WeatherError;
use crate::model::Coordinates;

/// Environment variable that overrides the configured API key.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

pub const DEFAULT_API_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
pub const DEFAULT_GEO_BASE_URL: &str = "https://api.openweathermap.org/geo/1.0";
pub const DEFAULT_ICON_BASE_URL: &str = "https://openweathermap.org/img/wn";

const DEFAULT_REFERENCE_CITIES: &[&str] =
    &["New York", "London", "Tokyo", "Sydney", "Rio de Janeiro", "Dubai"];

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// reference_cities = ["London", "Tokyo"]
///
/// [location]
/// latitude = 51.5
/// longitude = -0.12
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub api_base_url: String,
    pub geo_base_url: String,
    pub icon_base_url: String,
    /// Cities shown as highlights before any search.
    pub reference_cities: Vec<String>,
    /// Fixed device location used by the terminal geolocation resolver.
    pub location: Option<Coordinates>,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            geo_base_url: DEFAULT_GEO_BASE_URL.to_string(),
            icon_base_url: DEFAULT_ICON_BASE_URL.to_string(),
            reference_cities: DEFAULT_REFERENCE_CITIES.iter().map(|c| c.to_string()).collect(),
            location: None,
            request_timeout_secs: 10,
        }
    }
}

impl Config {
    /// Config pointing every provider endpoint at one base URL. Used against mock servers.
    pub fn with_base_url(base: &str, api_key: Option<&str>) -> Self {
        Self {
            api_key: api_key.map(str::to_owned),
            api_base_url: format!("{base}/data/2.5"),
            geo_base_url: format!("{base}/geo/1.0"),
            ..Self::default()
        }
    }

    /// The credential every provider call needs, or `MissingCredential`.
    pub fn api_key(&self) -> Result<&str, WeatherError> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(WeatherError::MissingCredential)
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Load config from disk and apply the environment override.
    pub fn load() -> Result<Self> {
        let mut cfg = Self::load_file()?;
        cfg.apply_env_override(std::env::var(API_KEY_ENV).ok());
        Ok(cfg)
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load_file() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    fn apply_env_override(&mut self, value: Option<String>) {
        if let Some(key) = value.filter(|v| !v.trim().is_empty()) {
            self.api_key = Some(key);
        }
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    /// Directory holding the persisted key-value state (history, consent flag).
    pub fn data_dir() -> Result<PathBuf> {
        Ok(project_dirs()?.data_dir().to_path_buf())
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("dev", "weather-explorer", "weather-explorer")
        .ok_or_else(|| anyhow!("Could not determine platform config directory"))
}
