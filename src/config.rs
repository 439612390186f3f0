use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{AppError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_geocoder_url")]
    pub geocoder_url: String,

    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,

    #[serde(default = "default_missing_fields_timeout")]
    pub missing_fields_timeout_secs: u64,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub dark_mode: bool,

    #[serde(default)]
    pub geolocation: GeolocationConfig,
}

/// Where device coordinates come from when the user asks for their
/// current location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeolocationConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_gpsd_addr")]
    pub gpsd_addr: String,

    /// Fixed coordinates take precedence over gpsd when both are set.
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

fn default_geocoder_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_backend_url() -> String {
    "http://localhost:8002".to_string()
}

fn default_user_agent() -> String {
    format!("news-agent/{}", env!("CARGO_PKG_VERSION"))
}

fn default_search_debounce_ms() -> u64 {
    500
}

fn default_missing_fields_timeout() -> u64 {
    3
}

fn default_request_timeout() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_gpsd_addr() -> String {
    "127.0.0.1:2947".to_string()
}

impl Default for GeolocationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            gpsd_addr: default_gpsd_addr(),
            latitude: None,
            longitude: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            geocoder_url: default_geocoder_url(),
            backend_url: default_backend_url(),
            user_agent: default_user_agent(),
            search_debounce_ms: default_search_debounce_ms(),
            missing_fields_timeout_secs: default_missing_fields_timeout(),
            request_timeout_secs: default_request_timeout(),
            dark_mode: false,
            geolocation: GeolocationConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Config::default();
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("news-agent")
            .join("config.toml")
    }

    fn validate(&self) -> Result<()> {
        url::Url::parse(&self.geocoder_url)
            .map_err(|e| AppError::Config(format!("geocoder_url: {e}")))?;
        url::Url::parse(&self.backend_url)
            .map_err(|e| AppError::Config(format!("backend_url: {e}")))?;

        let geo = &self.geolocation;
        if geo.latitude.is_some() != geo.longitude.is_some() {
            return Err(AppError::Config(
                "geolocation.latitude and geolocation.longitude must be set together".to_string(),
            ));
        }
        Ok(())
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn missing_fields_timeout(&self) -> Duration {
        Duration::from_secs(self.missing_fields_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
