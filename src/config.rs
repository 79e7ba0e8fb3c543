use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::distance::DistanceUnit;
use crate::error::ConfigError;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Where locations and preferences live; defaults to the platform data dir
    pub data_dir: Option<PathBuf>,
    pub distance_unit: DistanceUnit,
    pub geocoder_url: String,
    pub ip_locate_url: String,
    pub user_agent: String,
    /// Base URL for shareable links
    pub share_base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: None,
            distance_unit: DistanceUnit::Kilometers,
            geocoder_url: "https://nominatim.openstreetmap.org/search".to_string(),
            ip_locate_url: "http://ip-api.com/json".to_string(),
            user_agent: concat!("locbook/", env!("CARGO_PKG_VERSION")).to_string(),
            share_base_url: "https://locbook.local/".to_string(),
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "locbook", "locbook")
}

impl Config {
    pub fn get_config_path() -> Option<PathBuf> {
        project_dirs().map(|proj_dirs| proj_dirs.config_dir().join("config.json"))
    }

    /// Load the user config; a missing file yields the defaults
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::get_config_path().ok_or(ConfigError::NoProjectDirectory("config"))?;
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> Result<Self, ConfigError> {
        if !config_path.exists() {
            tracing::debug!(path = %config_path.display(), "No config file, using defaults");
            return Ok(Config::default());
        }

        let config_data = fs::read_to_string(config_path)
            .map_err(|e| ConfigError::LoadFailed(format!("{}: {}", config_path.display(), e)))?;

        serde_json::from_str(&config_data)
            .map_err(|e| ConfigError::LoadFailed(format!("{}: {}", config_path.display(), e)))
    }

    pub fn save_to(&self, config_path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ConfigError::SaveFailed(format!("Failed to create config directory: {}", e))
            })?;
        }

        let config_data = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SaveFailed(format!("Failed to serialize config: {}", e)))?;

        fs::write(config_path, config_data)
            .map_err(|e| ConfigError::SaveFailed(format!("Failed to write config file: {}", e)))
    }

    /// Resolved data directory: explicit setting first, then the platform default
    pub fn data_dir(&self) -> Result<PathBuf, ConfigError> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        project_dirs()
            .map(|proj_dirs| proj_dirs.data_dir().to_path_buf())
            .ok_or(ConfigError::NoProjectDirectory("data"))
    }
}
