use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::settings::is_hex_color;
use crate::{Error, Result};

const APP_NAME: &str = "proton-launcher";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub data_dir: PathBuf,
    pub log_level: String,
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
    #[serde(default = "default_accent_color")]
    pub default_accent_color: String,
    #[serde(default = "default_export_file_name")]
    pub export_file_name: String,
    #[serde(default = "default_config_version")]
    pub config_version: u32,
}

fn default_key_prefix() -> String {
    "proton".to_string()
}

fn default_accent_color() -> String {
    "#4caf50".to_string()
}

fn default_export_file_name() -> String {
    "proton-settings.json".to_string()
}

fn default_config_version() -> u32 {
    1
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = ProjectDirs::from("", "", APP_NAME)
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".").join(APP_NAME));

        Self {
            data_dir,
            log_level: "info".to_string(),
            key_prefix: default_key_prefix(),
            default_accent_color: default_accent_color(),
            export_file_name: default_export_file_name(),
            config_version: default_config_version(),
        }
    }
}

impl Config {
    /// Load the config from its standard location, creating it on first run.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            let config = Self::default();
            config.save_to(config_path)?;
            return Ok(config);
        }

        let contents = fs::read_to_string(config_path)?;

        match toml::from_str::<Config>(&contents) {
            Ok(mut config) => {
                if config.config_version < default_config_version() {
                    log::info!(
                        "Migrating config from version {} to {}",
                        config.config_version,
                        default_config_version()
                    );
                    config.config_version = default_config_version();
                    config.save_to(config_path)?;
                }
                config.validate()?;
                Ok(config)
            }
            Err(e) => {
                log::warn!("Failed to parse config: {}. Using defaults and merging.", e);
                let mut config = Self::default();

                // Keep whatever known fields are still readable
                if let Ok(value) = toml::from_str::<toml::Value>(&contents) {
                    if let Some(table) = value.as_table() {
                        if let Some(dir) = table.get("data_dir").and_then(|v| v.as_str()) {
                            config.data_dir = PathBuf::from(dir);
                        }
                        if let Some(level) = table.get("log_level").and_then(|v| v.as_str()) {
                            config.log_level = level.to_string();
                        }
                        if let Some(prefix) = table.get("key_prefix").and_then(|v| v.as_str()) {
                            config.key_prefix = prefix.to_string();
                        }
                    }
                }

                config.validate()?;
                config.save_to(config_path)?;
                Ok(config)
            }
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.log_level.as_str()) {
            return Err(Error::Config(format!(
                "Invalid log level: '{}'. Must be one of: {}",
                self.log_level,
                valid_log_levels.join(", ")
            )));
        }

        if self.key_prefix.trim().is_empty() || self.key_prefix.contains(['/', '\\']) {
            return Err(Error::Config(format!(
                "Invalid key_prefix: '{}'",
                self.key_prefix
            )));
        }

        if !is_hex_color(&self.default_accent_color) {
            return Err(Error::Config(format!(
                "Invalid default_accent_color: '{}'. Expected #rrggbb",
                self.default_accent_color
            )));
        }

        if self.export_file_name.trim().is_empty() {
            return Err(Error::Config("export_file_name cannot be empty".to_string()));
        }

        Ok(())
    }

    fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))?;
        fs::write(config_path, contents)?;

        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from("", "", APP_NAME)
            .ok_or_else(|| Error::Config("Failed to determine project directories".to_string()))?;

        Ok(project_dirs.config_dir().join("config.toml"))
    }
}
