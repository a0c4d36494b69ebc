use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const CURRENT_VERSION: u32 = 1;

const APP_DIR_NAME: &str = "layerscope";
const SETTINGS_FILE_NAME: &str = "settings.toml";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("could not locate a config directory")]
    NoConfigDir,
    #[error("failed to read settings: {0}")]
    ReadError(String),
    #[error("failed to write settings: {0}")]
    WriteError(String),
    #[error("invalid settings file: {0}")]
    InvalidFormat(String),
    #[error("settings version {found} is not supported (expected {expected})")]
    VersionMismatch { found: u32, expected: u32 },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Compact,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// Catalog snapshot used when `--catalog` is not given.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub version: u32,
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(default)]
    pub catalog: CatalogSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            logging: LoggingSettings::default(),
            catalog: CatalogSettings::default(),
        }
    }
}

/// Reads and writes `settings.toml`.
pub struct TomlSettingsStore {
    path: PathBuf,
}

impl TomlSettingsStore {
    pub fn new() -> Result<Self, SettingsError> {
        let config_dir = dirs::config_dir().ok_or(SettingsError::NoConfigDir)?;
        Ok(Self::with_config_dir(config_dir.join(APP_DIR_NAME)))
    }

    pub fn with_config_dir(config_dir: PathBuf) -> Self {
        Self {
            path: config_dir.join(SETTINGS_FILE_NAME),
        }
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn storage_path(&self) -> &PathBuf {
        &self.path
    }

    /// A missing file yields the defaults.
    pub fn load(&self) -> Result<Settings, SettingsError> {
        if !self.path.exists() {
            return Ok(Settings::default());
        }

        let content =
            fs::read_to_string(&self.path).map_err(|e| SettingsError::ReadError(e.to_string()))?;

        let settings: Settings =
            toml::from_str(&content).map_err(|e| SettingsError::InvalidFormat(e.to_string()))?;

        if settings.version != CURRENT_VERSION {
            return Err(SettingsError::VersionMismatch {
                found: settings.version,
                expected: CURRENT_VERSION,
            });
        }

        Ok(settings)
    }

    pub fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.exists()) {
            fs::create_dir_all(parent).map_err(|e| SettingsError::WriteError(e.to_string()))?;
        }

        let content = toml::to_string_pretty(settings)
            .map_err(|e| SettingsError::WriteError(e.to_string()))?;
        fs::write(&self.path, format!("# layerscope settings\n\n{}", content))
            .map_err(|e| SettingsError::WriteError(e.to_string()))
    }
}
