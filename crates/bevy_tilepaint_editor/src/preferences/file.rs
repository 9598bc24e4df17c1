//! Reading and writing the preferences file

use super::PainterPreferences;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

const PREFERENCES_FILE: &str = "preferences.json";

#[derive(Debug)]
pub enum PreferencesError {
    Io { path: PathBuf, message: String },
    Parse(String),
    Serialize(String),
    NoConfigDir,
}

impl std::fmt::Display for PreferencesError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PreferencesError::Io { path, message } => {
                write!(f, "{}: {}", path.display(), message)
            }
            PreferencesError::Parse(e) => write!(f, "Invalid preferences file: {}", e),
            PreferencesError::Serialize(e) => write!(f, "Could not encode preferences: {}", e),
            PreferencesError::NoConfigDir => write!(f, "No config directory on this platform"),
        }
    }
}

impl std::error::Error for PreferencesError {}

impl PainterPreferences {
    /// `preferences.json` inside the platform config directory
    pub fn path() -> Result<PathBuf, PreferencesError> {
        ProjectDirs::from("com", "bevy_tilepaint", "bevy_tilepaint")
            .map(|dirs| dirs.config_dir().join(PREFERENCES_FILE))
            .ok_or(PreferencesError::NoConfigDir)
    }

    /// Load from the config directory. Falls back to defaults with a warning.
    pub fn load() -> Self {
        Self::path()
            .and_then(|path| Self::read_from(&path))
            .unwrap_or_else(|e| {
                bevy::log::warn!("Could not load preferences: {}. Using defaults.", e);
                Self::default()
            })
    }

    /// Read a preferences file. A missing file yields the defaults.
    pub fn read_from(path: &Path) -> Result<Self, PreferencesError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| PreferencesError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| PreferencesError::Parse(e.to_string()))
    }

    /// Write as pretty JSON, creating parent directories
    pub fn write_to(&self, path: &Path) -> Result<(), PreferencesError> {
        let io_error = |e: std::io::Error| PreferencesError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        };
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(io_error)?;
        }
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| PreferencesError::Serialize(e.to_string()))?;
        std::fs::write(path, content).map_err(io_error)
    }

    pub fn save(&self) -> Result<(), PreferencesError> {
        let path = Self::path()?;
        self.write_to(&path)?;
        bevy::log::debug!("Saved preferences to {:?}", path);
        Ok(())
    }
}
