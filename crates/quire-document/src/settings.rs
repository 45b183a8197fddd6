//! User preferences for document handling.
//!
//! Settings are loaded from disk at startup and saved when changed.

use std::path::{Path, PathBuf};

use quire_persistence::WriterOptions;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Settings file error.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings from {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse settings in {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize settings")]
    Serialize(#[from] toml::ser::Error),

    #[error("Failed to write settings to {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// =============================================================================
// ROOT SETTINGS
// =============================================================================

/// Application settings.
///
/// Serialized to TOML and stored in the user's config directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Document behaviour.
    pub documents: DocumentSettings,

    /// File naming used while writing.
    pub persistence: PersistenceSettings,
}

impl Settings {
    /// Load settings from the default path, falling back to defaults.
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            return Self::default();
        }
        Self::load_from(&path).unwrap_or_else(|err| {
            tracing::warn!("{err}; using default settings");
            Self::default()
        })
    }

    /// Load settings from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save settings to the default path.
    pub fn save(&self) -> Result<(), SettingsError> {
        self.save_to(&Self::config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| SettingsError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| SettingsError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Get the default config file path.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("org", "Quire", "Quire")
            .map(|dirs| dirs.config_dir().join("settings.toml"))
            .unwrap_or_else(|| PathBuf::from("settings.toml"))
    }
}

// =============================================================================
// DOCUMENTS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentSettings {
    /// Keep the previous file as `<name>~` when saving over it.
    pub keep_backup: bool,

    /// Start closing the document when its last window controller goes away.
    pub close_when_last_controller_closes: bool,

    /// Base display name for documents without a file.
    pub untitled_name: String,

    /// Maximum undo depth (0 = unlimited).
    pub undo_limit: usize,
}

impl Default for DocumentSettings {
    fn default() -> Self {
        Self {
            keep_backup: false,
            close_when_last_controller_closes: true,
            untitled_name: "Untitled".to_string(),
            undo_limit: 0,
        }
    }
}

// =============================================================================
// PERSISTENCE
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceSettings {
    /// Appended to a file name to form its backup name.
    pub backup_suffix: String,

    /// Suffix of the hidden staging file written before the final rename.
    pub temp_suffix: String,
}

impl Default for PersistenceSettings {
    fn default() -> Self {
        let options = WriterOptions::default();
        Self {
            backup_suffix: options.backup_suffix,
            temp_suffix: options.temp_suffix,
        }
    }
}

impl PersistenceSettings {
    pub fn writer_options(&self) -> WriterOptions {
        WriterOptions {
            backup_suffix: self.backup_suffix.clone(),
            temp_suffix: self.temp_suffix.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_partial_file_uses_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [documents]
            keep_backup = true
            "#,
        )
        .unwrap();

        assert!(settings.documents.keep_backup);
        assert!(settings.documents.close_when_last_controller_closes);
        assert_eq!(settings.documents.untitled_name, "Untitled");
        assert_eq!(settings.persistence.backup_suffix, "~");
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config").join("settings.toml");

        let mut settings = Settings::default();
        settings.documents.untitled_name = "Sans titre".to_string();
        settings.persistence.backup_suffix = ".bak".to_string();
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(&path).unwrap();
        assert_eq!(loaded, settings);
        assert_eq!(loaded.persistence.writer_options().backup_suffix, ".bak");
    }

    #[test]
    fn test_invalid_file_is_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "documents = 3").unwrap();

        assert!(matches!(
            Settings::load_from(&path),
            Err(SettingsError::Parse { .. })
        ));
    }
}
