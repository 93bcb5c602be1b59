//! # Preferences Module
//!
//! Session preferences shared by the tools: the UI theme and the last
//! directory used for each file dialog.
//!
//! Preferences are an explicit object created at startup and passed by
//! reference to whoever needs them, then written back with [`save`].
//! The file format is a small JSON document:
//!
//! ```json
//! {
//!   "theme": "dark",
//!   "last_paths": { "organizer_open": "/home/me/Downloads" }
//! }
//! ```
//!
//! [`save`]: SessionPreferences::save

use crate::error::ConfigError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// File name of the preferences document inside the home directory.
pub const CONFIG_FILE_NAME: &str = ".toolbox_config.json";

/// UI colour scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
        }
    }
}

/// Preferences that survive between runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionPreferences {
    #[serde(default)]
    theme: Theme,
    /// Last directory per dialog key
    #[serde(default)]
    last_paths: BTreeMap<String, PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    saved_at: Option<DateTime<Utc>>,
}

impl SessionPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// `~/.toolbox_config.json`, if a home directory exists.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(CONFIG_FILE_NAME))
    }

    /// Load preferences from `path`.
    ///
    /// A missing file yields the defaults. A file that is not valid JSON
    /// also yields the defaults, with a warning; only I/O failures other
    /// than "not found" are errors.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No preferences file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        match serde_json::from_str(&contents) {
            Ok(prefs) => Ok(prefs),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Preferences file is corrupt, using defaults"
                );
                Ok(Self::default())
            }
        }
    }

    /// Write preferences to `path`, creating parent directories.
    pub fn save(&mut self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        self.saved_at = Some(Utc::now());
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!(path = %path.display(), "Preferences saved");
        Ok(())
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Switch between light and dark, returning the new theme.
    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.theme
    }

    /// Remember where a dialog ended up.
    ///
    /// For files the containing directory is stored.
    pub fn remember(&mut self, key: &str, path: &Path) {
        let dir = if path.is_file() {
            path.parent().unwrap_or(path)
        } else {
            path
        };
        self.last_paths.insert(key.to_string(), dir.to_path_buf());
    }

    /// Directory a dialog should open in.
    ///
    /// Falls back to the home directory, then the current directory.
    pub fn initial_dir(&self, key: &str) -> PathBuf {
        self.last_paths
            .get(key)
            .cloned()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn last_path(&self, key: &str) -> Option<&Path> {
        self.last_paths.get(key).map(PathBuf::as_path)
    }

    pub fn last_paths(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.last_paths
            .iter()
            .map(|(key, path)| (key.as_str(), path.as_path()))
    }

    pub fn saved_at(&self) -> Option<DateTime<Utc>> {
        self.saved_at
    }
}
