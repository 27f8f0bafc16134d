//! Installer settings loaded from a YAML file on disk.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::domain::InstallerSettings;

/// Default location of the settings file.
pub const DEFAULT_SETTINGS_PATH: &str = "/etc/hostwatch/installer.yaml";

/// Reads [`InstallerSettings`] from a YAML file.
pub struct YamlSettingsStore {
    path: PathBuf,
}

impl YamlSettingsStore {
    /// Use `path` if given, otherwise [`DEFAULT_SETTINGS_PATH`].
    #[must_use]
    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            path: path.unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_PATH)),
        }
    }

    /// Path the settings are read from.
    #[must_use]
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Load settings; a missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(&self) -> Result<InstallerSettings> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "no settings file, using defaults");
            return Ok(InstallerSettings::default());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("cannot read {}", self.path.display()))?;
        if content.trim().is_empty() {
            return Ok(InstallerSettings::default());
        }
        serde_yaml::from_str(&content)
            .with_context(|| format!("cannot parse {}", self.path.display()))
    }
}
