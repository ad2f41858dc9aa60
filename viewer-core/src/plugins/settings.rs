//! Plugin settings - search directories and pre-declared plugins
//!
//! The manager reads and writes [`PluginSettings`] through
//! [`PluginManager::apply_settings`](super::PluginManager::apply_settings) and
//! [`PluginManager::settings`](super::PluginManager::settings); where and how
//! they are stored is up to the [`SettingsStore`].

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::error::PluginError;

/// Persisted plugin settings
///
/// Stored as TOML in `~/.config/viewer/plugins.toml` by default
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginSettings {
    /// Search directories, in registration order
    #[serde(default)]
    pub directories: Vec<PathBuf>,
    /// Plugin ids declared at startup
    #[serde(default)]
    pub plugins: Vec<String>,
}

impl PluginSettings {
    /// Add a directory unless already listed
    pub fn add_directory(&mut self, dir: impl Into<PathBuf>) {
        let dir = dir.into();
        if !self.directories.contains(&dir) {
            self.directories.push(dir);
        }
    }

    /// Add a plugin id unless already listed
    pub fn add_plugin(&mut self, id: &str) {
        if !self.plugins.iter().any(|p| p == id) {
            self.plugins.push(id.to_string());
        }
    }
}

/// Storage backend for [`PluginSettings`]
pub trait SettingsStore {
    fn load(&self) -> Result<PluginSettings, PluginError>;

    fn save(&self, settings: &PluginSettings) -> Result<(), PluginError>;
}

/// TOML file settings store
#[derive(Debug, Clone)]
pub struct TomlSettingsStore {
    path: PathBuf,
}

impl TomlSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for TomlSettingsStore {
    fn default() -> Self {
        Self::new(viewer_paths::plugin_settings_file())
    }
}

impl SettingsStore for TomlSettingsStore {
    /// Returns empty settings if the file doesn't exist.
    fn load(&self) -> Result<PluginSettings, PluginError> {
        if !self.path.exists() {
            return Ok(PluginSettings::default());
        }
        let content = std::fs::read_to_string(&self.path)?;
        toml::from_str(&content).map_err(|e| PluginError::Settings(e.to_string()))
    }

    fn save(&self, settings: &PluginSettings) -> Result<(), PluginError> {
        let content = toml::to_string_pretty(settings)
            .map_err(|e| PluginError::Settings(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.exists()) {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_settings_default_is_empty() {
        let settings = PluginSettings::default();
        assert!(settings.directories.is_empty());
        assert!(settings.plugins.is_empty());
    }

    #[test]
    fn test_add_deduplicates() {
        let mut settings = PluginSettings::default();
        settings.add_directory("/plugins");
        settings.add_directory("/plugins");
        settings.add_plugin("foo.so");
        settings.add_plugin("foo.so");
        assert_eq!(settings.directories.len(), 1);
        assert_eq!(settings.plugins, vec!["foo.so".to_string()]);
    }

    #[test]
    fn test_load_missing_file() {
        let store = TomlSettingsStore::new("/nonexistent/path/plugins.toml");
        assert_eq!(store.load().unwrap(), PluginSettings::default());
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = TomlSettingsStore::new(dir.path().join("plugins.toml"));

        let mut settings = PluginSettings::default();
        settings.add_directory("/opt/viewer/plugins");
        settings.add_plugin("foo.so");
        settings.add_plugin("bar.so");
        store.save(&settings).unwrap();

        assert_eq!(store.load().unwrap(), settings);
    }

    #[test]
    fn test_save_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let store = TomlSettingsStore::new(dir.path().join("nested/dir/plugins.toml"));

        store.save(&PluginSettings::default()).unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let settings: PluginSettings = toml::from_str("plugins = [\"foo.so\"]").unwrap();
        assert!(settings.directories.is_empty());
        assert_eq!(settings.plugins, vec!["foo.so".to_string()]);
    }

    #[test]
    fn test_invalid_file_is_settings_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plugins.toml");
        std::fs::write(&path, "directories = 42").unwrap();

        let result = TomlSettingsStore::new(&path).load();
        assert!(matches!(result, Err(PluginError::Settings(_))));
    }
}
