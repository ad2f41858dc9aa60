//! XDG Base Directory paths for the scene viewer.
//!
//! The viewer uses XDG paths on every platform so that plugin directories
//! and settings live in the same place regardless of host OS.

use std::path::PathBuf;

/// Get the viewer config directory.
///
/// Returns `$XDG_CONFIG_HOME/viewer` if set, otherwise `~/.config/viewer`.
///
/// # Examples
///
/// ```
/// use viewer_paths::config_dir;
///
/// let config = config_dir();
/// let settings = config.join("plugins.toml");
/// ```
pub fn config_dir() -> PathBuf {
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        PathBuf::from(xdg_config).join("viewer")
    } else if let Some(home) = dirs::home_dir() {
        home.join(".config/viewer")
    } else {
        PathBuf::from(".config/viewer")
    }
}

/// Default directory searched for plugin libraries.
pub fn plugin_dir() -> PathBuf {
    config_dir().join("plugins")
}

/// Default location of the persisted plugin settings.
pub fn plugin_settings_file() -> PathBuf {
    config_dir().join("plugins.toml")
}
