//! Status surface - read-only projection of catalog records for listings

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use super::catalog::{PluginRecord, PluginState};

/// Status of a successfully initialized plugin
pub const LOADED_CORRECTLY: &str = "Plugin loaded correctly";

/// Status of a resident module without the capability contract
pub const WRONG_INTERFACE: &str = "Wrong interface";

/// Status of a resident module not initialized yet
pub const NOT_INITIALIZED: &str = "Plugin not initialized";

/// Status of a module that is not resident and has no loader error
pub const NOT_LOADED: &str = "Plugin not loaded";

/// Advisory severity for display; never drives lifecycle decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Critical => "critical",
        };
        f.write_str(s)
    }
}

/// Human-readable status of a record
pub fn status(record: &PluginRecord) -> String {
    match record.state() {
        PluginState::Initialized => LOADED_CORRECTLY.to_string(),
        PluginState::InitFailed => record
            .last_error()
            .unwrap_or(WRONG_INTERFACE)
            .to_string(),
        PluginState::Loaded => NOT_INITIALIZED.to_string(),
        PluginState::Declared | PluginState::LoadFailed | PluginState::Unloaded => {
            record.last_error().unwrap_or(NOT_LOADED).to_string()
        }
    }
}

pub fn severity(record: &PluginRecord) -> Severity {
    match record.state() {
        PluginState::Initialized => Severity::Info,
        PluginState::Loaded | PluginState::InitFailed => Severity::Warning,
        PluginState::Declared | PluginState::LoadFailed | PluginState::Unloaded => {
            Severity::Critical
        }
    }
}

/// Snapshot of one catalog entry for a management UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginInfo {
    /// Catalog key, usually the library file name
    pub id: String,
    /// Resolved library path
    pub path: PathBuf,
    /// Name reported by the plugin, or the id
    pub name: String,
    pub version: Option<String>,
    pub state: PluginState,
    pub status: String,
    pub severity: Severity,
}

impl From<&PluginRecord> for PluginInfo {
    fn from(record: &PluginRecord) -> Self {
        Self {
            id: record.id().to_string(),
            path: record.path().to_path_buf(),
            name: record.display_name().to_string(),
            version: record.version().map(str::to_string),
            state: record.state(),
            status: status(record),
            severity: severity(record),
        }
    }
}
