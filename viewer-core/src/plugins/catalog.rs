//! Plugin catalog - the authoritative id → record mapping

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use super::loader::LoadedModule;

/// Lifecycle state of a plugin record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PluginState {
    /// Known to the catalog, never loaded
    Declared,
    /// Library resident, contract not initialized yet
    Loaded,
    /// The loader refused the library
    LoadFailed,
    /// Library resident and contract initialized
    Initialized,
    /// Library resident but the contract is missing or failed to initialize
    InitFailed,
    /// Library released; the record can be loaded again
    Unloaded,
}

impl PluginState {
    /// Whether a module is resident in this state
    pub fn is_resident(self) -> bool {
        matches!(self, Self::Loaded | Self::Initialized | Self::InitFailed)
    }
}

impl fmt::Display for PluginState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Declared => "declared",
            Self::Loaded => "loaded",
            Self::LoadFailed => "load failed",
            Self::Initialized => "initialized",
            Self::InitFailed => "init failed",
            Self::Unloaded => "unloaded",
        };
        f.write_str(s)
    }
}

/// Lifecycle record of one declared plugin
pub struct PluginRecord {
    pub(crate) id: String,
    pub(crate) path: PathBuf,
    pub(crate) state: PluginState,
    /// Present exactly when `state.is_resident()`
    pub(crate) module: Option<Box<dyn LoadedModule>>,
    /// Display name reported by the contract once initialized
    pub(crate) name: Option<String>,
    pub(crate) version: Option<String>,
    pub(crate) last_error: Option<String>,
    pub(crate) unload_failures: u32,
    /// Created by discovery rather than an explicit declaration
    pub(crate) discovered: bool,
}

impl PluginRecord {
    pub(crate) fn new(id: String, path: PathBuf) -> Self {
        Self {
            id,
            path,
            state: PluginState::Declared,
            module: None,
            name: None,
            version: None,
            last_error: None,
            unload_failures: 0,
            discovered: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Resolved library path
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    pub fn state(&self) -> PluginState {
        self.state
    }

    /// Name reported by the plugin, falling back to the id
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Last loader, plugin or unload error
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Number of native unloads that reported an error
    pub fn unload_failures(&self) -> u32 {
        self.unload_failures
    }

    pub fn is_discovered(&self) -> bool {
        self.discovered
    }
}

impl fmt::Debug for PluginRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRecord")
            .field("id", &self.id)
            .field("path", &self.path)
            .field("state", &self.state)
            .field("resident", &self.module.is_some())
            .field("name", &self.name)
            .field("last_error", &self.last_error)
            .field("unload_failures", &self.unload_failures)
            .field("discovered", &self.discovered)
            .finish()
    }
}

/// Insertion-ordered catalog of plugin records
///
/// Records are only ever added; an existing record is mutated in place and
/// never replaced.
#[derive(Debug, Default)]
pub struct PluginCatalog {
    records: IndexMap<String, PluginRecord>,
}

impl PluginCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new record
    ///
    /// Returns `false` without touching the catalog if the id is taken.
    pub(crate) fn insert(&mut self, record: PluginRecord) -> bool {
        if self.records.contains_key(&record.id) {
            return false;
        }
        self.records.insert(record.id.clone(), record);
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&PluginRecord> {
        self.records.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut PluginRecord> {
        self.records.get_mut(id)
    }

    /// Records in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &PluginRecord> {
        self.records.values()
    }

    /// Ids in declaration order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
