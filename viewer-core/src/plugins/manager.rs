//! PluginManager - declares, loads, initializes and unloads plugins

use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};

use super::catalog::{PluginCatalog, PluginRecord, PluginState};
use super::directories::DirectoryRegistry;
use super::error::PluginError;
use super::loader::ModuleLoader;
use super::native::NativeLoader;
use super::settings::PluginSettings;
use super::status::{self, PluginInfo, Severity};

const INIT_PANICKED: &str = "Plugin panicked during initialization";
const UNLOAD_PANICKED: &str = "Plugin panicked during unload";
const INIT_FAILED: &str = "Plugin initialization failed";

/// Configuration for PluginManager
#[derive(Debug, Clone)]
pub struct PluginManagerConfig {
    /// Search directories, registered in order
    pub directories: Vec<PathBuf>,
}

impl Default for PluginManagerConfig {
    fn default() -> Self {
        Self {
            directories: vec![viewer_paths::plugin_dir()],
        }
    }
}

/// Outcome of [`PluginManager::unload_all`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnloadReport {
    /// Records visited, resident or not
    pub attempted: usize,
    /// Ids whose unload reported an error, in catalog order
    pub failed: Vec<String>,
}

/// Owns the plugin catalog and drives every record through its lifecycle
///
/// All operations run to completion on the calling thread. Callers sharing a
/// manager across threads must serialize access themselves, e.g. behind a
/// `Mutex`. Dropping the manager unloads every resident module.
pub struct PluginManager {
    directories: DirectoryRegistry,
    catalog: PluginCatalog,
    loader: Box<dyn ModuleLoader>,
}

impl PluginManager {
    /// Create an empty manager using the given loader
    pub fn new(loader: Box<dyn ModuleLoader>) -> Self {
        Self {
            directories: DirectoryRegistry::new(),
            catalog: PluginCatalog::new(),
            loader,
        }
    }

    /// Create an empty manager loading platform dynamic libraries
    pub fn native() -> Self {
        Self::new(Box::new(NativeLoader))
    }

    /// Create a manager and register the configured directories
    pub fn with_config(config: PluginManagerConfig, loader: Box<dyn ModuleLoader>) -> Self {
        let mut manager = Self::new(loader);
        for dir in &config.directories {
            manager.add_directory(dir);
        }
        manager
    }

    // ─── Directories ─────────────────────────────────────────────────

    /// Register a search directory
    ///
    /// Missing, unreadable and duplicate directories are ignored.
    pub fn add_directory(&mut self, path: impl AsRef<Path>) -> bool {
        self.directories.add(path)
    }

    /// Registered search directories in registration order
    pub fn directories(&self) -> impl Iterator<Item = &Path> + Clone {
        self.directories.iter()
    }

    // ─── Declaration ─────────────────────────────────────────────────

    /// Declare a plugin without loading it
    ///
    /// Returns `false` if `id` is already declared. `location_hint` names the
    /// library file itself. The library path is the hint when absolute or when
    /// it names an existing file, then `id` when absolute, otherwise the first
    /// registered directory containing a file named `id`. When nothing
    /// matches, `id` itself is used and the error surfaces on load.
    pub fn declare(&mut self, id: &str, location_hint: Option<&Path>) -> bool {
        if self.catalog.contains(id) {
            tracing::debug!(plugin = %id, "Plugin already declared");
            return false;
        }

        let path = self.resolve_path(id, location_hint);
        tracing::debug!(plugin = %id, path = %path.display(), "Plugin declared");
        self.catalog.insert(PluginRecord::new(id.to_string(), path))
    }

    fn resolve_path(&self, id: &str, location_hint: Option<&Path>) -> PathBuf {
        if let Some(hint) = location_hint {
            if hint.is_absolute() || hint.is_file() {
                return hint.to_path_buf();
            }
            tracing::debug!(plugin = %id, hint = %hint.display(), "Ignoring location hint");
        }

        let id_path = Path::new(id);
        if id_path.is_absolute() {
            return id_path.to_path_buf();
        }

        self.directories
            .find(id)
            .unwrap_or_else(|| id_path.to_path_buf())
    }

    /// Declare every library found in the registered directories
    ///
    /// Files are visited directory by directory, sorted by name. Returns the
    /// number of newly declared plugins; ids already in the catalog are left
    /// untouched, so repeated discovery is idempotent.
    pub fn discover(&mut self) -> usize {
        let mut found = Vec::new();

        for dir in self.directories.iter() {
            tracing::debug!(dir = %dir.display(), "Looking for plugins");

            let entries = match std::fs::read_dir(dir) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(dir = %dir.display(), error = %e, "Cannot list plugin directory");
                    continue;
                }
            };

            let mut libraries: Vec<(String, PathBuf)> = entries
                .filter_map(Result::ok)
                .filter(|entry| entry.path().is_file())
                .filter_map(|entry| {
                    let name = entry.file_name().into_string().ok()?;
                    self.loader
                        .is_library(&name)
                        .then(|| (name, entry.path()))
                })
                .collect();
            libraries.sort();
            found.extend(libraries);
        }

        let mut declared = 0;
        for (name, path) in found {
            if self.catalog.contains(&name) {
                continue;
            }
            tracing::debug!(plugin = %name, "Found plugin");
            if self.declare(&name, Some(&path)) {
                if let Some(record) = self.catalog.get_mut(&name) {
                    record.discovered = true;
                }
                declared += 1;
            }
        }

        if declared > 0 {
            tracing::info!(count = declared, "Discovered plugins");
        }
        declared
    }

    // ─── Lifecycle ───────────────────────────────────────────────────

    /// Load a declared plugin's library
    ///
    /// Loading a plugin that is already resident does nothing.
    pub fn load(&mut self, id: &str) -> Result<(), PluginError> {
        let record = self
            .catalog
            .get_mut(id)
            .ok_or_else(|| not_declared(id))?;

        if record.state.is_resident() {
            tracing::debug!(plugin = %id, "Plugin already loaded");
            return Ok(());
        }

        match self.loader.load(&record.path) {
            Ok(module) => {
                record.module = Some(module);
                record.state = PluginState::Loaded;
                record.last_error = None;
                tracing::info!(plugin = %id, path = %record.path.display(), "Plugin loaded");
                Ok(())
            }
            Err(message) => {
                record.state = PluginState::LoadFailed;
                record.last_error = Some(message.clone());
                tracing::warn!(plugin = %id, error = %message, "Failed to load plugin");
                Err(PluginError::LoadFailure {
                    id: id.to_string(),
                    message,
                })
            }
        }
    }

    /// Initialize a loaded plugin through its capability contract
    ///
    /// Initializing an already initialized plugin does nothing. A missing
    /// contract, a reported failure, or a panic leaves the module resident in
    /// [`PluginState::InitFailed`].
    ///
    /// A reported failure records the plugin's `error_msg()` verbatim, except
    /// that an empty message is recorded as "Plugin initialization failed".
    pub fn initialize(&mut self, id: &str) -> Result<(), PluginError> {
        let record = self
            .catalog
            .get_mut(id)
            .ok_or_else(|| not_declared(id))?;

        match record.state {
            PluginState::Initialized => return Ok(()),
            PluginState::Loaded => {}
            _ => return Err(not_loaded(id)),
        }
        let Some(module) = record.module.as_mut() else {
            return Err(not_loaded(id));
        };

        // Plugin code runs with panic isolation
        let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| {
            let plugin = module.capability()?;
            if !plugin.is_init() {
                plugin.do_init();
            }
            Some(if plugin.is_init() {
                Ok((plugin.name(), plugin.version()))
            } else {
                Err(plugin.error_msg())
            })
        }));

        let error = match outcome {
            Ok(Some(Ok((name, version)))) => {
                record.state = PluginState::Initialized;
                record.last_error = None;
                record.version = (!version.is_empty()).then_some(version);
                tracing::info!(plugin = %id, name = %name, "Plugin initialized");
                record.name = Some(name);
                return Ok(());
            }
            Ok(Some(Err(message))) => {
                let message = if message.is_empty() {
                    INIT_FAILED.to_string()
                } else {
                    message
                };
                PluginError::InitFailure {
                    id: id.to_string(),
                    message,
                }
            }
            Ok(None) => PluginError::WrongInterface { id: id.to_string() },
            Err(_) => {
                tracing::error!(plugin = %id, "Plugin panicked during initialization");
                PluginError::InitFailure {
                    id: id.to_string(),
                    message: INIT_PANICKED.to_string(),
                }
            }
        };

        record.state = PluginState::InitFailed;
        record.last_error = Some(error.record_message());
        tracing::warn!(plugin = %id, error = %error, "Plugin initialization failed");
        Err(error)
    }

    /// Load then initialize, stopping at the first failure
    pub fn load_and_initialize(&mut self, id: &str) -> Result<(), PluginError> {
        self.load(id)?;
        self.initialize(id)
    }

    /// Unload a resident plugin
    ///
    /// The record moves to [`PluginState::Unloaded`] even when the native
    /// unload reports an error; that error is returned and kept on the record.
    pub fn unload(&mut self, id: &str) -> Result<(), PluginError> {
        let record = self
            .catalog
            .get_mut(id)
            .ok_or_else(|| not_declared(id))?;

        let Some(module) = record.module.take() else {
            return Err(not_loaded(id));
        };

        record.state = PluginState::Unloaded;
        record.name = None;
        record.version = None;

        let result = std::panic::catch_unwind(AssertUnwindSafe(|| module.unload()))
            .unwrap_or_else(|_| Err(UNLOAD_PANICKED.to_string()));

        match result {
            Ok(()) => {
                record.last_error = None;
                tracing::info!(plugin = %id, "Plugin unloaded");
                Ok(())
            }
            Err(message) => {
                record.last_error = Some(message.clone());
                record.unload_failures += 1;
                tracing::warn!(
                    plugin = %id,
                    error = %message,
                    failures = record.unload_failures,
                    "Failed to unload plugin"
                );
                Err(PluginError::UnloadFailure {
                    id: id.to_string(),
                    message,
                })
            }
        }
    }

    /// Unload when resident, otherwise load and initialize
    ///
    /// Returns the resulting state.
    pub fn toggle(&mut self, id: &str) -> Result<PluginState, PluginError> {
        let resident = self
            .catalog
            .get(id)
            .ok_or_else(|| not_declared(id))?
            .state
            .is_resident();

        if resident {
            self.unload(id)?;
        } else {
            self.load_and_initialize(id)?;
        }
        Ok(self.catalog.get(id).map_or(PluginState::Declared, |r| r.state))
    }

    /// Attempt to unload every record
    ///
    /// Visits the whole catalog and keeps going past individual failures.
    /// A record without a resident module is an attempted no-op: it is counted
    /// in [`UnloadReport::attempted`], keeps its state and is not a failure.
    pub fn unload_all(&mut self) -> UnloadReport {
        let ids: Vec<String> = self.catalog.ids().map(str::to_string).collect();

        let mut report = UnloadReport::default();
        for id in ids {
            report.attempted += 1;
            match self.unload(&id) {
                Ok(()) => {}
                Err(PluginError::NotLoaded { .. }) => {
                    tracing::trace!(plugin = %id, "Nothing to unload");
                }
                Err(e) => {
                    tracing::debug!(plugin = %id, error = %e, "Continuing teardown");
                    report.failed.push(id);
                }
            }
        }
        report
    }

    // ─── Introspection ───────────────────────────────────────────────

    pub fn catalog(&self) -> &PluginCatalog {
        &self.catalog
    }

    pub fn get(&self, id: &str) -> Option<&PluginRecord> {
        self.catalog.get(id)
    }

    pub fn state(&self, id: &str) -> Option<PluginState> {
        self.catalog.get(id).map(PluginRecord::state)
    }

    /// Human-readable status, `None` for undeclared ids
    pub fn status(&self, id: &str) -> Option<String> {
        self.catalog.get(id).map(status::status)
    }

    pub fn severity(&self, id: &str) -> Option<Severity> {
        self.catalog.get(id).map(status::severity)
    }

    pub fn info(&self, id: &str) -> Option<PluginInfo> {
        self.catalog.get(id).map(PluginInfo::from)
    }

    /// Snapshot of every catalog entry in declaration order
    pub fn entries(&self) -> Vec<PluginInfo> {
        self.catalog.iter().map(PluginInfo::from).collect()
    }

    // ─── Settings ────────────────────────────────────────────────────

    /// Register the stored directories and declare the stored plugins
    ///
    /// Returns the number of newly declared plugins.
    pub fn apply_settings(&mut self, settings: &PluginSettings) -> usize {
        for dir in &settings.directories {
            self.add_directory(dir);
        }
        settings
            .plugins
            .iter()
            .filter(|id| self.declare(id, None))
            .count()
    }

    /// Current directories and explicitly declared plugins
    ///
    /// Discovered plugins are left out; they are found again on the next
    /// discovery.
    pub fn settings(&self) -> PluginSettings {
        PluginSettings {
            directories: self.directories.iter().map(Path::to_path_buf).collect(),
            plugins: self
                .catalog
                .iter()
                .filter(|record| !record.discovered)
                .map(|record| record.id.clone())
                .collect(),
        }
    }
}

impl Drop for PluginManager {
    fn drop(&mut self) {
        let report = self.unload_all();
        if !report.failed.is_empty() {
            tracing::warn!(plugins = ?report.failed, "Some plugins failed to unload");
        }
    }
}

fn not_declared(id: &str) -> PluginError {
    PluginError::NotDeclared { id: id.to_string() }
}

fn not_loaded(id: &str) -> PluginError {
    PluginError::NotLoaded { id: id.to_string() }
}
