//! Plugin system for the scene viewer
//!
//! This module provides the infrastructure for discovering, loading and
//! managing extension modules:
//!
//! - [`PluginManager`]: declares, loads, initializes and unloads plugins
//! - [`DirectoryRegistry`]: canonical, deduplicated search directories
//! - [`PluginCatalog`]: the id → [`PluginRecord`] mapping that holds all state
//! - [`ModuleLoader`]/[`LoadedModule`]: the seam to native code, implemented
//!   by [`NativeLoader`] and, for tests, [`mock::MockLoader`]
//! - [`PluginInfo`], [`status()`], [`Severity`]: read-only status for listings
//! - [`PluginSettings`]/[`SettingsStore`]: persisted directories and plugin ids
//!
//! # Lifecycle
//!
//! ```text
//!  declare ──► Declared ──load──► Loaded ──initialize──► Initialized
//!                 │                  │                        │
//!                 └─► LoadFailed     └─► InitFailed           │
//!                                         │                   │
//!                      Unloaded ◄──unload─┴───────────────────┘
//! ```
//!
//! Records are never removed; an unloaded plugin can be loaded again.
//!
//! # Example
//!
//! ```no_run
//! use viewer_core::plugins::{PluginManager, PluginState};
//!
//! let mut manager = PluginManager::native();
//! manager.add_directory("/opt/viewer/plugins");
//! manager.discover();
//!
//! for id in manager.catalog().ids().map(str::to_string).collect::<Vec<_>>() {
//!     if let Err(e) = manager.load_and_initialize(&id) {
//!         eprintln!("{id}: {e}");
//!     }
//! }
//!
//! let ready = manager
//!     .entries()
//!     .iter()
//!     .filter(|p| p.state == PluginState::Initialized)
//!     .count();
//! println!("{ready} plugins ready");
//! ```

mod catalog;
mod directories;
mod error;
mod loader;
mod manager;
pub mod mock;
mod native;
mod settings;
mod status;

pub use catalog::{PluginCatalog, PluginRecord, PluginState};
pub use directories::{DirectoryRegistry, PluginDirectory};
pub use error::PluginError;
pub use loader::{LoadedModule, ModuleLoader};
pub use manager::{PluginManager, PluginManagerConfig, UnloadReport};
pub use native::NativeLoader;
pub use settings::{PluginSettings, SettingsStore, TomlSettingsStore};
pub use status::{
    LOADED_CORRECTLY, NOT_INITIALIZED, NOT_LOADED, PluginInfo, Severity, WRONG_INTERFACE,
    severity, status,
};
