//! viewer-core: Core library for the scene viewer
//!
//! This crate provides the plugin lifecycle manager used by the viewer:
//!
//! - **Discovery** - [`PluginManager::discover`] declares every dynamic
//!   library found in the registered search directories
//! - **Lifecycle** - load, initialize and unload plugins on demand, with
//!   per-plugin failure isolation
//! - **Status** - [`PluginInfo`] snapshots for management UIs
//! - **Settings** - [`PluginSettings`] read/write hooks backed by a
//!   [`SettingsStore`]
//!
//! # Quick Start
//!
//! ```no_run
//! use viewer_core::{PluginManager, PluginManagerConfig, NativeLoader};
//!
//! let mut manager =
//!     PluginManager::with_config(PluginManagerConfig::default(), Box::new(NativeLoader));
//! manager.discover();
//!
//! for info in manager.entries() {
//!     println!("{} [{}] {}", info.name, info.severity, info.status);
//! }
//! ```

pub mod plugins;

// Re-export key types for convenience
pub use plugins::{
    NativeLoader, PluginError, PluginInfo, PluginManager, PluginManagerConfig, PluginSettings,
    PluginState, SettingsStore, Severity, TomlSettingsStore, UnloadReport,
};
