//! Native loader - `libloading` implementation of the loader adapter
//!
//! All unsafe interaction with plugin libraries is confined to this file.

use libloading::{Library, Symbol};
use std::path::{Path, PathBuf};

use viewer_plugin_api::{
    API_VERSION, API_VERSION_SYMBOL, CREATE_SYMBOL, DESTROY_SYMBOL, ViewerPlugin,
};

use super::loader::{LoadedModule, ModuleLoader};

type CreateFn = extern "C" fn() -> *mut dyn ViewerPlugin;
type DestroyFn = extern "C" fn(*mut dyn ViewerPlugin);

/// Loads plugins as platform dynamic libraries
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeLoader;

impl ModuleLoader for NativeLoader {
    fn load(&mut self, path: &Path) -> Result<Box<dyn LoadedModule>, String> {
        // SAFETY: Loading runs the library's initializers. The user asked for
        // this plugin to be loaded; misbehaving native code is outside our control.
        let library = unsafe { Library::new(path) }.map_err(|e| e.to_string())?;

        Ok(Box::new(NativeModule {
            path: path.to_path_buf(),
            library: Some(library),
            instance: None,
            queried: false,
        }))
    }
}

/// A resident dynamic library and, once queried, its plugin instance
struct NativeModule {
    path: PathBuf,
    library: Option<Library>,
    /// Created by the library's create symbol
    instance: Option<Box<dyn ViewerPlugin>>,
    queried: bool,
}

impl NativeModule {
    fn create_instance(&self) -> Option<Box<dyn ViewerPlugin>> {
        let library = self.library.as_ref()?;

        // SAFETY: The symbol is declared by `export_plugin!` with this signature.
        let version_fn: Symbol<extern "C" fn() -> u32> =
            match unsafe { library.get(API_VERSION_SYMBOL) } {
                Ok(f) => f,
                Err(e) => {
                    tracing::debug!(path = %self.path.display(), error = %e, "No plugin API version symbol");
                    return None;
                }
            };

        let found = version_fn();
        if found != API_VERSION {
            tracing::warn!(
                path = %self.path.display(),
                expected = API_VERSION,
                found,
                "Plugin API version mismatch"
            );
            return None;
        }

        // SAFETY: As above; the version check guarantees the contract layout matches.
        let create_fn: Symbol<CreateFn> = match unsafe { library.get(CREATE_SYMBOL) } {
            Ok(f) => f,
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e, "No plugin create symbol");
                return None;
            }
        };

        let raw = create_fn();
        if raw.is_null() {
            return None;
        }

        // SAFETY: `raw` was produced by `Box::into_raw` in the plugin's create function.
        Some(unsafe { Box::from_raw(raw) })
    }

    /// Hand the instance back to the library that allocated it
    fn destroy_instance(&mut self) {
        let Some(instance) = self.instance.take() else {
            return;
        };
        let raw = Box::into_raw(instance);

        let destroy_fn = self.library.as_ref().and_then(|library| {
            // SAFETY: The symbol is declared by `export_plugin!` with this signature.
            unsafe { library.get::<DestroyFn>(DESTROY_SYMBOL) }.ok()
        });

        match destroy_fn {
            Some(destroy) => destroy(raw),
            // SAFETY: `raw` came from `Box::into_raw` just above.
            None => drop(unsafe { Box::from_raw(raw) }),
        }
    }
}

impl LoadedModule for NativeModule {
    fn capability(&mut self) -> Option<&mut (dyn ViewerPlugin + 'static)> {
        if !self.queried {
            self.queried = true;
            self.instance = self.create_instance();
        }
        self.instance.as_deref_mut()
    }

    fn unload(mut self: Box<Self>) -> Result<(), String> {
        self.destroy_instance();
        match self.library.take() {
            Some(library) => library.close().map_err(|e| e.to_string()),
            None => Ok(()),
        }
    }
}

impl Drop for NativeModule {
    fn drop(&mut self) {
        // The instance holds code from the library, so it must go first
        self.destroy_instance();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_file_reports_loader_error() {
        let mut loader = NativeLoader;
        let err = loader
            .load(Path::new("/nonexistent/libmissing.so"))
            .err()
            .unwrap();
        assert!(!err.is_empty());
    }

    #[test]
    fn test_load_garbage_file_reports_loader_error() {
        let dir = TempDir::new().unwrap();
        let path = dir
            .path()
            .join(format!("garbage{}", std::env::consts::DLL_SUFFIX));
        std::fs::write(&path, b"this is not a shared object").unwrap();

        let mut loader = NativeLoader;
        assert!(loader.load(&path).is_err());
    }
}
