//! Loader adapter - the seam between the plugin manager and native code
//!
//! [`ModuleLoader`] turns a path into a resident [`LoadedModule`]; the manager
//! never touches a dynamic library except through these two traits. The
//! production implementation is [`NativeLoader`](super::NativeLoader); tests
//! use [`MockLoader`](super::mock::MockLoader).

use std::env::consts::DLL_SUFFIX;
use std::path::Path;

use viewer_plugin_api::ViewerPlugin;

/// Loads dynamic libraries
pub trait ModuleLoader: Send {
    /// Load the library at `path`
    ///
    /// On failure, returns the loader's diagnostic message.
    fn load(&mut self, path: &Path) -> Result<Box<dyn LoadedModule>, String>;

    /// Whether a file name follows the platform's dynamic-library convention
    fn is_library(&self, file_name: &str) -> bool {
        file_name.len() > DLL_SUFFIX.len() && file_name.ends_with(DLL_SUFFIX)
    }
}

/// A resident module returned by [`ModuleLoader::load`]
pub trait LoadedModule: Send {
    /// Query the module for the capability contract
    ///
    /// The first call resolves the contract; later calls return the same
    /// instance. `None` means the module does not expose it.
    fn capability(&mut self) -> Option<&mut (dyn ViewerPlugin + 'static)>;

    /// Release the module
    ///
    /// The module is gone after this call whether or not it reports an error.
    fn unload(self: Box<Self>) -> Result<(), String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoopLoader;

    impl ModuleLoader for NoopLoader {
        fn load(&mut self, path: &Path) -> Result<Box<dyn LoadedModule>, String> {
            Err(format!("{}: not supported", path.display()))
        }
    }

    #[test]
    fn test_is_library_uses_platform_suffix() {
        let loader = NoopLoader;
        assert!(loader.is_library(&format!("foo{DLL_SUFFIX}")));
        assert!(!loader.is_library("foo.txt"));
        assert!(!loader.is_library(DLL_SUFFIX));
    }

    #[test]
    fn test_loader_is_object_safe() {
        let mut loader: Box<dyn ModuleLoader> = Box::new(NoopLoader);
        let err = loader.load(Path::new("/tmp/foo")).err().unwrap();
        assert!(err.contains("not supported"));
    }
}
