//! viewer-plugin-api - Plugin API for the scene viewer
//!
//! This crate provides the capability contract that extension modules must
//! implement to be usable by the viewer. Plugins are native Rust dynamic
//! libraries; the viewer discovers them on disk, loads them on demand and
//! initializes them through [`ViewerPlugin`].
//!
//! # Example
//!
//! ```ignore
//! use viewer_plugin_api::{ViewerPlugin, export_plugin};
//!
//! #[derive(Default)]
//! pub struct MyPlugin {
//!     ready: bool,
//! }
//!
//! impl ViewerPlugin for MyPlugin {
//!     fn name(&self) -> String {
//!         "My plugin".to_string()
//!     }
//!
//!     fn is_init(&self) -> bool {
//!         self.ready
//!     }
//!
//!     fn do_init(&mut self) {
//!         self.ready = true;
//!     }
//!
//!     fn error_msg(&self) -> String {
//!         String::new()
//!     }
//! }
//!
//! export_plugin!(MyPlugin);
//! ```

/// Current plugin API version. Plugins must match this exactly.
/// A library reporting any other version is treated as not exposing the contract.
pub const API_VERSION: u32 = 1;

/// Symbol returning the API version a plugin was built against.
pub const API_VERSION_SYMBOL: &[u8] = b"_viewer_plugin_api_version";

/// Symbol creating a new plugin instance.
pub const CREATE_SYMBOL: &[u8] = b"_viewer_plugin_create";

/// Symbol destroying an instance returned by [`CREATE_SYMBOL`].
pub const DESTROY_SYMBOL: &[u8] = b"_viewer_plugin_destroy";

/// The capability contract - implement this to create a viewer plugin.
///
/// The host never calls [`ViewerPlugin::do_init`] on an instance that already
/// reports [`ViewerPlugin::is_init`], and reads [`ViewerPlugin::error_msg`]
/// when initialization leaves the instance uninitialized.
pub trait ViewerPlugin: Send {
    /// Human-readable name shown in plugin listings
    fn name(&self) -> String;

    /// Whether the plugin finished initializing
    fn is_init(&self) -> bool;

    /// Initialize the plugin. Failure is reported through `is_init` and `error_msg`.
    fn do_init(&mut self);

    /// Explanation of the last initialization failure
    fn error_msg(&self) -> String;

    /// Plugin version, empty when unspecified
    fn version(&self) -> String {
        String::new()
    }
}

/// Export a plugin type for dynamic loading.
///
/// This macro generates the C ABI entry points that the viewer uses to
/// query, create and destroy plugin instances.
///
/// # Usage
///
/// ```ignore
/// viewer_plugin_api::export_plugin!(MyPlugin);
/// ```
///
/// # Generated Functions
///
/// - `_viewer_plugin_api_version()`: Returns the API version
/// - `_viewer_plugin_create()`: Creates a new plugin instance
/// - `_viewer_plugin_destroy()`: Destroys a plugin instance
#[macro_export]
macro_rules! export_plugin {
    ($plugin_type:ty) => {
        #[unsafe(no_mangle)]
        pub extern "C" fn _viewer_plugin_api_version() -> u32 {
            $crate::API_VERSION
        }

        #[unsafe(no_mangle)]
        #[allow(improper_ctypes_definitions)]
        pub extern "C" fn _viewer_plugin_create() -> *mut dyn $crate::ViewerPlugin {
            let plugin: Box<dyn $crate::ViewerPlugin> = Box::new(<$plugin_type>::default());
            Box::into_raw(plugin)
        }

        #[unsafe(no_mangle)]
        #[allow(improper_ctypes_definitions)]
        pub extern "C" fn _viewer_plugin_destroy(ptr: *mut dyn $crate::ViewerPlugin) {
            if !ptr.is_null() {
                unsafe {
                    drop(Box::from_raw(ptr));
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Minimal {
        ready: bool,
    }

    impl ViewerPlugin for Minimal {
        fn name(&self) -> String {
            "minimal".to_string()
        }

        fn is_init(&self) -> bool {
            self.ready
        }

        fn do_init(&mut self) {
            self.ready = true;
        }

        fn error_msg(&self) -> String {
            String::new()
        }
    }

    #[test]
    fn test_api_version_is_set() {
        assert_eq!(API_VERSION, 1);
    }

    #[test]
    fn test_plugin_trait_is_object_safe() {
        // This compiles only if ViewerPlugin is object-safe
        fn _takes_boxed_plugin(_: Box<dyn ViewerPlugin>) {}
    }

    #[test]
    fn test_version_defaults_to_empty() {
        assert!(Minimal::default().version().is_empty());
    }

    #[test]
    fn test_do_init_flips_is_init() {
        let mut plugin = Minimal::default();
        assert!(!plugin.is_init());
        plugin.do_init();
        assert!(plugin.is_init());
    }

    #[test]
    fn test_symbol_names_match_macro() {
        assert_eq!(API_VERSION_SYMBOL, b"_viewer_plugin_api_version");
        assert_eq!(CREATE_SYMBOL, b"_viewer_plugin_create");
        assert_eq!(DESTROY_SYMBOL, b"_viewer_plugin_destroy");
    }
}
