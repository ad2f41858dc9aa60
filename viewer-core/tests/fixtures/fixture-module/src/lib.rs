//! Dynamic library fixtures for the native loader tests
//!
//! Built without features, the library exports nothing the viewer looks for.
//! With `stale-api` it exports the plugin entry points but reports an API
//! version the host does not accept.

#[cfg(not(feature = "stale-api"))]
#[unsafe(no_mangle)]
pub extern "C" fn fixture_module_answer() -> u32 {
    42
}

#[cfg(feature = "stale-api")]
mod stale {
    use viewer_plugin_api::{API_VERSION, ViewerPlugin};

    #[derive(Default)]
    struct StalePlugin;

    impl ViewerPlugin for StalePlugin {
        fn name(&self) -> String {
            "Stale".to_string()
        }

        fn is_init(&self) -> bool {
            true
        }

        fn do_init(&mut self) {}

        fn error_msg(&self) -> String {
            String::new()
        }
    }

    #[unsafe(no_mangle)]
    pub extern "C" fn _viewer_plugin_api_version() -> u32 {
        API_VERSION + 1
    }

    #[unsafe(no_mangle)]
    #[allow(improper_ctypes_definitions)]
    pub extern "C" fn _viewer_plugin_create() -> *mut dyn ViewerPlugin {
        let plugin: Box<dyn ViewerPlugin> = Box::new(StalePlugin);
        Box::into_raw(plugin)
    }
}
