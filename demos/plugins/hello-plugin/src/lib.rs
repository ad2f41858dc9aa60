//! Hello Plugin - A simple example plugin for the scene viewer
//!
//! This plugin demonstrates:
//! - Basic plugin structure with the `export_plugin!` macro
//! - Implementing the `ViewerPlugin` capability contract
//! - Reporting an initialization failure through `error_msg`
//!
//! ## Building
//!
//! ```bash
//! cargo build --release
//! ```
//!
//! ## Installing
//!
//! ```bash
//! mkdir -p ~/.config/viewer/plugins
//! cp target/release/libhello_plugin.so ~/.config/viewer/plugins/
//! viewer plugin load libhello_plugin.so
//! ```
//!
//! Set `HELLO_PLUGIN_FAIL=1` to see how a failed initialization is reported.

use viewer_plugin_api::{ViewerPlugin, export_plugin};

#[derive(Default)]
pub struct HelloPlugin {
    initialized: bool,
    error: String,
}

impl ViewerPlugin for HelloPlugin {
    fn name(&self) -> String {
        "Hello".to_string()
    }

    fn is_init(&self) -> bool {
        self.initialized
    }

    fn do_init(&mut self) {
        if std::env::var_os("HELLO_PLUGIN_FAIL").is_some() {
            self.error = "HELLO_PLUGIN_FAIL is set".to_string();
            return;
        }
        self.initialized = true;
    }

    fn error_msg(&self) -> String {
        self.error.clone()
    }

    fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }
}

// This macro generates the C ABI entry points for dynamic loading
export_plugin!(HelloPlugin);
