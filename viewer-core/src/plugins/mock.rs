//! Mock loader for testing
//!
//! [`MockLoader`] stands in for [`NativeLoader`](super::NativeLoader) so the
//! plugin manager can be exercised without building real dynamic libraries.
//! Modules are scripted per file name with [`MockModule`], and every native
//! call is counted in [`MockStats`].

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use viewer_plugin_api::ViewerPlugin;

use super::loader::{LoadedModule, ModuleLoader};

/// Scripted behavior of one mock module
#[derive(Debug, Clone)]
pub struct MockModule {
    name: String,
    version: String,
    has_contract: bool,
    init_error: Option<String>,
    panic_on_init: bool,
    load_error: Option<String>,
    /// Clear `load_error` after it has been reported once
    load_error_once: bool,
    unload_error: Option<String>,
}

impl MockModule {
    /// A module exposing the contract whose initialization succeeds
    pub fn conforming(name: &str) -> Self {
        Self {
            name: name.to_string(),
            version: String::new(),
            has_contract: true,
            init_error: None,
            panic_on_init: false,
            load_error: None,
            load_error_once: false,
            unload_error: None,
        }
    }

    /// A module that loads but does not expose the contract
    pub fn without_contract() -> Self {
        Self {
            has_contract: false,
            ..Self::conforming("")
        }
    }

    pub fn with_version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    /// Initialization leaves the plugin uninitialized with this message
    pub fn failing_init(mut self, message: &str) -> Self {
        self.init_error = Some(message.to_string());
        self
    }

    /// Initialization panics
    pub fn panicking_init(mut self) -> Self {
        self.panic_on_init = true;
        self
    }

    /// The loader refuses the module with this message
    pub fn failing_load(mut self, message: &str) -> Self {
        self.load_error = Some(message.to_string());
        self
    }

    /// The loader refuses the module once, then serves it normally
    pub fn failing_load_once(mut self, message: &str) -> Self {
        self.load_error = Some(message.to_string());
        self.load_error_once = true;
        self
    }

    /// The native unload reports this message
    pub fn failing_unload(mut self, message: &str) -> Self {
        self.unload_error = Some(message.to_string());
        self
    }
}

/// Shared counters of native calls made through a [`MockLoader`]
#[derive(Debug, Clone, Default)]
pub struct MockStats {
    loads: Arc<AtomicUsize>,
    unloads: Arc<AtomicUsize>,
    inits: Arc<AtomicUsize>,
}

impl MockStats {
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn unloads(&self) -> usize {
        self.unloads.load(Ordering::SeqCst)
    }

    pub fn inits(&self) -> usize {
        self.inits.load(Ordering::SeqCst)
    }
}

/// Mock implementation of [`ModuleLoader`]
///
/// Modules are looked up by the file name of the requested path. Unknown
/// file names fail to load.
#[derive(Debug, Default)]
pub struct MockLoader {
    modules: HashMap<String, MockModule>,
    stats: MockStats,
}

impl MockLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the module served for `file_name`
    pub fn with_module(mut self, file_name: &str, module: MockModule) -> Self {
        self.modules.insert(file_name.to_string(), module);
        self
    }

    /// Counters shared with this loader
    pub fn stats(&self) -> MockStats {
        self.stats.clone()
    }
}

impl ModuleLoader for MockLoader {
    fn load(&mut self, path: &Path) -> Result<Box<dyn LoadedModule>, String> {
        self.stats.loads.fetch_add(1, Ordering::SeqCst);

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();

        let Some(module) = self.modules.get_mut(file_name) else {
            return Err(format!(
                "Cannot load library {}: No such file or directory",
                path.display()
            ));
        };

        if module.load_error_once {
            if let Some(message) = module.load_error.take() {
                return Err(message);
            }
        } else if let Some(message) = &module.load_error {
            return Err(message.clone());
        }

        Ok(Box::new(ResidentMock {
            module: module.clone(),
            instance: None,
            queried: false,
            stats: self.stats.clone(),
        }))
    }
}

struct ResidentMock {
    module: MockModule,
    instance: Option<Box<dyn ViewerPlugin>>,
    queried: bool,
    stats: MockStats,
}

impl LoadedModule for ResidentMock {
    fn capability(&mut self) -> Option<&mut (dyn ViewerPlugin + 'static)> {
        if !self.queried {
            self.queried = true;
            if self.module.has_contract {
                self.instance = Some(Box::new(MockPlugin {
                    module: self.module.clone(),
                    initialized: false,
                    stats: self.stats.clone(),
                }));
            }
        }
        self.instance.as_deref_mut()
    }

    fn unload(self: Box<Self>) -> Result<(), String> {
        self.stats.unloads.fetch_add(1, Ordering::SeqCst);
        match &self.module.unload_error {
            Some(message) => Err(message.clone()),
            None => Ok(()),
        }
    }
}

struct MockPlugin {
    module: MockModule,
    initialized: bool,
    stats: MockStats,
}

impl ViewerPlugin for MockPlugin {
    fn name(&self) -> String {
        self.module.name.clone()
    }

    fn is_init(&self) -> bool {
        self.initialized
    }

    fn do_init(&mut self) {
        self.stats.inits.fetch_add(1, Ordering::SeqCst);
        if self.module.panic_on_init {
            panic!("mock plugin panicked during initialization");
        }
        self.initialized = self.module.init_error.is_none();
    }

    fn error_msg(&self) -> String {
        self.module.init_error.clone().unwrap_or_default()
    }

    fn version(&self) -> String {
        self.module.version.clone()
    }
}
