//! Directory registry - canonical, deduplicated plugin search locations

use std::path::{Path, PathBuf};

/// A registered plugin search directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginDirectory {
    /// Canonical absolute path
    pub path: PathBuf,
    /// Readability verified when the directory was added
    ///
    /// Unreadable paths are never registered, so this is always `true` for a
    /// stored entry. It is not re-checked afterwards; a directory removed or
    /// locked later still reports `true` and simply yields nothing on
    /// discovery.
    pub readable: bool,
}

/// Ordered set of plugin search directories
///
/// Entries are canonicalized when added and never re-validated afterwards.
#[derive(Debug, Default, Clone)]
pub struct DirectoryRegistry {
    dirs: Vec<PluginDirectory>,
}

impl DirectoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a search directory
    ///
    /// Returns `true` if the registry grew. Paths that do not exist, are not
    /// directories, cannot be read, or are already registered are ignored.
    pub fn add(&mut self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();

        let canonical = match std::fs::canonicalize(path) {
            Ok(canonical) => canonical,
            Err(e) => {
                tracing::debug!(dir = %path.display(), error = %e, "Ignoring plugin directory");
                return false;
            }
        };

        if !canonical.is_dir() || std::fs::read_dir(&canonical).is_err() {
            tracing::debug!(dir = %canonical.display(), "Plugin directory is not a readable directory");
            return false;
        }

        if self.contains(&canonical) {
            tracing::debug!(dir = %canonical.display(), "Plugin directory already registered");
            return false;
        }

        tracing::debug!(dir = %canonical.display(), "Registered plugin directory");
        self.dirs.push(PluginDirectory {
            path: canonical,
            readable: true,
        });
        true
    }

    /// Whether this canonical path is registered
    pub fn contains(&self, canonical: &Path) -> bool {
        self.dirs.iter().any(|d| d.path == canonical)
    }

    /// Iterate over registered directories in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Path> + Clone {
        self.dirs.iter().map(|d| d.path.as_path())
    }

    /// Registered entries with their metadata
    pub fn entries(&self) -> &[PluginDirectory] {
        &self.dirs
    }

    /// First registered directory containing a file named `file_name`
    pub fn find(&self, file_name: &str) -> Option<PathBuf> {
        self.iter()
            .map(|dir| dir.join(file_name))
            .find(|candidate| candidate.exists())
    }

    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }
}
