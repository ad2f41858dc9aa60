//! PluginManager against real dynamic libraries
//!
//! These tests build small `cdylib` crates with the toolchain running the
//! tests and load them through [`NativeLoader`](viewer_core::NativeLoader):
//! - `demos/plugins/hello-plugin` exposes the contract and initializes
//! - `tests/fixtures/fixture-module` exports no contract at all
//! - the same fixture with `stale-api` exports the contract for another API version

use std::env::consts::{DLL_PREFIX, DLL_SUFFIX};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Mutex, OnceLock};

use tempfile::TempDir;
use viewer_core::plugins::{LOADED_CORRECTLY, NOT_LOADED, WRONG_INTERFACE};
use viewer_core::{PluginError, PluginManager, PluginState, Severity};

/// Serializes fixture builds; the fixture crates share a source tree
static BUILD_LOCK: Mutex<()> = Mutex::new(());

fn workspace_root() -> &'static Path {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("viewer-core lives inside the workspace")
}

/// Build a `cdylib` crate into its own target directory and return the library path
fn build_cdylib(manifest: &Path, crate_name: &str, features: &[&str], target: &str) -> PathBuf {
    let _guard = BUILD_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let target_dir = Path::new(env!("CARGO_TARGET_TMPDIR")).join(target);

    let cargo = std::env::var_os("CARGO").unwrap_or_else(|| "cargo".into());
    let mut cmd = Command::new(cargo);
    cmd.args(["build", "--quiet", "--offline", "--manifest-path"])
        .arg(manifest)
        .arg("--target-dir")
        .arg(&target_dir);
    if !features.is_empty() {
        cmd.arg("--features").arg(features.join(","));
    }

    let status = cmd.status().expect("failed to run cargo");
    assert!(status.success(), "failed to build {}", manifest.display());

    let library = target_dir
        .join("debug")
        .join(format!("{DLL_PREFIX}{crate_name}{DLL_SUFFIX}"));
    assert!(library.is_file(), "missing {}", library.display());
    library
}

fn hello_plugin() -> &'static Path {
    static LIB: OnceLock<PathBuf> = OnceLock::new();
    LIB.get_or_init(|| {
        build_cdylib(
            &workspace_root().join("demos/plugins/hello-plugin/Cargo.toml"),
            "hello_plugin",
            &[],
            "hello-plugin",
        )
    })
}

fn fixture_manifest() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/fixture-module/Cargo.toml")
}

fn foreign_module() -> &'static Path {
    static LIB: OnceLock<PathBuf> = OnceLock::new();
    LIB.get_or_init(|| build_cdylib(&fixture_manifest(), "fixture_module", &[], "fixture-module"))
}

fn stale_module() -> &'static Path {
    static LIB: OnceLock<PathBuf> = OnceLock::new();
    LIB.get_or_init(|| {
        build_cdylib(
            &fixture_manifest(),
            "fixture_module",
            &["stale-api"],
            "fixture-module-stale",
        )
    })
}

/// Library file name for the host platform
fn lib(stem: &str) -> String {
    format!("{DLL_PREFIX}{stem}{DLL_SUFFIX}")
}

/// Copy a built library into `dir` under `file_name`
fn install(library: &Path, dir: &Path, file_name: &str) -> PathBuf {
    let dest = dir.join(file_name);
    std::fs::copy(library, &dest).unwrap();
    dest
}

#[test]
fn conforming_library_initializes_unloads_and_reloads() {
    let dir = TempDir::new().unwrap();
    let id = lib("hello_plugin");
    install(hello_plugin(), dir.path(), &id);

    let mut manager = PluginManager::native();
    manager.add_directory(dir.path());
    assert_eq!(manager.discover(), 1);

    manager.load_and_initialize(&id).unwrap();
    let info = manager.info(&id).unwrap();
    assert_eq!(info.state, PluginState::Initialized);
    assert_eq!(info.status, LOADED_CORRECTLY);
    assert_eq!(info.name, "Hello");
    assert_eq!(info.version.as_deref(), Some("0.1.0"));
    assert_eq!(info.severity, Severity::Info);

    manager.unload(&id).unwrap();
    let record = manager.get(&id).unwrap();
    assert_eq!(record.state(), PluginState::Unloaded);
    assert!(record.last_error().is_none());
    assert_eq!(record.unload_failures(), 0);

    manager.load_and_initialize(&id).unwrap();
    assert_eq!(manager.state(&id), Some(PluginState::Initialized));

    let report = manager.unload_all();
    assert_eq!(report.attempted, 1);
    assert!(report.failed.is_empty());
}

#[test]
fn library_without_contract_is_wrong_interface() {
    let dir = TempDir::new().unwrap();
    let id = lib("foreign");
    let path = install(foreign_module(), dir.path(), &id);

    let mut manager = PluginManager::native();
    manager.declare(&id, Some(&path));
    manager.load(&id).unwrap();

    let err = manager.initialize(&id).unwrap_err();
    assert!(matches!(err, PluginError::WrongInterface { .. }));

    let info = manager.info(&id).unwrap();
    assert_eq!(info.state, PluginState::InitFailed);
    assert_eq!(info.status, WRONG_INTERFACE);
    assert_eq!(info.severity, Severity::Warning);
    assert!(info.state.is_resident());

    manager.unload(&id).unwrap();
    assert_eq!(manager.state(&id), Some(PluginState::Unloaded));
}

#[test]
fn api_version_mismatch_is_wrong_interface() {
    let dir = TempDir::new().unwrap();
    let id = lib("stale");
    let path = install(stale_module(), dir.path(), &id);

    let mut manager = PluginManager::native();
    manager.declare(&id, Some(&path));

    let err = manager.load_and_initialize(&id).unwrap_err();
    assert!(matches!(err, PluginError::WrongInterface { .. }));
    assert_eq!(manager.state(&id), Some(PluginState::InitFailed));
    assert_eq!(manager.status(&id).unwrap(), WRONG_INTERFACE);
    // No instance was created, so the reported name stays the id
    assert_eq!(manager.info(&id).unwrap().name, id);

    manager.unload(&id).unwrap();
}

#[test]
fn load_failure_is_retried_once_the_library_appears() {
    let dir = TempDir::new().unwrap();
    let id = lib("late");
    let path = dir.path().join(&id);

    let mut manager = PluginManager::native();
    manager.declare(&id, Some(&path));

    let err = manager.load(&id).unwrap_err();
    assert!(matches!(err, PluginError::LoadFailure { .. }));
    assert_eq!(manager.state(&id), Some(PluginState::LoadFailed));
    assert_eq!(manager.severity(&id), Some(Severity::Critical));
    let status = manager.status(&id).unwrap();
    assert!(!status.is_empty());
    assert_ne!(status, NOT_LOADED);

    install(hello_plugin(), dir.path(), &id);
    manager.load_and_initialize(&id).unwrap();
    assert_eq!(manager.state(&id), Some(PluginState::Initialized));
}
