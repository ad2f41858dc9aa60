//! Plugin management commands

use anyhow::Result;
use clap::{Args, Subcommand};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use std::path::PathBuf;
use viewer_core::{
    NativeLoader, PluginInfo, PluginManager, PluginManagerConfig, SettingsStore, Severity,
    TomlSettingsStore,
};

/// Plugin management arguments
#[derive(Args)]
pub struct PluginArgs {
    /// Additional plugin search directory (repeatable)
    #[arg(long = "dir", global = true, value_name = "DIR")]
    pub dirs: Vec<PathBuf>,

    /// Plugin settings file [default: ~/.config/viewer/plugins.toml]
    #[arg(long, global = true, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    #[command(subcommand)]
    pub command: PluginCommands,
}

/// Plugin subcommands
#[derive(Subcommand)]
pub enum PluginCommands {
    /// List known plugins
    List {
        /// Load and initialize every plugin before listing
        #[arg(long)]
        load: bool,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Declare a plugin and remember it in the settings
    Declare {
        /// Library file name, or an absolute path
        id: String,
    },
    /// Add a plugin search directory and remember it in the settings
    AddDir {
        /// Directory to search
        dir: PathBuf,
    },
    /// Declare every plugin library found in the search directories
    Discover,
    /// Load and initialize a plugin
    Load {
        /// Plugin id
        id: String,
    },
    /// Show plugin details
    Status {
        /// Plugin id
        id: String,
    },
}

/// Run plugin command
pub fn run(args: PluginArgs) -> Result<()> {
    let store = args
        .settings
        .clone()
        .map(TomlSettingsStore::new)
        .unwrap_or_default();
    let mut manager =
        PluginManager::with_config(PluginManagerConfig::default(), Box::new(NativeLoader));

    execute(args, &store, &mut manager)
}

fn execute(args: PluginArgs, store: &dyn SettingsStore, manager: &mut PluginManager) -> Result<()> {
    let mut settings = store.load()?;
    manager.apply_settings(&settings);

    for dir in &args.dirs {
        if !manager.add_directory(dir) {
            tracing::warn!(dir = %dir.display(), "Ignoring plugin directory");
        }
    }

    match args.command {
        PluginCommands::List { load, json } => list_plugins(manager, load, json),
        PluginCommands::Declare { id } => {
            if manager.declare(&id, None) {
                settings.add_plugin(&id);
                store.save(&settings)?;
                let path = manager.get(&id).map(|r| r.path().display().to_string());
                println!("Declared plugin: {} ({})", id, path.unwrap_or_default());
            } else {
                println!("Plugin '{}' already declared", id);
            }
            Ok(())
        }
        PluginCommands::AddDir { dir } => {
            if manager.add_directory(&dir) {
                let canonical = std::fs::canonicalize(&dir)?;
                println!("Added plugin directory: {}", canonical.display());
                settings.add_directory(canonical);
                store.save(&settings)?;
            } else {
                println!(
                    "Ignoring '{}': not a readable directory, or already registered",
                    dir.display()
                );
            }
            Ok(())
        }
        PluginCommands::Discover => {
            let before = manager.catalog().len();
            let count = manager.discover();
            println!("Discovered {} new plugin(s)", count);
            for info in manager.entries().iter().skip(before) {
                println!("  {}    {}", info.id, info.path.display());
            }
            Ok(())
        }
        PluginCommands::Load { id } => {
            ensure_declared(manager, &id);
            let result = manager.load_and_initialize(&id);
            if let Some(info) = manager.info(&id) {
                println!("{} {}    {}", marker(info.severity), info.name, info.status);
            }
            result?;
            Ok(())
        }
        PluginCommands::Status { id } => {
            ensure_declared(manager, &id);
            if let Err(e) = manager.load_and_initialize(&id) {
                tracing::debug!(plugin = %id, error = %e, "Plugin not usable");
            }
            if let Some(info) = manager.info(&id) {
                print_info(&info);
            }
            Ok(())
        }
    }
}

/// Declare `id` unless discovery already found it
fn ensure_declared(manager: &mut PluginManager, id: &str) {
    manager.discover();
    if !manager.catalog().contains(id) {
        manager.declare(id, None);
    }
}

fn list_plugins(manager: &mut PluginManager, load: bool, json: bool) -> Result<()> {
    manager.discover();

    if load {
        let ids: Vec<String> = manager.catalog().ids().map(str::to_string).collect();
        for id in ids {
            if let Err(e) = manager.load_and_initialize(&id) {
                tracing::debug!(plugin = %id, error = %e, "Plugin not usable");
            }
        }
    }

    let plugins = manager.entries();

    if json {
        println!("{}", serde_json::to_string_pretty(&plugins)?);
        return Ok(());
    }

    if plugins.is_empty() {
        println!("No plugins found");
        println!();
        println!("Plugin directories:");
        let mut dirs = manager.directories().peekable();
        if dirs.peek().is_none() {
            println!("  (none) - create {}", viewer_paths::plugin_dir().display());
        }
        for dir in dirs {
            println!("  {}", dir.display());
        }
        println!();
        println!("To add a directory: viewer plugin add-dir <DIR>");
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("").fg(Color::Cyan),
        Cell::new("Name").fg(Color::Cyan),
        Cell::new("File").fg(Color::Cyan),
        Cell::new("Version").fg(Color::Cyan),
        Cell::new("Status").fg(Color::Cyan),
        Cell::new("Path").fg(Color::Cyan),
    ]);

    for p in &plugins {
        table.add_row(vec![
            Cell::new(marker(p.severity)).fg(severity_color(p.severity)),
            Cell::new(&p.name),
            Cell::new(&p.id),
            Cell::new(p.version.as_deref().unwrap_or("")),
            Cell::new(&p.status),
            Cell::new(p.path.display()),
        ]);
    }

    println!("{table}");
    Ok(())
}

fn print_info(info: &PluginInfo) {
    println!("Name:     {}", info.name);
    println!("File:     {}", info.id);
    println!(
        "Version:  {}",
        info.version.as_deref().unwrap_or("Unknown")
    );
    println!("Path:     {}", info.path.display());
    println!("State:    {}", info.state);
    println!("Status:   {} ({})", info.status, info.severity);
}

fn marker(severity: Severity) -> &'static str {
    match severity {
        Severity::Info => "✓",
        Severity::Warning => "!",
        Severity::Critical => "✗",
    }
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Info => Color::Green,
        Severity::Warning => Color::Yellow,
        Severity::Critical => Color::Red,
    }
}
