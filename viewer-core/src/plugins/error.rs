//! Plugin manager error types

use thiserror::Error;

/// Errors that can occur while managing plugins
///
/// Declaring an id that is already in the catalog is not an error; `declare`
/// reports it by returning `false`.
#[derive(Error, Debug)]
pub enum PluginError {
    /// No record with this id has been declared
    #[error("Plugin '{id}' not declared")]
    NotDeclared { id: String },

    /// The operation needs a resident module
    #[error("Plugin '{id}' not loaded")]
    NotLoaded { id: String },

    /// The dynamic library could not be loaded
    #[error("Failed to load plugin '{id}': {message}")]
    LoadFailure { id: String, message: String },

    /// The module does not expose the capability contract
    #[error("Plugin '{id}': Wrong interface")]
    WrongInterface { id: String },

    /// The module reported an initialization failure
    #[error("Plugin '{id}' initialization failed: {message}")]
    InitFailure { id: String, message: String },

    /// The native unload reported an error
    #[error("Failed to unload plugin '{id}': {message}")]
    UnloadFailure { id: String, message: String },

    /// Settings error (parsing, saving, etc.)
    #[error("Settings error: {0}")]
    Settings(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PluginError {
    /// Message to retain on the plugin record, without the id prefix
    pub fn record_message(&self) -> String {
        match self {
            Self::LoadFailure { message, .. }
            | Self::InitFailure { message, .. }
            | Self::UnloadFailure { message, .. } => message.clone(),
            Self::WrongInterface { .. } => super::status::WRONG_INTERFACE.to_string(),
            other => other.to_string(),
        }
    }
}
