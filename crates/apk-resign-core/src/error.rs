//! Error types for profile storage

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using ConfigError
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Profile and configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The profile cannot be deleted or renamed
    #[error("Profile '{0}' is protected and cannot be deleted or renamed")]
    ProtectedProfile(String),

    /// A profile with this name already exists
    #[error("Profile '{0}' already exists")]
    ProfileExists(String),

    /// No profile with this name
    #[error("Profile '{0}' not found")]
    ProfileNotFound(String),

    /// Profile names must not be blank
    #[error("Invalid profile name: {0:?}")]
    InvalidName(String),

    /// A credential required for signing is empty
    #[error("Profile '{profile}' has no {field} set")]
    MissingField {
        profile: String,
        field: &'static str,
    },

    /// The per-user config location could not be determined
    #[error("Could not determine home directory for the config file")]
    NoHomeDirectory,

    /// IO error
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
