//! Error types for signing operations

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use apk_resign_core::ConfigError;

/// Result type alias for signing operations
pub type Result<T> = std::result::Result<T, SigningError>;

/// Signing-related errors
#[derive(Debug, Error)]
pub enum SigningError {
    /// The selected profile is incomplete
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// No package was given
    #[error("No APK selected")]
    NoPackage,

    /// Required tools could not be found by any strategy
    #[error("Missing required tools: {}. Install the Android SDK build-tools or add them to PATH. Diagnostics: {diagnostics}", missing.join(", "))]
    ToolNotFound {
        missing: Vec<String>,
        diagnostics: String,
    },

    /// The package could not be copied to the scratch directory
    #[error("Failed to stage {}: {source}", path.display())]
    Staging {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A tool could not be started
    #[error("Failed to run {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// A tool exited unsuccessfully
    #[error("{tool} failed with exit code {status}: {output}")]
    ToolFailed {
        tool: String,
        status: i32,
        output: String,
    },

    /// A tool did not finish in time
    #[error("{tool} did not finish within {limit:?}")]
    Timeout { tool: String, limit: Duration },

    /// The signer reported success but produced no file
    #[error("Signed APK not found at {}; the signer reported success but produced no output", .0.display())]
    OutputNotFound(PathBuf),

    /// The output exists and overwriting is disabled
    #[error("Output {} already exists", .0.display())]
    OutputExists(PathBuf),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
