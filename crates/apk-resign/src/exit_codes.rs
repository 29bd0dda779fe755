//! Exit codes for the CLI

use apk_resign_core::ConfigError;
use apk_resign_signing::SigningError;

use crate::cli::CommandFailed;

/// Success
pub const SUCCESS: i32 = 0;

/// General error
pub const ERROR: i32 = 1;

/// Configuration error (profile store, incomplete profile)
pub const CONFIG_ERROR: i32 = 2;

/// Required build tools not found
pub const TOOL_ERROR: i32 = 3;

/// Staging, signing or verification failed
pub const SIGNING_ERROR: i32 = 4;

/// Map a command error to the process exit code
pub fn for_error(err: &anyhow::Error) -> i32 {
    if let Some(failed) = err.downcast_ref::<CommandFailed>() {
        return failed.code;
    }
    if let Some(e) = err.downcast_ref::<SigningError>() {
        return match e {
            SigningError::Config(_) | SigningError::NoPackage => CONFIG_ERROR,
            SigningError::ToolNotFound { .. } => TOOL_ERROR,
            _ => SIGNING_ERROR,
        };
    }
    if err.downcast_ref::<ConfigError>().is_some() {
        return CONFIG_ERROR;
    }
    ERROR
}
