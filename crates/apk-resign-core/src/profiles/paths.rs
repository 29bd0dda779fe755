//! Default locations for the profile store

use std::path::PathBuf;

use crate::error::{ConfigError, Result};

/// File name of the per-user store, kept from earlier releases so existing
/// profiles are picked up
pub const CONFIG_FILE_NAME: &str = ".apk_resign_gui_config.json";

/// Environment variable overriding the store location
pub const CONFIG_ENV_VAR: &str = "APK_RESIGN_CONFIG";

/// Per-user store location: `~/.apk_resign_gui_config.json`
pub fn default_config_path() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(CONFIG_FILE_NAME))
        .ok_or(ConfigError::NoHomeDirectory)
}
