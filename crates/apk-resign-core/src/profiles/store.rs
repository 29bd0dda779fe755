//! Loading and saving the profile store

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{ConfigError, Result};

use super::paths::default_config_path;
use super::types::{SigningProfile, StoreState, DEFAULT_PROFILE};

/// Named signing profiles plus the toolchain root, backed by a JSON file.
///
/// All mutations happen in memory. Nothing reaches disk until [`save`] is
/// called.
///
/// [`save`]: ProfileStore::save
#[derive(Debug, Clone)]
pub struct ProfileStore {
    path: PathBuf,
    state: StoreState,
}

impl ProfileStore {
    /// Load the store from `path`.
    ///
    /// A missing, unreadable or malformed file yields the default state
    /// (a single empty `default` profile and no toolchain root).
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let state = match read_state(&path) {
            Ok(Some(mut state)) => {
                state.ensure_default();
                info!(path = %path.display(), profiles = state.profiles.len(), "loaded profile store");
                state
            }
            Ok(None) => {
                debug!(path = %path.display(), "no profile store yet, using defaults");
                StoreState::default()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable profile store, using defaults");
                StoreState::default()
            }
        };

        Self { path, state }
    }

    /// Load the store from the per-user location
    pub fn open_default() -> Result<Self> {
        Ok(Self::load(default_config_path()?))
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current in-memory state
    pub fn state(&self) -> &StoreState {
        &self.state
    }

    /// Persist the store, overwriting the stored toolchain root.
    ///
    /// Write failures are logged and otherwise ignored: the in-memory state
    /// stays correct for the rest of the session.
    pub fn save(&mut self, toolchain_root: &str) {
        if let Err(e) = self.try_save(toolchain_root) {
            warn!(path = %self.path.display(), error = %e, "failed to save profile store");
        }
    }

    /// Persist the store, returning any write error
    pub fn try_save(&mut self, toolchain_root: &str) -> Result<()> {
        self.state.sdk_path = toolchain_root.to_string();

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let json = serde_json::to_string_pretty(&self.state)?;
        std::fs::write(&self.path, json).map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })?;

        debug!(path = %self.path.display(), "profile store saved");
        Ok(())
    }

    /// Stored toolchain root, empty if unset
    pub fn toolchain_root(&self) -> &str {
        &self.state.sdk_path
    }

    /// Change the toolchain root in memory
    pub fn set_toolchain_root(&mut self, root: impl Into<String>) {
        self.state.sdk_path = root.into();
    }

    /// All profiles by name
    pub fn get_all_profiles(&self) -> &BTreeMap<String, SigningProfile> {
        &self.state.profiles
    }

    /// Whether a profile with this name exists
    pub fn contains(&self, name: &str) -> bool {
        self.state.profiles.contains_key(name)
    }

    /// Profile by name, or an empty profile if there is none
    pub fn get_profile(&self, name: &str) -> SigningProfile {
        self.state.profiles.get(name).cloned().unwrap_or_default()
    }

    /// Insert or replace a profile
    pub fn add_profile(&mut self, name: impl Into<String>, profile: SigningProfile) {
        let name = name.into();
        debug!(profile = %name, "storing profile");
        self.state.profiles.insert(name, profile);
    }

    /// Insert or replace a profile (same as [`add_profile`](Self::add_profile))
    pub fn update_profile(&mut self, name: impl Into<String>, profile: SigningProfile) {
        self.add_profile(name, profile);
    }

    /// Create a new profile with empty credentials
    pub fn create_profile(&mut self, name: &str) -> Result<()> {
        let name = checked_name(name)?;
        if self.contains(name) {
            return Err(ConfigError::ProfileExists(name.to_string()));
        }
        self.add_profile(name, SigningProfile::default());
        Ok(())
    }

    /// Remove a profile. Absent names are ignored; `default` is refused.
    pub fn delete_profile(&mut self, name: &str) -> Result<()> {
        if name == DEFAULT_PROFILE {
            return Err(ConfigError::ProtectedProfile(name.to_string()));
        }
        if self.state.profiles.remove(name).is_some() {
            debug!(profile = %name, "deleted profile");
        }
        Ok(())
    }

    /// Move a profile to a new name, keeping its credentials
    pub fn rename_profile(&mut self, old: &str, new: &str) -> Result<()> {
        if old == DEFAULT_PROFILE {
            return Err(ConfigError::ProtectedProfile(old.to_string()));
        }
        let new = checked_name(new)?;
        if self.contains(new) {
            return Err(ConfigError::ProfileExists(new.to_string()));
        }

        let profile = self
            .state
            .profiles
            .remove(old)
            .ok_or_else(|| ConfigError::ProfileNotFound(old.to_string()))?;
        self.state.profiles.insert(new.to_string(), profile);
        debug!(from = %old, to = %new, "renamed profile");
        Ok(())
    }
}

fn checked_name(name: &str) -> Result<&str> {
    if name.trim().is_empty() {
        return Err(ConfigError::InvalidName(name.to_string()));
    }
    Ok(name)
}

/// `Ok(None)` when the file does not exist
fn read_state(path: &Path) -> Result<Option<StoreState>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    Ok(Some(serde_json::from_str(&content)?))
}
