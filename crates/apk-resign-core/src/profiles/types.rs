//! Profile store data types

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Name of the profile that always exists
pub const DEFAULT_PROFILE: &str = "default";

/// Signing credentials stored under a profile name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningProfile {
    /// Path to the keystore file (.jks / .keystore)
    #[serde(default)]
    pub keystore_path: String,

    /// Alias of the key inside the keystore
    #[serde(default)]
    pub key_alias: String,

    /// Keystore password
    #[serde(default, rename = "storepass")]
    pub store_password: String,
}

impl SigningProfile {
    /// Create a profile from its three credentials
    pub fn new(
        keystore_path: impl Into<String>,
        key_alias: impl Into<String>,
        store_password: impl Into<String>,
    ) -> Self {
        Self {
            keystore_path: keystore_path.into(),
            key_alias: key_alias.into(),
            store_password: store_password.into(),
        }
    }

    /// True when no credential has been filled in
    pub fn is_empty(&self) -> bool {
        self.keystore_path.is_empty() && self.key_alias.is_empty() && self.store_password.is_empty()
    }

    /// Check that every credential needed for signing is present.
    ///
    /// Fields are checked in the order keystore path, password, alias and the
    /// first empty one is reported. All three use the same rule: only an
    /// empty string counts as missing, values are not trimmed.
    pub fn validate(&self, name: &str) -> Result<()> {
        let missing = if self.keystore_path.is_empty() {
            Some("keystore path")
        } else if self.store_password.is_empty() {
            Some("password")
        } else if self.key_alias.is_empty() {
            Some("key alias")
        } else {
            None
        };

        match missing {
            Some(field) => Err(ConfigError::MissingField {
                profile: name.to_string(),
                field,
            }),
            None => Ok(()),
        }
    }
}

/// Everything persisted in the store file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreState {
    /// Profiles by name
    #[serde(default)]
    pub profiles: BTreeMap<String, SigningProfile>,

    /// Toolchain root (Android SDK directory); empty means environment/PATH only
    #[serde(default)]
    pub sdk_path: String,
}

impl Default for StoreState {
    fn default() -> Self {
        let mut profiles = BTreeMap::new();
        profiles.insert(DEFAULT_PROFILE.to_string(), SigningProfile::default());
        Self {
            profiles,
            sdk_path: String::new(),
        }
    }
}

impl StoreState {
    /// Re-insert the default profile if a loaded file dropped it
    pub(crate) fn ensure_default(&mut self) {
        self.profiles
            .entry(DEFAULT_PROFILE.to_string())
            .or_default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_field_names() {
        let profile = SigningProfile::new("k.jks", "a", "p");
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["keystore_path"], "k.jks");
        assert_eq!(json["key_alias"], "a");
        assert_eq!(json["storepass"], "p");
    }

    #[test]
    fn test_empty_object_is_empty_profile() {
        let profile: SigningProfile = serde_json::from_str("{}").unwrap();
        assert!(profile.is_empty());
    }

    #[test]
    fn test_validate_order() {
        let err = SigningProfile::default().validate("release").unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { field: "keystore path", .. }));

        let err = SigningProfile::new("k.jks", "", "").validate("release").unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { field: "password", .. }));

        let err = SigningProfile::new("k.jks", "", "p").validate("release").unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { field: "key alias", .. }));

        assert!(SigningProfile::new("k.jks", "a", "p").validate("release").is_ok());
    }

    #[test]
    fn test_validate_does_not_trim() {
        // Whitespace is a value like any other, for every field
        assert!(SigningProfile::new(" ", " ", " ").validate("release").is_ok());

        let err = SigningProfile::new(" ", " ", "").validate("release").unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { field: "password", .. }));
    }

    #[test]
    fn test_missing_field_message_names_profile() {
        let err = SigningProfile::default().validate("release").unwrap_err();
        assert_eq!(err.to_string(), "Profile 'release' has no keystore path set");
    }

    #[test]
    fn test_default_state() {
        let state = StoreState::default();
        assert_eq!(state.profiles.len(), 1);
        assert!(state.profiles[DEFAULT_PROFILE].is_empty());
        assert!(state.sdk_path.is_empty());
    }
}
