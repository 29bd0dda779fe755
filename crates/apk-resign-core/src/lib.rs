//! apk-resign core - signing profile storage
//!
//! This crate owns the persisted state of apk-resign: named signing profiles
//! (keystore path, key alias, store password) and the global toolchain root.

pub mod error;
pub mod profiles;

pub use error::{ConfigError, Result};
pub use profiles::{
    default_config_path, ProfileStore, SigningProfile, StoreState, CONFIG_ENV_VAR,
    DEFAULT_PROFILE,
};
