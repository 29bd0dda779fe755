//! Signing profile store

mod paths;
mod store;
mod types;

pub use paths::*;
pub use store::*;
pub use types::*;
