//! apk-resign signing - build-tools discovery and apksigner invocation
//!
//! Two pieces live here:
//! - [`toolchain`]: locates `apksigner` (required) and `zipalign` (optional)
//!   under an Android SDK root, the `ANDROID_HOME` / `ANDROID_SDK_ROOT`
//!   environment variables, or the executable search path.
//! - [`invoker`]: stages a package, runs the signer on a background task and
//!   streams [`ProgressEvent`]s back to the caller.

pub mod error;
pub mod invoker;
pub mod progress;
pub mod toolchain;

pub use error::{Result, SigningError};
pub use invoker::{
    resigned_output_path, OverwritePolicy, ResignJob, ResignOptions, SigningInvoker,
};
pub use progress::{ProgressEvent, ResignHandle};
pub use toolchain::{
    BuildToolsVersion, LocatorEnv, ResolvedTools, ToolchainLocator, ToolchainResolution,
};
