//! Android build-tools discovery

mod locator;
mod version;

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::Serialize;

use crate::error::{Result, SigningError};

pub use locator::{LocatorEnv, ToolchainLocator};
pub use version::{BuildToolsVersion, VersionPart};

/// The signing tool, required
pub const SIGNER: &str = "apksigner";

/// The alignment tool, optional
pub const ALIGNER: &str = "zipalign";

/// The device bridge, probed for diagnostics only
pub const DEVICE_BRIDGE: &str = "adb";

/// File name of a build-tools executable on this platform
pub fn tool_file_name(tool: &str) -> String {
    if cfg!(windows) {
        match tool {
            SIGNER => format!("{tool}.bat"),
            _ => format!("{tool}.exe"),
        }
    } else {
        tool.to_string()
    }
}

/// Outcome of a discovery run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ToolchainResolution {
    /// Invocation path of `apksigner`
    pub signer: Option<PathBuf>,
    /// Invocation path of `zipalign`
    pub aligner: Option<PathBuf>,
    /// Everything probed along the way, in order
    pub diagnostics: Vec<String>,
    /// Required tools that could not be found
    pub missing: BTreeSet<String>,
}

impl ToolchainResolution {
    pub(crate) fn note(&mut self, line: impl Into<String>) {
        self.diagnostics.push(line.into());
    }

    /// Both tools found
    pub fn is_complete(&self) -> bool {
        self.signer.is_some() && self.aligner.is_some()
    }

    /// The signer was found; the aligner is optional
    pub fn is_resolved(&self) -> bool {
        self.signer.is_some()
    }

    /// Diagnostics joined into one line
    pub fn diagnostics_text(&self) -> String {
        self.diagnostics.join("; ")
    }

    /// Turn the resolution into usable tool paths, or a `ToolNotFound` error
    /// carrying the missing names and the full diagnostic trace
    pub fn require_signer(self) -> Result<ResolvedTools> {
        let diagnostics = self.diagnostics_text();
        match self.signer {
            Some(signer) => Ok(ResolvedTools {
                signer,
                aligner: self.aligner,
            }),
            None => {
                let mut missing: Vec<String> = self.missing.into_iter().collect();
                if missing.is_empty() {
                    missing.push(SIGNER.to_string());
                }
                Err(SigningError::ToolNotFound {
                    missing,
                    diagnostics,
                })
            }
        }
    }
}

/// Tool paths ready for invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTools {
    /// `apksigner`
    pub signer: PathBuf,
    /// `zipalign`, if found
    pub aligner: Option<PathBuf>,
}

impl ResolvedTools {
    /// Tools with only a signer
    pub fn signer_only(signer: impl Into<PathBuf>) -> Self {
        Self {
            signer: signer.into(),
            aligner: None,
        }
    }
}
