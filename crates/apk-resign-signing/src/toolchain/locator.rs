//! Locating apksigner and zipalign

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, info};

use super::version::BuildToolsVersion;
use super::{tool_file_name, ToolchainResolution, ALIGNER, DEVICE_BRIDGE, SIGNER};

/// Process environment consulted during discovery
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocatorEnv {
    /// `ANDROID_HOME`
    pub android_home: Option<String>,
    /// `ANDROID_SDK_ROOT`
    pub android_sdk_root: Option<String>,
    /// `PATH`
    pub search_path: Option<OsString>,
}

impl LocatorEnv {
    /// Capture the current process environment
    pub fn from_process() -> Self {
        Self {
            android_home: std::env::var("ANDROID_HOME").ok(),
            android_sdk_root: std::env::var("ANDROID_SDK_ROOT").ok(),
            search_path: std::env::var_os("PATH"),
        }
    }

    /// First non-empty of `ANDROID_HOME`, `ANDROID_SDK_ROOT`
    pub fn sdk_root(&self) -> Option<&str> {
        [&self.android_home, &self.android_sdk_root]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|s| !s.is_empty())
    }
}

/// Finds the signer and aligner executables.
///
/// Strategies run in order, each only while something is still missing:
/// the user-specified SDK root, the SDK root from the environment, then the
/// executable search path.
#[derive(Debug, Clone)]
pub struct ToolchainLocator {
    user_root: Option<PathBuf>,
    env: LocatorEnv,
}

impl ToolchainLocator {
    /// Locator for an optional user root (empty means none), reading the
    /// process environment
    pub fn new(user_root: &str) -> Self {
        let user_root = if user_root.trim().is_empty() {
            None
        } else {
            Some(PathBuf::from(user_root))
        };

        Self {
            user_root,
            env: LocatorEnv::from_process(),
        }
    }

    /// Replace the environment snapshot
    pub fn with_env(mut self, env: LocatorEnv) -> Self {
        self.env = env;
        self
    }

    /// Run discovery
    pub fn locate(&self) -> ToolchainResolution {
        let mut res = ToolchainResolution::default();

        if let Some(root) = &self.user_root {
            res.note(format!("User SDK root: {}", root.display()));
            scan_sdk_root(root, "user SDK root", &mut res);
        }

        if !res.is_complete() {
            res.note(format!(
                "ANDROID_HOME: {}",
                self.env.android_home.as_deref().unwrap_or("<unset>")
            ));
            res.note(format!(
                "ANDROID_SDK_ROOT: {}",
                self.env.android_sdk_root.as_deref().unwrap_or("<unset>")
            ));

            let env_root = self
                .env
                .sdk_root()
                .map(PathBuf::from)
                .or_else(|| self.user_root.clone());
            match env_root {
                Some(root) => scan_sdk_root(&root, "environment SDK root", &mut res),
                None => res.note("No SDK root in the environment"),
            }
        }

        if res.signer.is_none() {
            res.signer = self.probe_search_path(SIGNER, "--version", &mut res);
        }
        if res.aligner.is_none() {
            res.aligner = self.probe_search_path(ALIGNER, "-h", &mut res);
        }

        // Only tells whether the SDK looks complete
        self.probe_search_path(DEVICE_BRIDGE, "--version", &mut res);

        if res.signer.is_none() {
            res.missing.insert(SIGNER.to_string());
        }
        if res.aligner.is_none() {
            res.note(format!("{ALIGNER} not found; alignment is unavailable but not required"));
        }

        info!(
            signer = ?res.signer,
            aligner = ?res.aligner,
            resolved = res.is_resolved(),
            "toolchain discovery finished"
        );
        res
    }

    /// Look `tool` up on the search path and run it with `flag`; exit status
    /// zero counts as found
    fn probe_search_path(
        &self,
        tool: &str,
        flag: &str,
        res: &mut ToolchainResolution,
    ) -> Option<PathBuf> {
        let cwd = std::env::current_dir().unwrap_or_default();
        let found = match which::which_in(tool, self.env.search_path.as_ref(), cwd) {
            Ok(path) => path,
            Err(_) => {
                res.note(format!("{tool} on PATH: not found"));
                return None;
            }
        };

        debug!(tool, path = %found.display(), flag, "probing tool on PATH");
        match Command::new(&found)
            .arg(flag)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
        {
            Ok(status) if status.success() => {
                res.note(format!("{tool} on PATH: found at {}", found.display()));
                Some(found)
            }
            Ok(status) => {
                res.note(format!(
                    "{tool} on PATH: {} exited with {status}",
                    found.display()
                ));
                None
            }
            Err(e) => {
                res.note(format!("{tool} on PATH: failed to run {}: {e}", found.display()));
                None
            }
        }
    }
}

/// Look in `<root>/build-tools/<latest>/` and fill whichever tools are still
/// missing
fn scan_sdk_root(root: &Path, label: &str, res: &mut ToolchainResolution) {
    let build_tools = root.join("build-tools");
    debug!(path = %build_tools.display(), label, "scanning build-tools");

    if !build_tools.is_dir() {
        res.note(format!(
            "No build-tools directory in {label}: {}",
            build_tools.display()
        ));
        return;
    }

    let entries = match std::fs::read_dir(&build_tools) {
        Ok(entries) => entries,
        Err(e) => {
            res.note(format!("Cannot read {}: {e}", build_tools.display()));
            return;
        }
    };

    let names: Vec<String> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_dir())
        .filter_map(|e| e.file_name().into_string().ok())
        .collect();

    let Some(latest) = BuildToolsVersion::latest(&names) else {
        res.note(format!("No build-tools versions in {}", build_tools.display()));
        return;
    };

    let version_dir = build_tools.join(latest.as_str());
    res.note(format!("Latest build-tools in {label}: {latest}"));

    let signer = version_dir.join(tool_file_name(SIGNER));
    let aligner = version_dir.join(tool_file_name(ALIGNER));
    let signer_exists = signer.is_file();
    let aligner_exists = aligner.is_file();
    res.note(format!("{SIGNER}: {} (exists: {signer_exists})", signer.display()));
    res.note(format!("{ALIGNER}: {} (exists: {aligner_exists})", aligner.display()));

    if res.signer.is_none() && signer_exists {
        res.signer = Some(signer);
    }
    if res.aligner.is_none() && aligner_exists {
        res.aligner = Some(aligner);
    }
}
