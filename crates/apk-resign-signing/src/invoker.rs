//! Re-signing a package with apksigner

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tempfile::TempDir;
use tokio::process::Command;
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{debug, info, warn};

use apk_resign_core::SigningProfile;

use crate::error::{Result, SigningError};
use crate::progress::{ProgressEvent, ResignHandle};
use crate::toolchain::{ResolvedTools, ToolchainLocator, ALIGNER, SIGNER};

/// What to do when the output file already exists
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OverwritePolicy {
    /// Replace it silently
    #[default]
    Overwrite,
    /// Fail before running the signer
    FailIfExists,
}

/// Knobs for a signing run
#[derive(Debug, Clone, Default)]
pub struct ResignOptions {
    /// Behaviour for an existing `<name>_resigned.apk`
    pub overwrite: OverwritePolicy,
    /// Run zipalign on the staged copy before signing, when available
    pub align: bool,
    /// Parent for the scratch directory (system temp dir when unset)
    pub scratch_root: Option<PathBuf>,
    /// Upper bound for each tool run; none by default
    pub timeout: Option<Duration>,
}

/// A package plus everything needed to sign it
#[derive(Debug, Clone)]
pub struct ResignJob {
    /// The APK to re-sign
    pub package: PathBuf,
    /// Credentials to sign with
    pub profile: SigningProfile,
    /// Resolved tool paths
    pub tools: ResolvedTools,
}

impl ResignJob {
    /// Run the synchronous checks that must pass before any work starts:
    /// a package is given, the profile is complete and the signer can be
    /// found.
    pub fn prepare(
        package: impl Into<PathBuf>,
        profile_name: &str,
        profile: &SigningProfile,
        locator: &ToolchainLocator,
    ) -> Result<Self> {
        let package = package.into();
        if package.as_os_str().is_empty() {
            return Err(SigningError::NoPackage);
        }

        profile.validate(profile_name)?;
        let tools = locator.locate().require_signer()?;

        Ok(Self {
            package,
            profile: profile.clone(),
            tools,
        })
    }

    /// Where the signed package is written
    pub fn output_path(&self) -> PathBuf {
        resigned_output_path(&self.package)
    }
}

/// `<dir>/<stem>_resigned.apk` next to the source package
pub fn resigned_output_path(package: &Path) -> PathBuf {
    // Built on OsString so non-UTF-8 names survive unchanged
    let mut name = package.file_stem().unwrap_or_default().to_os_string();
    name.push("_resigned.apk");
    package.parent().unwrap_or_else(|| Path::new("")).join(name)
}

/// Runs re-sign jobs
#[derive(Debug, Clone, Default)]
pub struct SigningInvoker {
    options: ResignOptions,
}

impl SigningInvoker {
    /// Create an invoker with the given options
    pub fn new(options: ResignOptions) -> Self {
        Self { options }
    }

    /// Start `job` on a background task. Must be called inside a tokio
    /// runtime.
    pub fn spawn(&self, job: ResignJob) -> ResignHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let options = self.options.clone();
        tokio::spawn(async move {
            run_job(&job, &options, &tx).await;
        });
        ResignHandle::new(rx)
    }

    /// Run `job` to completion on the current task, sending events to
    /// `events`
    pub async fn run(&self, job: &ResignJob, events: &UnboundedSender<ProgressEvent>) {
        run_job(job, &self.options, events).await;
    }
}

fn emit(events: &UnboundedSender<ProgressEvent>, event: ProgressEvent) {
    // The consumer may have gone away; the job still runs to the end
    let _ = events.send(event);
}

async fn run_job(job: &ResignJob, options: &ResignOptions, events: &UnboundedSender<ProgressEvent>) {
    info!(package = %job.package.display(), "re-signing package");
    emit(events, ProgressEvent::progress(10, "Preparing to re-sign..."));

    match execute(job, options, events).await {
        Ok(output_path) => {
            emit(events, ProgressEvent::progress(90, "Finishing..."));
            info!(output = %output_path.display(), "package re-signed");
            emit(events, ProgressEvent::Complete { output_path });
        }
        Err(e) => {
            warn!(package = %job.package.display(), error = %e, "re-signing failed");
            emit(
                events,
                ProgressEvent::Error {
                    message: e.to_string(),
                },
            );
        }
    }
}

/// Staging, signing and verification. The scratch directory lives in this
/// scope and is removed on every return path.
async fn execute(
    job: &ResignJob,
    options: &ResignOptions,
    events: &UnboundedSender<ProgressEvent>,
) -> Result<PathBuf> {
    let scratch = create_scratch(options.scratch_root.as_deref())?;
    let staged = scratch.path().join("unsigned.apk");
    debug!(scratch = %scratch.path().display(), "staging package");

    tokio::fs::copy(&job.package, &staged)
        .await
        .map_err(|source| SigningError::Staging {
            path: job.package.clone(),
            source,
        })?;
    emit(events, ProgressEvent::progress(20, "Staging package..."));

    emit(events, ProgressEvent::progress(30, "Signing..."));
    let output = job.output_path();
    if options.overwrite == OverwritePolicy::FailIfExists && output.exists() {
        return Err(SigningError::OutputExists(output));
    }

    let input = if options.align {
        align(job, &staged, scratch.path(), options.timeout).await?
    } else {
        staged
    };

    run_tool(SIGNER, &job.tools.signer, &signer_args(&job.profile, &output, &input), options.timeout).await?;

    if !tokio::fs::try_exists(&output).await.unwrap_or(false) {
        return Err(SigningError::OutputNotFound(output));
    }

    Ok(output)
}

fn create_scratch(root: Option<&Path>) -> Result<TempDir> {
    let mut builder = tempfile::Builder::new();
    builder.prefix("apk-resign-");
    let dir = match root {
        Some(root) => builder.tempdir_in(root),
        None => builder.tempdir(),
    };
    dir.map_err(SigningError::Io)
}

/// Align the staged copy into the scratch directory, returning the file to
/// sign
async fn align(
    job: &ResignJob,
    staged: &Path,
    scratch: &Path,
    timeout: Option<Duration>,
) -> Result<PathBuf> {
    let Some(aligner) = &job.tools.aligner else {
        warn!("alignment requested but {ALIGNER} was not found, signing unaligned copy");
        return Ok(staged.to_path_buf());
    };

    let aligned = scratch.join("aligned.apk");
    let args: Vec<OsString> = vec![
        "-f".into(),
        "4".into(),
        staged.into(),
        aligned.clone().into(),
    ];
    run_tool(ALIGNER, aligner, &args, timeout).await?;
    Ok(aligned)
}

/// `sign --ks <ks> --ks-key-alias <alias> --ks-pass pass:<pw> --out <out> <in>`
fn signer_args(profile: &SigningProfile, output: &Path, input: &Path) -> Vec<OsString> {
    vec![
        "sign".into(),
        "--ks".into(),
        profile.keystore_path.clone().into(),
        "--ks-key-alias".into(),
        profile.key_alias.clone().into(),
        "--ks-pass".into(),
        format!("pass:{}", profile.store_password).into(),
        "--out".into(),
        output.into(),
        input.into(),
    ]
}

/// Arguments safe to log
fn redacted(args: &[OsString]) -> Vec<String> {
    args.iter()
        .map(|a| {
            let a = a.to_string_lossy();
            if a.starts_with("pass:") {
                "pass:***".to_string()
            } else {
                a.into_owned()
            }
        })
        .collect()
}

async fn run_tool(
    tool: &str,
    program: &Path,
    args: &[OsString],
    timeout: Option<Duration>,
) -> Result<()> {
    debug!(tool, program = %program.display(), args = ?redacted(args), "running tool");

    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let output = match timeout {
        Some(limit) => tokio::time::timeout(limit, command.output())
            .await
            .map_err(|_| SigningError::Timeout {
                tool: tool.to_string(),
                limit,
            })?,
        None => command.output().await,
    }
    .map_err(|source| SigningError::Spawn {
        tool: tool.to_string(),
        source,
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let text = if stderr.trim().is_empty() {
            String::from_utf8_lossy(&output.stdout).into_owned()
        } else {
            stderr.into_owned()
        };
        return Err(SigningError::ToolFailed {
            tool: tool.to_string(),
            status: output.status.code().unwrap_or(-1),
            output: text.trim_end().to_string(),
        });
    }

    Ok(())
}
