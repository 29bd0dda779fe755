//! Resign command

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use apk_resign_core::{ConfigError, DEFAULT_PROFILE};
use apk_resign_signing::{
    OverwritePolicy, ProgressEvent, ResignHandle, ResignJob, ResignOptions, SigningInvoker,
    ToolchainLocator,
};

use crate::cli::{output, AppState, CommandFailed, OutputFormat};
use crate::exit_codes;

/// How often the foreground loop drains progress events
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Re-sign an APK with a stored profile
#[derive(Debug, Args)]
pub struct ResignCommand {
    /// APK to re-sign; the result is written next to it as <name>_resigned.apk
    #[arg(required = true)]
    pub apk: PathBuf,

    /// Signing profile to use
    #[arg(short, long, default_value = DEFAULT_PROFILE)]
    pub profile: String,

    /// Android SDK root to search for build-tools (saved for later runs)
    #[arg(long, value_name = "DIR")]
    pub sdk: Option<String>,

    /// Run zipalign on the package before signing, when it is available
    #[arg(long)]
    pub align: bool,

    /// Fail instead of replacing an existing output file
    #[arg(long)]
    pub no_overwrite: bool,

    /// Give up on a tool that runs longer than this many seconds
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,
}

impl ResignCommand {
    /// Execute the resign command
    pub fn execute(&self, app: &mut AppState) -> anyhow::Result<()> {
        info!(apk = %self.apk.display(), profile = %self.profile, "executing resign command");

        if !app.store.contains(&self.profile) {
            return Err(ConfigError::ProfileNotFound(self.profile.clone()).into());
        }
        app.current_profile = self.profile.clone();

        if let Some(sdk) = &self.sdk {
            app.store.set_toolchain_root(sdk.clone());
            app.persist();
        }

        let profile = app.store.get_profile(&app.current_profile);
        let locator = ToolchainLocator::new(app.store.toolchain_root());
        let job = ResignJob::prepare(&self.apk, &app.current_profile, &profile, &locator)?;

        if app.is_text() {
            output::info(&format!(
                "Re-signing {} with profile '{}'",
                output::path_style().apply_to(self.apk.display()),
                app.current_profile
            ));
            println!(
                "{}",
                output::key_value("apksigner", &job.tools.signer.display().to_string())
            );
        }

        let invoker = SigningInvoker::new(self.options());
        let rt = tokio::runtime::Runtime::new()?;
        let outcome = rt.block_on(async {
            let handle = invoker.spawn(job);
            follow(handle, &*app).await
        })?;

        match outcome {
            ProgressEvent::Complete { output_path } => {
                if app.is_text() {
                    output::success(&format!(
                        "Signed APK written to {}",
                        output::path_style().apply_to(output_path.display())
                    ));
                }
                Ok(())
            }
            ProgressEvent::Error { message } => {
                Err(CommandFailed::new(message, exit_codes::SIGNING_ERROR).into())
            }
            ProgressEvent::Progress { .. } => {
                Err(CommandFailed::new("signing ended without a result", exit_codes::ERROR).into())
            }
        }
    }

    fn options(&self) -> ResignOptions {
        ResignOptions {
            overwrite: if self.no_overwrite {
                OverwritePolicy::FailIfExists
            } else {
                OverwritePolicy::Overwrite
            },
            align: self.align,
            scratch_root: None,
            timeout: self.timeout.map(Duration::from_secs),
        }
    }
}

/// Drain the job's events on a fixed tick until the terminal one arrives,
/// rendering each as it comes. Returns the terminal event.
async fn follow(mut handle: ResignHandle, app: &AppState) -> anyhow::Result<ProgressEvent> {
    let bar = progress_bar(app);
    let mut tick = tokio::time::interval(POLL_INTERVAL);
    let mut terminal = None;

    while !handle.is_finished() {
        tick.tick().await;
        for event in handle.drain() {
            if app.format == OutputFormat::Json {
                println!("{}", serde_json::to_string(&event)?);
            }
            match &event {
                ProgressEvent::Progress { value, status } => {
                    bar.set_position(u64::from(*value));
                    bar.set_message(status.clone());
                }
                ProgressEvent::Complete { .. } => bar.set_position(100),
                ProgressEvent::Error { .. } => {}
            }
            if event.is_terminal() {
                terminal = Some(event);
            }
        }
    }

    bar.finish_and_clear();
    Ok(terminal.unwrap_or_else(|| ProgressEvent::Error {
        message: "signing ended without a result".to_string(),
    }))
}

fn progress_bar(app: &AppState) -> ProgressBar {
    if !app.is_text() {
        return ProgressBar::hidden();
    }

    let style = ProgressStyle::with_template("{bar:40.cyan/blue} {pos:>3}% {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-");
    let bar = ProgressBar::new(100);
    bar.set_style(style);
    bar
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(no_overwrite: bool, timeout: Option<u64>) -> ResignCommand {
        ResignCommand {
            apk: PathBuf::from("app.apk"),
            profile: DEFAULT_PROFILE.to_string(),
            sdk: None,
            align: false,
            no_overwrite,
            timeout,
        }
    }

    #[test]
    fn test_options_defaults() {
        let options = command(false, None).options();
        assert_eq!(options.overwrite, OverwritePolicy::Overwrite);
        assert!(!options.align);
        assert!(options.scratch_root.is_none());
        assert!(options.timeout.is_none());
    }

    #[test]
    fn test_options_from_flags() {
        let options = command(true, Some(30)).options();
        assert_eq!(options.overwrite, OverwritePolicy::FailIfExists);
        assert_eq!(options.timeout, Some(Duration::from_secs(30)));
    }
}
