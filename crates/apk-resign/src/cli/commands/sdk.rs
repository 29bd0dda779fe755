//! Android SDK location commands

use std::path::Path;

use clap::{Args, Subcommand};
use serde::Serialize;
use tracing::info;

use crate::cli::{output, AppState, OutputFormat};

/// Toolchain root commands
#[derive(Debug, Args)]
pub struct SdkCommand {
    #[command(subcommand)]
    pub command: SdkSubcommand,
}

/// SDK subcommands
#[derive(Debug, Subcommand)]
pub enum SdkSubcommand {
    /// Show the stored SDK location
    Show,

    /// Store an SDK location to search before the environment and PATH
    Set {
        /// Android SDK root (the directory containing build-tools/)
        dir: String,
    },

    /// Forget the stored SDK location
    Clear,
}

#[derive(Debug, Serialize)]
struct SdkView<'a> {
    sdk_path: &'a str,
}

impl SdkCommand {
    /// Execute the sdk command
    pub fn execute(&self, app: &mut AppState) -> anyhow::Result<()> {
        match &self.command {
            SdkSubcommand::Show => show(app),
            SdkSubcommand::Set { dir } => set(app, dir),
            SdkSubcommand::Clear => set(app, ""),
        }
    }
}

fn show(app: &AppState) -> anyhow::Result<()> {
    info!(subcommand = "show", "executing sdk command");
    let sdk_path = app.store.toolchain_root();

    if app.format == OutputFormat::Json {
        return output::json(&SdkView { sdk_path });
    }
    if app.quiet {
        return Ok(());
    }

    if sdk_path.is_empty() {
        output::info("No SDK location stored; tools are looked up via ANDROID_HOME, ANDROID_SDK_ROOT and PATH");
    } else {
        println!("{}", output::key_value("sdk", sdk_path));
    }
    Ok(())
}

fn set(app: &mut AppState, dir: &str) -> anyhow::Result<()> {
    info!(subcommand = "set", dir, "executing sdk command");

    if !dir.is_empty() && !Path::new(dir).join("build-tools").is_dir() && !app.quiet {
        output::warning(&format!("{dir} has no build-tools directory"));
    }

    app.store.set_toolchain_root(dir);
    app.persist();

    if app.is_text() {
        if dir.is_empty() {
            output::success("Cleared the stored SDK location");
        } else {
            output::success(&format!(
                "SDK location set to {}",
                output::path_style().apply_to(dir)
            ));
        }
    }
    Ok(())
}
