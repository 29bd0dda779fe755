//! Build-tools discovery report

use clap::Args;
use console::style;
use tracing::info;

use apk_resign_signing::{ToolchainLocator, ToolchainResolution};

use crate::cli::{output, AppState, CommandFailed, OutputFormat};
use crate::exit_codes;

/// Locate apksigner and zipalign and show what was probed
#[derive(Debug, Args)]
pub struct ToolsCommand {
    /// Android SDK root to search instead of the stored one
    #[arg(long, value_name = "DIR")]
    pub sdk: Option<String>,
}

impl ToolsCommand {
    /// Execute the tools command
    pub fn execute(&self, app: &AppState) -> anyhow::Result<()> {
        let root = self
            .sdk
            .as_deref()
            .unwrap_or_else(|| app.store.toolchain_root());
        info!(root, "executing tools command");

        let resolution = ToolchainLocator::new(root).locate();

        if app.format == OutputFormat::Json {
            output::json(&resolution)?;
        } else if !app.quiet {
            print_resolution(root, &resolution);
        }

        if !resolution.is_resolved() {
            let missing: Vec<_> = resolution.missing.iter().cloned().collect();
            return Err(CommandFailed::new(
                format!("Missing required tools: {}", missing.join(", ")),
                exit_codes::TOOL_ERROR,
            )
            .into());
        }
        Ok(())
    }
}

fn print_resolution(root: &str, resolution: &ToolchainResolution) {
    println!("{}", output::header("Android build-tools"));
    println!();
    let root = if root.is_empty() { "(not set)" } else { root };
    println!("{}", output::key_value("sdk", root));

    let signer = match &resolution.signer {
        Some(path) => style(path.display()).green().to_string(),
        None => style("not found").red().to_string(),
    };
    println!("{}", output::key_value("apksigner", &signer));

    let aligner = match &resolution.aligner {
        Some(path) => style(path.display()).green().to_string(),
        None => style("not found (optional)").yellow().to_string(),
    };
    println!("{}", output::key_value("zipalign", &aligner));

    println!();
    println!("{}", output::header("Probed"));
    for line in &resolution.diagnostics {
        println!("  {} {}", style("·").dim(), line);
    }
}
