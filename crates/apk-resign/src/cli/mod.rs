//! CLI definition and command handling

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use apk_resign_core::{ProfileStore, CONFIG_ENV_VAR, DEFAULT_PROFILE};

use commands::{CompletionsCommand, ProfileCommand, ResignCommand, SdkCommand, ToolsCommand};

/// apk-resign - re-sign Android packages with stored keystore profiles
#[derive(Debug, Parser)]
#[command(name = "apk-resign")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Profile store file (defaults to ~/.apk_resign_gui_config.json)
    #[arg(long, global = true, env = CONFIG_ENV_VAR)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for CLI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output
    Json,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Re-sign an APK with a stored profile
    Resign(ResignCommand),

    /// Manage signing profiles
    Profile(ProfileCommand),

    /// Show or change the Android SDK location
    Sdk(SdkCommand),

    /// Locate apksigner and zipalign and show what was probed
    Tools(ToolsCommand),

    /// Generate shell completions
    Completions(CompletionsCommand),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> anyhow::Result<()> {
        let mut app = AppState::from_cli(&self)?;

        match self.command {
            Commands::Resign(ref cmd) => cmd.execute(&mut app),
            Commands::Profile(ref cmd) => cmd.execute(&mut app),
            Commands::Sdk(ref cmd) => cmd.execute(&mut app),
            Commands::Tools(ref cmd) => cmd.execute(&app),
            Commands::Completions(ref cmd) => cmd.execute(&app),
        }
    }
}

/// Session state handed to every command
#[derive(Debug)]
pub struct AppState {
    /// Loaded profile store
    pub store: ProfileStore,
    /// Profile selected for this session
    pub current_profile: String,
    /// Output format
    pub format: OutputFormat,
    /// Suppress non-error output
    pub quiet: bool,
}

impl AppState {
    pub fn new(store: ProfileStore, format: OutputFormat, quiet: bool) -> Self {
        Self {
            store,
            current_profile: DEFAULT_PROFILE.to_string(),
            format,
            quiet,
        }
    }

    fn from_cli(cli: &Cli) -> anyhow::Result<Self> {
        let store = match &cli.config {
            Some(path) => ProfileStore::load(path),
            None => ProfileStore::open_default()?,
        };
        Ok(Self::new(store, cli.format, cli.quiet))
    }

    /// Human-readable output is wanted
    pub fn is_text(&self) -> bool {
        self.format == OutputFormat::Text && !self.quiet
    }

    /// Write the store back, keeping its toolchain root
    pub fn persist(&mut self) {
        let root = self.store.toolchain_root().to_string();
        self.store.save(&root);
    }
}

/// A command failure that carries its own exit code
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct CommandFailed {
    pub message: String,
    pub code: i32,
}

impl CommandFailed {
    pub fn new(message: impl Into<String>, code: i32) -> Self {
        Self {
            message: message.into(),
            code,
        }
    }
}
