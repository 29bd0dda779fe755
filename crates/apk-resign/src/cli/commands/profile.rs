//! Profile management commands

use clap::{Args, Subcommand};
use console::style;
use serde::Serialize;
use tracing::info;

use apk_resign_core::{ConfigError, SigningProfile, DEFAULT_PROFILE};

use crate::cli::{output, AppState, OutputFormat};

/// Shown in place of a stored password
const MASK: &str = "********";

/// Keystore file extensions accepted by apksigner
const KEYSTORE_EXTENSIONS: &[&str] = &["jks", "keystore"];

/// Signing profile commands
#[derive(Debug, Args)]
pub struct ProfileCommand {
    #[command(subcommand)]
    pub command: ProfileSubcommand,
}

/// Profile subcommands
#[derive(Debug, Subcommand)]
pub enum ProfileSubcommand {
    /// List all profiles
    List,

    /// Show one profile
    Show(ShowCommand),

    /// Create an empty profile
    New(NewCommand),

    /// Set the keystore, alias or password of a profile
    Set(SetCommand),

    /// Rename a profile
    Rename(RenameCommand),

    /// Delete a profile
    Delete(DeleteCommand),
}

/// Show one profile
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Profile name
    pub name: String,

    /// Print the password instead of masking it
    #[arg(long)]
    pub reveal: bool,
}

/// Create an empty profile
#[derive(Debug, Args)]
pub struct NewCommand {
    /// Profile name
    pub name: String,
}

/// Set profile fields; the profile is created if it does not exist
#[derive(Debug, Args)]
pub struct SetCommand {
    /// Profile name
    pub name: String,

    /// Path to the keystore file (.jks or .keystore)
    #[arg(long)]
    pub keystore: Option<String>,

    /// Key alias inside the keystore
    #[arg(long)]
    pub alias: Option<String>,

    /// Keystore password
    #[arg(long, conflicts_with = "prompt_password")]
    pub password: Option<String>,

    /// Ask for the keystore password interactively
    #[arg(long)]
    pub prompt_password: bool,
}

/// Rename a profile
#[derive(Debug, Args)]
pub struct RenameCommand {
    /// Current name
    pub old: String,

    /// New name
    pub new: String,
}

/// Delete a profile
#[derive(Debug, Args)]
pub struct DeleteCommand {
    /// Profile name
    pub name: String,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// A profile as printed by `list` and `show`
#[derive(Debug, Serialize)]
struct ProfileView {
    name: String,
    keystore_path: String,
    key_alias: String,
    password: String,
    complete: bool,
    current: bool,
}

impl ProfileView {
    fn new(name: &str, profile: &SigningProfile, current: bool, reveal: bool) -> Self {
        let password = if reveal || profile.store_password.is_empty() {
            profile.store_password.clone()
        } else {
            MASK.to_string()
        };
        Self {
            name: name.to_string(),
            keystore_path: profile.keystore_path.clone(),
            key_alias: profile.key_alias.clone(),
            password,
            complete: profile.validate(name).is_ok(),
            current,
        }
    }

    fn print(&self) {
        let marker = if self.current { "*" } else { " " };
        let name = if self.complete {
            style(&self.name).bold().to_string()
        } else {
            format!("{} {}", style(&self.name).bold(), style("(incomplete)").yellow())
        };
        println!("{marker} {name}");
        println!("{}", output::key_value("keystore", or_unset(&self.keystore_path)));
        println!("{}", output::key_value("alias", or_unset(&self.key_alias)));
        println!("{}", output::key_value("password", or_unset(&self.password)));
    }
}

fn or_unset(value: &str) -> &str {
    if value.is_empty() {
        "(not set)"
    } else {
        value
    }
}

fn has_keystore_extension(path: &str) -> bool {
    std::path::Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| KEYSTORE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

impl ProfileCommand {
    /// Execute the profile command
    pub fn execute(&self, app: &mut AppState) -> anyhow::Result<()> {
        match &self.command {
            ProfileSubcommand::List => list(app),
            ProfileSubcommand::Show(cmd) => cmd.execute(app),
            ProfileSubcommand::New(cmd) => cmd.execute(app),
            ProfileSubcommand::Set(cmd) => cmd.execute(app),
            ProfileSubcommand::Rename(cmd) => cmd.execute(app),
            ProfileSubcommand::Delete(cmd) => cmd.execute(app),
        }
    }
}

fn list(app: &AppState) -> anyhow::Result<()> {
    info!(subcommand = "list", "executing profile command");
    let views: Vec<ProfileView> = app
        .store
        .get_all_profiles()
        .iter()
        .map(|(name, profile)| ProfileView::new(name, profile, *name == app.current_profile, false))
        .collect();

    if app.format == OutputFormat::Json {
        return output::json(&views);
    }
    if app.quiet {
        return Ok(());
    }

    println!("{}", output::header("Signing profiles"));
    println!();
    for view in &views {
        view.print();
    }
    println!();
    println!(
        "{}",
        output::key_value("store", &app.store.path().display().to_string())
    );
    Ok(())
}

impl ShowCommand {
    fn execute(&self, app: &AppState) -> anyhow::Result<()> {
        info!(subcommand = "show", profile = %self.name, "executing profile command");
        if !app.store.contains(&self.name) {
            return Err(ConfigError::ProfileNotFound(self.name.clone()).into());
        }

        let profile = app.store.get_profile(&self.name);
        let view = ProfileView::new(
            &self.name,
            &profile,
            self.name == app.current_profile,
            self.reveal,
        );

        if app.format == OutputFormat::Json {
            return output::json(&view);
        }
        if !app.quiet {
            view.print();
        }
        Ok(())
    }
}

impl NewCommand {
    fn execute(&self, app: &mut AppState) -> anyhow::Result<()> {
        info!(subcommand = "new", profile = %self.name, "executing profile command");
        app.store.create_profile(&self.name)?;
        app.persist();

        if app.is_text() {
            output::success(&format!("Created profile '{}'", self.name));
            output::info(&format!(
                "Fill it in with: apk-resign profile set {} --keystore <PATH> --alias <ALIAS> --prompt-password",
                self.name
            ));
        }
        Ok(())
    }
}

impl SetCommand {
    fn execute(&self, app: &mut AppState) -> anyhow::Result<()> {
        info!(subcommand = "set", profile = %self.name, "executing profile command");
        let created = !app.store.contains(&self.name);
        if created {
            app.store.create_profile(&self.name)?;
        }

        let mut profile = app.store.get_profile(&self.name);
        if let Some(keystore) = &self.keystore {
            if !has_keystore_extension(keystore) && !app.quiet {
                output::warning(&format!(
                    "{keystore} does not look like a keystore (.jks or .keystore)"
                ));
            }
            profile.keystore_path = keystore.clone();
        }
        if let Some(alias) = &self.alias {
            profile.key_alias = alias.clone();
        }
        let password = if self.prompt_password {
            Some(
                dialoguer::Password::new()
                    .with_prompt(format!("Keystore password for '{}'", self.name))
                    .interact()?,
            )
        } else {
            self.password.clone()
        };
        if let Some(password) = password {
            profile.store_password = password;
        }

        app.store.update_profile(&self.name, profile);
        app.persist();

        if app.is_text() {
            let verb = if created { "Created" } else { "Updated" };
            output::success(&format!("{verb} profile '{}'", self.name));
        }
        Ok(())
    }
}

impl RenameCommand {
    fn execute(&self, app: &mut AppState) -> anyhow::Result<()> {
        info!(subcommand = "rename", from = %self.old, to = %self.new, "executing profile command");
        app.store.rename_profile(&self.old, &self.new)?;
        if app.current_profile == self.old {
            app.current_profile = self.new.clone();
        }
        app.persist();

        if app.is_text() {
            output::success(&format!("Renamed profile '{}' to '{}'", self.old, self.new));
        }
        Ok(())
    }
}

impl DeleteCommand {
    fn execute(&self, app: &mut AppState) -> anyhow::Result<()> {
        info!(subcommand = "delete", profile = %self.name, "executing profile command");
        if self.name == DEFAULT_PROFILE {
            return Err(ConfigError::ProtectedProfile(self.name.clone()).into());
        }
        if !app.store.contains(&self.name) {
            return Err(ConfigError::ProfileNotFound(self.name.clone()).into());
        }

        if !self.yes {
            let confirmed = dialoguer::Confirm::new()
                .with_prompt(format!("Delete profile '{}'?", self.name))
                .default(false)
                .interact()?;

            if !confirmed {
                println!("{}", style("Aborted.").yellow());
                return Ok(());
            }
        }

        app.store.delete_profile(&self.name)?;
        if app.current_profile == self.name {
            app.current_profile = DEFAULT_PROFILE.to_string();
        }
        app.persist();

        if app.is_text() {
            output::success(&format!("Deleted profile '{}'", self.name));
        }
        Ok(())
    }
}
