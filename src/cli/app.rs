//! Main CLI application structure

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::{credentials_cmd, file_cmd, prefs_cmd, sync_cmd, telegram_cmd};
use crate::storage::{AppPaths, Profile};

#[derive(Parser)]
#[command(name = "lominus")]
#[command(author, version, about = "Keeps your Luminus files in sync")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Directory holding credentials, preferences and logs
    #[arg(long, global = true, env = "LOMINUS_HOME")]
    pub home: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage Luminus login credentials
    #[command(subcommand)]
    Credentials(credentials_cmd::CredentialsCommands),

    /// Manage sync directory and frequency
    #[command(subcommand)]
    Prefs(prefs_cmd::PrefsCommands),

    /// Manage the Telegram integration
    #[command(subcommand)]
    Telegram(telegram_cmd::TelegramCommands),

    /// Request a sync now
    Sync,

    /// Show the application log
    Logs {
        /// Number of lines to show
        #[arg(short = 'n', long, default_value = "50")]
        lines: usize,
    },

    /// File helpers (sanitize names, versioned renames)
    #[command(subcommand)]
    File(file_cmd::FileCommands),
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(cli.format, cli.verbose);

    let home = cli.home.as_deref();
    match cli.command {
        Commands::Credentials(cmd) => with_profile(home, &output, |profile| {
            credentials_cmd::run(cmd, profile, &output)
        })?,
        Commands::Prefs(cmd) => {
            with_profile(home, &output, |profile| prefs_cmd::run(cmd, profile, &output))?
        }
        Commands::Telegram(cmd) => with_profile(home, &output, |profile| {
            telegram_cmd::run(cmd, profile, &output)
        })?,
        Commands::Sync => with_profile(home, &output, |profile| sync_cmd::run(profile, &output))?,
        Commands::Logs { lines } => {
            with_profile(home, &output, |profile| show_logs(profile, &output, lines))?
        }

        // File helpers work on arbitrary paths and never touch the profile
        Commands::File(cmd) => file_cmd::run(cmd, &output)?,
    }

    output.verbose_ctx("done", "Command completed successfully");
    Ok(())
}

/// Opens the profile, runs `command` against it, then reports any log
/// failures collected along the way as warnings
fn with_profile<F>(home: Option<&Path>, output: &Output, command: F) -> Result<()>
where
    F: FnOnce(&Profile) -> Result<()>,
{
    let paths = AppPaths::resolve(home)?;
    output.verbose_ctx("home", &format!("Using {}", paths.root().display()));
    let profile = Profile::open(paths)?;

    let result = command(&profile);
    for warning in profile.take_warnings() {
        output.warn(&warning);
    }
    result
}

/// Prints the tail of the application log
fn show_logs(profile: &Profile, output: &Output, lines: usize) -> Result<()> {
    let entries = profile.log().tail(lines)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "path": profile.log().path().display().to_string(),
            "lines": entries,
        }));
    } else if entries.is_empty() {
        println!("No log entries yet ({})", profile.log().path().display());
    } else {
        for line in &entries {
            println!("{}", line);
        }
    }

    Ok(())
}
