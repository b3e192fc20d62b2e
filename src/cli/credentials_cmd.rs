//! Credentials CLI commands

use anyhow::Result;
use clap::Subcommand;

use super::output::Output;
use crate::domain::Credentials;
use crate::storage::Profile;

#[derive(Subcommand)]
pub enum CredentialsCommands {
    /// Save the username and password used to log in to Luminus
    Set {
        /// Eg: nusstu\e0123456
        #[arg(long, short)]
        username: String,

        /// Account password
        #[arg(long, short, env = "LOMINUS_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Show the saved credentials (password hidden)
    Show,
}

pub fn run(cmd: CredentialsCommands, profile: &Profile, output: &Output) -> Result<()> {
    match cmd {
        CredentialsCommands::Set { username, password } => set(profile, output, username, password),
        CredentialsCommands::Show => show(profile, output),
    }
}

fn set(profile: &Profile, output: &Output, username: String, password: String) -> Result<()> {
    let credentials = Credentials::new(username, password);
    if !credentials.is_complete() {
        anyhow::bail!("Both username and password are required");
    }

    let updating = profile.has_credentials();
    output.verbose_ctx(
        "credentials",
        &format!("Writing {}", profile.paths().credentials().display()),
    );
    profile.save_credentials(&credentials)?;

    let message = if updating {
        "Credentials updated. They are stored locally and only used to log in to Luminus."
    } else {
        "Credentials saved. They are stored locally and only used to log in to Luminus."
    };
    output.success(message);

    Ok(())
}

fn show(profile: &Profile, output: &Output) -> Result<()> {
    let credentials = profile.credentials()?;

    output.emit(
        &format!(
            "Username: {}\nPassword: {}",
            credentials.username,
            credentials.masked_password()
        ),
        &serde_json::json!({
            "username": credentials.username,
            "password_set": !credentials.password.is_empty(),
        }),
    );

    Ok(())
}
