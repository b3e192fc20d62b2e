//! Telegram integration CLI commands

use anyhow::Result;
use clap::Subcommand;

use super::output::Output;
use crate::domain::TelegramInfo;
use crate::storage::Profile;

#[derive(Subcommand)]
pub enum TelegramCommands {
    /// Save the bot token and user ID used for grade notifications
    Set {
        /// Your bot's API token
        #[arg(long, env = "LOMINUS_TELEGRAM_BOT_API", hide_env_values = true)]
        bot_api: String,

        /// Your account's ID
        #[arg(long)]
        user_id: String,
    },

    /// Show the saved Telegram integration (token hidden)
    Show,
}

pub fn run(cmd: TelegramCommands, profile: &Profile, output: &Output) -> Result<()> {
    match cmd {
        TelegramCommands::Set { bot_api, user_id } => set(profile, output, bot_api, user_id),
        TelegramCommands::Show => show(profile, output),
    }
}

fn set(profile: &Profile, output: &Output, bot_api: String, user_id: String) -> Result<()> {
    let info = TelegramInfo::new(bot_api, user_id);
    if !info.is_complete() {
        anyhow::bail!("Both the bot API token and the user ID are required");
    }

    let updating = profile.has_telegram();
    profile.save_telegram(&info)?;

    output.success(if updating {
        "Telegram info updated."
    } else {
        "Telegram info saved."
    });

    Ok(())
}

fn show(profile: &Profile, output: &Output) -> Result<()> {
    let info = profile.telegram()?;

    output.emit(
        &format!(
            "Bot API token: {}\nUser ID: {}",
            info.masked_bot_api(),
            info.user_id
        ),
        &serde_json::json!({
            "bot_api": info.masked_bot_api(),
            "user_id": info.user_id,
        }),
    );

    Ok(())
}
