//! Telegram integration settings

use serde::{Deserialize, Serialize};

use super::credentials::mask_secret;

/// Bot token and chat ID used to forward grade notifications.
///
/// Delivering messages is handled by the integration itself; this is only
/// what gets persisted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TelegramInfo {
    /// The bot's API token
    pub bot_api: String,

    /// The user's account ID
    pub user_id: String,
}

impl TelegramInfo {
    pub fn new(bot_api: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            bot_api: bot_api.into(),
            user_id: user_id.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.bot_api.is_empty() && !self.user_id.is_empty()
    }

    /// Bot token with all but its last four characters hidden
    pub fn masked_bot_api(&self) -> String {
        mask_secret(&self.bot_api, 4)
    }
}
