//! LMS login credentials

use serde::{Deserialize, Serialize};

/// Username and password used to log in to the LMS.
///
/// Stored locally only; verification against the LMS happens elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Credentials {
    /// Eg: `nusstu\e0123456`
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Returns true when both fields are filled in
    pub fn is_complete(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }

    /// Password with every character hidden
    pub fn masked_password(&self) -> String {
        mask_secret(&self.password, 0)
    }
}

/// Hides a secret, keeping at most `visible_suffix` trailing characters
pub fn mask_secret(secret: &str, visible_suffix: usize) -> String {
    let total = secret.chars().count();
    if total == 0 {
        return String::new();
    }

    let visible = if total > visible_suffix * 2 {
        visible_suffix
    } else {
        0
    };
    let hidden = total - visible;

    let mut masked = "*".repeat(hidden);
    masked.extend(secret.chars().skip(hidden));
    masked
}
