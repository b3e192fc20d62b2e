//! Domain models for Lominus
//!
//! The records persisted through [`crate::store`], without any I/O of their own.

mod credentials;
mod notification;
mod preferences;
mod telegram;

pub use credentials::{mask_secret, Credentials};
pub use notification::Notification;
pub use preferences::{Frequency, FrequencyError, Preferences};
pub use telegram::TelegramInfo;
