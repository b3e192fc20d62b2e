//! Lominus - keeps your Luminus files in sync
//!
//! Lominus periodically logs in to Luminus, downloads new course files and
//! grades, and can forward notifications to a Telegram bot. This crate holds
//! the local side of that: the structured store every record goes through,
//! the records themselves, the notification relay, and the CLI used to edit
//! them.

pub mod domain;
pub mod store;
pub mod storage;
pub mod relay;
pub mod cli;

pub use domain::{Credentials, Frequency, Notification, Preferences, TelegramInfo};
pub use store::StoreError;
