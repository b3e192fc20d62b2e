//! # Storage Layer
//!
//! Where Lominus keeps a user's records, built on [`crate::store`].
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Credentials | CBOR | `<home>/credentials.cbor` |
//! | Preferences | CBOR | `<home>/preferences.cbor` |
//! | Telegram integration | CBOR | `<home>/telegram.cbor` |
//! | Log | Text, rotated at 1MB | `<home>/lominus.log` |
//!
//! `<home>` is the platform data directory unless `LOMINUS_HOME` is set.
//!
//! ## Concurrency Safety
//!
//! - Record files are not locked; the last writer wins
//! - [`AppLog`] appends under an exclusive `fs2` lock
//!
//! ## Key Types
//!
//! - [`AppPaths`] - Resolves the home directory and file locations
//! - [`Profile`] - Loads and saves each record
//! - [`AppLog`] - The application log

mod log;
mod paths;
mod profile;

pub use log::{AppLog, LogLevel};
pub use paths::{AppPaths, HOME_ENV};
pub use profile::{Profile, ProfileError, SyncPlan};
