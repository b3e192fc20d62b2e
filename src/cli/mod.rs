//! # Command-Line Interface
//!
//! User-facing commands for editing what Lominus keeps on disk.
//!
//! ## Command Groups
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Credentials | Luminus login | `credentials set`, `credentials show` |
//! | Preferences | Sync directory and frequency | `prefs dir`, `prefs frequency` |
//! | Integrations | Telegram bot | `telegram set`, `telegram show` |
//! | Sync | Manual sync request | `sync` |
//! | Files | Store helpers | `file sanitize`, `file rename` |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Home Directory
//!
//! `--home` or `LOMINUS_HOME` points Lominus at a different directory for
//! its credentials, preferences and log.
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod credentials_cmd;
mod file_cmd;
mod output;
mod prefs_cmd;
mod sync_cmd;
mod telegram_cmd;

pub use app::{run, Cli, Commands};
pub use output::{Output, OutputFormat};
