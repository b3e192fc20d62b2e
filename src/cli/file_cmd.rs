//! File helper commands

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;

use super::output::Output;
use crate::store;

#[derive(Subcommand)]
pub enum FileCommands {
    /// Print a name with characters that are illegal in paths removed
    Sanitize {
        /// Free-text name, e.g. a course or file title
        name: String,
    },

    /// Move a file aside as [vN]<name>
    Rename {
        path: PathBuf,
    },

    /// Create a directory and any missing parents
    EnsureDir {
        path: PathBuf,
    },

    /// Report whether something exists at a path
    Exists {
        path: PathBuf,
    },
}

pub fn run(cmd: FileCommands, output: &Output) -> Result<()> {
    match cmd {
        FileCommands::Sanitize { name } => {
            let sanitized = store::sanitize_name(&name);
            output.emit(
                &sanitized,
                &serde_json::json!({ "input": name, "sanitized": sanitized }),
            );
        }

        FileCommands::Rename { path } => {
            let renamed = store::auto_rename(&path)
                .with_context(|| format!("Failed to rename {}", path.display()))?;
            output.emit(
                &format!("Renamed {} to {}", path.display(), renamed.display()),
                &serde_json::json!({
                    "from": path.display().to_string(),
                    "to": renamed.display().to_string(),
                }),
            );
        }

        FileCommands::EnsureDir { path } => {
            store::ensure_dir(&path)?;
            output.success(&format!("Directory ready: {}", path.display()));
        }

        FileCommands::Exists { path } => {
            let exists = store::exists(&path);
            output.emit(
                if exists { "true" } else { "false" },
                &serde_json::json!({
                    "path": path.display().to_string(),
                    "exists": exists,
                }),
            );
        }
    }

    Ok(())
}
