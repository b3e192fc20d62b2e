//! Preferences CLI commands

use std::path::PathBuf;

use anyhow::Result;
use clap::Subcommand;

use super::output::Output;
use crate::domain::{Frequency, Preferences};
use crate::storage::Profile;

#[derive(Subcommand)]
pub enum PrefsCommands {
    /// Show the current preferences
    Show,

    /// Set the root directory for synced files
    Dir {
        /// Directory (created if missing)
        path: PathBuf,
    },

    /// Set the number of hours between syncs
    Frequency {
        /// "1 hour", "4", "12h", "disabled", ...
        #[arg(allow_hyphen_values = true)]
        value: Frequency,
    },

    /// List the available sync frequencies
    Frequencies,
}

pub fn run(cmd: PrefsCommands, profile: &Profile, output: &Output) -> Result<()> {
    match cmd {
        PrefsCommands::Show => {
            let preferences = profile.preferences()?;
            print_preferences(output, &preferences);
        }
        PrefsCommands::Dir { path } => {
            output.verbose_ctx("prefs", &format!("Setting directory to {}", path.display()));
            let preferences = profile.set_directory(&path)?;
            output.emit(
                &format!("Sync directory set to {}", preferences.directory_label()),
                &preferences_json(&preferences),
            );
        }
        PrefsCommands::Frequency { value } => {
            let preferences = profile.set_frequency(value)?;
            let text = if value.is_enabled() {
                format!("Sync frequency set to {}", value)
            } else {
                "Sync disabled".to_string()
            };
            output.emit(&text, &preferences_json(&preferences));
        }
        PrefsCommands::Frequencies => {
            let current = profile.preferences()?.frequency;
            list_frequencies(output, current);
        }
    }

    Ok(())
}

fn preferences_json(preferences: &Preferences) -> serde_json::Value {
    serde_json::json!({
        "directory": preferences.directory().map(|d| d.display().to_string()),
        "frequency": preferences.frequency.hours(),
        "frequency_label": preferences.frequency.label(),
    })
}

fn print_preferences(output: &Output, preferences: &Preferences) {
    output.emit(
        &format!(
            "Directory: {}\nFrequency: {}",
            preferences.directory_label(),
            preferences.frequency
        ),
        &preferences_json(preferences),
    );
}

fn list_frequencies(output: &Output, current: Frequency) {
    if output.is_json() {
        let items: Vec<_> = Frequency::ALL
            .iter()
            .map(|f| {
                serde_json::json!({
                    "label": f.label(),
                    "hours": f.hours(),
                    "current": *f == current,
                })
            })
            .collect();
        output.data(&items);
        return;
    }

    println!("  {:<10} HOURS", "LABEL");
    for frequency in Frequency::ALL {
        let marker = if frequency == current { "*" } else { " " };
        println!("{} {:<10} {}", marker, frequency.label(), frequency.hours());
    }
}
