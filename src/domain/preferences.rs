//! User preferences and sync frequency
//!
//! Preferences hold the root directory LMS files are synced into and how
//! often the background sync runs.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrequencyError {
    #[error("Unsupported sync frequency: {0} hours (expected one of 1, 2, 4, 6, 12, or -1 to disable)")]
    UnknownHours(i32),

    #[error("Unknown sync frequency: '{0}'")]
    Unknown(String),
}

/// Hours between two background syncs.
///
/// Persisted as the hour count, with `-1` meaning disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum Frequency {
    Disabled,
    #[default]
    OneHour,
    TwoHours,
    FourHours,
    SixHours,
    TwelveHours,
}

impl Frequency {
    /// All frequencies in the order they are offered to the user
    pub const ALL: [Frequency; 6] = [
        Frequency::Disabled,
        Frequency::OneHour,
        Frequency::TwoHours,
        Frequency::FourHours,
        Frequency::SixHours,
        Frequency::TwelveHours,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Frequency::Disabled => "Disabled",
            Frequency::OneHour => "1 hour",
            Frequency::TwoHours => "2 hour",
            Frequency::FourHours => "4 hour",
            Frequency::SixHours => "6 hour",
            Frequency::TwelveHours => "12 hour",
        }
    }

    /// Hour count as stored on disk (`-1` when disabled)
    pub fn hours(&self) -> i32 {
        match self {
            Frequency::Disabled => -1,
            Frequency::OneHour => 1,
            Frequency::TwoHours => 2,
            Frequency::FourHours => 4,
            Frequency::SixHours => 6,
            Frequency::TwelveHours => 12,
        }
    }

    /// Time between syncs, or `None` when sync is disabled
    pub fn interval(&self) -> Option<Duration> {
        match self {
            Frequency::Disabled => None,
            other => Some(Duration::from_secs(other.hours() as u64 * 3600)),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, Frequency::Disabled)
    }

    /// Maps a selector label back to a frequency; anything unrecognised
    /// falls back to one hour
    pub fn from_label(label: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|f| f.label() == label)
            .unwrap_or(Frequency::OneHour)
    }
}

impl TryFrom<i32> for Frequency {
    type Error = FrequencyError;

    fn try_from(hours: i32) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|f| f.hours() == hours)
            .ok_or(FrequencyError::UnknownHours(hours))
    }
}

impl From<Frequency> for i32 {
    fn from(frequency: Frequency) -> Self {
        frequency.hours()
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Parses a label (`"4 hour"`), an hour count (`"4"`, `"4h"`, `"-1"`), or
/// `"disabled"` / `"off"`
impl FromStr for Frequency {
    type Err = FrequencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        if let Some(f) = Self::ALL
            .into_iter()
            .find(|f| f.label().eq_ignore_ascii_case(trimmed))
        {
            return Ok(f);
        }

        match trimmed.to_ascii_lowercase().as_str() {
            "disabled" | "disable" | "off" | "none" => return Ok(Frequency::Disabled),
            _ => {}
        }

        let digits = trimmed
            .strip_suffix(&['h', 'H'][..])
            .unwrap_or(trimmed)
            .trim();
        match digits.parse::<i32>() {
            Ok(hours) => Frequency::try_from(hours),
            Err(_) => Err(FrequencyError::Unknown(s.to_string())),
        }
    }
}

/// Persisted user preferences
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Root directory for synced files; empty means not set
    pub directory: String,

    pub frequency: Frequency,
}

impl Preferences {
    /// Returns the sync directory if one has been chosen
    pub fn directory(&self) -> Option<&Path> {
        if self.directory.is_empty() {
            None
        } else {
            Some(Path::new(&self.directory))
        }
    }

    /// Directory as shown to the user
    pub fn directory_label(&self) -> &str {
        if self.directory.is_empty() {
            "Not set"
        } else {
            &self.directory
        }
    }
}
