//! Per-user profile
//!
//! Loads and saves each persisted record at its well-known path and keeps
//! the application log. A record that was saved stays saved even if the
//! log line about it cannot be written; those failures are collected as
//! warnings for the caller to report.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use super::{AppLog, AppPaths, LogLevel};
use crate::domain::{Credentials, Frequency, Preferences, TelegramInfo};
use crate::store::{self, StoreError};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProfileError {
    #[error("Please set the directory to store your Luminus files")]
    DirectoryNotSet,

    #[error("Sync is currently disabled. Please choose a sync frequency to sync now.")]
    SyncDisabled,
}

/// What a sync run would do, once its preconditions hold
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncPlan {
    pub directory: PathBuf,
    pub frequency: Frequency,
}

/// A user's Lominus files
pub struct Profile {
    paths: AppPaths,
    log: AppLog,
    warnings: RefCell<Vec<String>>,
}

impl Profile {
    /// Opens the profile, creating its directory if needed
    pub fn open(paths: AppPaths) -> Result<Self> {
        paths.ensure()?;
        let log = AppLog::new(paths.log());

        Ok(Self {
            paths,
            log,
            warnings: RefCell::new(Vec::new()),
        })
    }

    pub fn paths(&self) -> &AppPaths {
        &self.paths
    }

    pub fn log(&self) -> &AppLog {
        &self.log
    }

    /// Writes to the application log, keeping any failure as a warning
    pub fn log_event(&self, level: LogLevel, message: &str) {
        if let Err(e) = self.log.write(level, message) {
            self.warnings
                .borrow_mut()
                .push(format!("Could not write to the log: {:#}", e));
        }
    }

    /// Returns and clears the warnings collected so far
    pub fn take_warnings(&self) -> Vec<String> {
        self.warnings.take()
    }

    pub fn has_credentials(&self) -> bool {
        store::exists(self.paths.credentials())
    }

    /// Loads the saved credentials
    pub fn credentials(&self) -> Result<Credentials> {
        load_required(&self.paths.credentials(), "credentials")
    }

    pub fn save_credentials(&self, credentials: &Credentials) -> Result<()> {
        let path = self.paths.credentials();
        store::persist(&path, credentials)
            .with_context(|| format!("Failed to save credentials: {}", path.display()))?;

        self.log_event(
            LogLevel::Info,
            &format!("credentials saved for {}", credentials.username),
        );
        Ok(())
    }

    /// Loads preferences, falling back to defaults when none were saved yet
    pub fn preferences(&self) -> Result<Preferences> {
        let path = self.paths.preferences();
        if !store::exists(&path) {
            return Ok(Preferences::default());
        }

        store::load(&path)
            .with_context(|| format!("Failed to load preferences: {}", path.display()))
    }

    pub fn save_preferences(&self, preferences: &Preferences) -> Result<()> {
        let path = self.paths.preferences();
        store::persist(&path, preferences)
            .with_context(|| format!("Failed to save preferences: {}", path.display()))?;

        self.log_event(
            LogLevel::Info,
            &format!(
                "preferences saved (directory: {}, frequency: {})",
                preferences.directory_label(),
                preferences.frequency
            ),
        );
        Ok(())
    }

    /// Sets the sync root, creating it if it does not exist yet
    pub fn set_directory(&self, directory: &Path) -> Result<Preferences> {
        store::ensure_dir(directory).with_context(|| {
            format!("Failed to create sync directory: {}", directory.display())
        })?;
        let directory = fs::canonicalize(directory).with_context(|| {
            format!("Failed to resolve sync directory: {}", directory.display())
        })?;

        let mut preferences = self.preferences()?;
        preferences.directory = directory.to_string_lossy().into_owned();
        self.save_preferences(&preferences)?;

        Ok(preferences)
    }

    pub fn set_frequency(&self, frequency: Frequency) -> Result<Preferences> {
        let mut preferences = self.preferences()?;
        preferences.frequency = frequency;
        self.save_preferences(&preferences)?;

        Ok(preferences)
    }

    pub fn has_telegram(&self) -> bool {
        store::exists(self.paths.telegram())
    }

    /// Loads the saved Telegram integration
    pub fn telegram(&self) -> Result<TelegramInfo> {
        load_required(&self.paths.telegram(), "Telegram info")
    }

    pub fn save_telegram(&self, info: &TelegramInfo) -> Result<()> {
        let path = self.paths.telegram();
        store::persist(&path, info)
            .with_context(|| format!("Failed to save Telegram info: {}", path.display()))?;

        self.log_event(
            LogLevel::Info,
            &format!("telegram info saved for user {}", info.user_id),
        );
        Ok(())
    }

    /// Checks the preconditions of a manual sync
    pub fn sync_plan(&self) -> Result<SyncPlan> {
        let preferences = self.preferences()?;

        let directory = preferences
            .directory()
            .ok_or(ProfileError::DirectoryNotSet)?
            .to_path_buf();
        if !preferences.frequency.is_enabled() {
            return Err(ProfileError::SyncDisabled.into());
        }

        Ok(SyncPlan {
            directory,
            frequency: preferences.frequency,
        })
    }
}

/// Loads a record that must already exist, reporting a missing file by name
fn load_required<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    if !store::exists(path) {
        return Err(StoreError::missing(path.display().to_string()).into());
    }

    store::load(path).with_context(|| format!("Failed to load {}: {}", what, path.display()))
}
