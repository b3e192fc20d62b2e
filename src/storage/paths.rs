//! Well-known locations of Lominus' files
//!
//! Everything lives in one per-user directory: the platform data dir from
//! `directories`, or whatever `LOMINUS_HOME` / `--home` points at.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;

use crate::store;

/// Environment variable overriding the application directory
pub const HOME_ENV: &str = "LOMINUS_HOME";

const CREDENTIALS_FILE: &str = "credentials.cbor";
const PREFERENCES_FILE: &str = "preferences.cbor";
const TELEGRAM_FILE: &str = "telegram.cbor";
const LOG_FILE: &str = "lominus.log";

/// Paths to every file Lominus keeps for a user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    root: PathBuf,
}

impl AppPaths {
    /// Uses `root` as the application directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolves the application directory from an explicit override, then
    /// `LOMINUS_HOME`, then the platform default
    pub fn resolve(home: Option<&Path>) -> Result<Self> {
        if let Some(home) = home {
            return Ok(Self::new(home));
        }

        if let Some(home) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::new(PathBuf::from(home)));
        }

        Self::default_root()
            .map(Self::new)
            .ok_or_else(|| anyhow::anyhow!("Could not determine the Lominus data directory"))
    }

    /// Returns the platform data directory
    pub fn default_root() -> Option<PathBuf> {
        ProjectDirs::from("sg.edu.nus", "beebeeoii", "lominus")
            .map(|dirs| dirs.data_dir().to_path_buf())
    }

    /// Creates the application directory if needed
    pub fn ensure(&self) -> Result<()> {
        store::ensure_dir(&self.root).with_context(|| {
            format!(
                "Failed to create Lominus directory: {}",
                self.root.display()
            )
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn credentials(&self) -> PathBuf {
        self.root.join(CREDENTIALS_FILE)
    }

    pub fn preferences(&self) -> PathBuf {
        self.root.join(PREFERENCES_FILE)
    }

    pub fn telegram(&self) -> PathBuf {
        self.root.join(TELEGRAM_FILE)
    }

    pub fn log(&self) -> PathBuf {
        self.root.join(LOG_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_home_wins() {
        let dir = TempDir::new().unwrap();
        let paths = AppPaths::resolve(Some(dir.path())).unwrap();

        assert_eq!(paths.root(), dir.path());
        assert_eq!(paths.credentials(), dir.path().join("credentials.cbor"));
        assert_eq!(paths.preferences(), dir.path().join("preferences.cbor"));
        assert_eq!(paths.telegram(), dir.path().join("telegram.cbor"));
        assert_eq!(paths.log(), dir.path().join("lominus.log"));
    }

    #[test]
    fn ensure_creates_nested_root() {
        let dir = TempDir::new().unwrap();
        let paths = AppPaths::new(dir.path().join("a").join("b"));

        paths.ensure().unwrap();
        paths.ensure().unwrap();

        assert!(paths.root().is_dir());
    }
}
