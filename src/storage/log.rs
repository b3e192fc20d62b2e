//! Application log file
//!
//! Timestamped, append-only, rotated by size. Every append holds an
//! exclusive lock on a `.lock` file next to the log for both the rotation
//! check and the write, so the CLI, the notification relay thread and
//! other processes never interleave lines or rotate twice.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;

/// Maximum log file size before rotation (1MB)
const MAX_LOG_SIZE: u64 = 1024 * 1024;

/// Number of log files to keep
const LOG_ROTATION_COUNT: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        })
    }
}

/// Handle to the application log
#[derive(Debug, Clone)]
pub struct AppLog {
    path: PathBuf,
    max_size: u64,
    rotation_count: usize,
}

impl AppLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_size: MAX_LOG_SIZE,
            rotation_count: LOG_ROTATION_COUNT,
        }
    }

    /// Overrides the rotation threshold and how many files are kept
    pub fn with_rotation(mut self, max_size: u64, rotation_count: usize) -> Self {
        self.max_size = max_size;
        self.rotation_count = rotation_count.max(1);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn info(&self, message: &str) -> Result<()> {
        self.write(LogLevel::Info, message)
    }

    pub fn warn(&self, message: &str) -> Result<()> {
        self.write(LogLevel::Warn, message)
    }

    pub fn error(&self, message: &str) -> Result<()> {
        self.write(LogLevel::Error, message)
    }

    /// Appends one line to the log
    pub fn write(&self, level: LogLevel, message: &str) -> Result<()> {
        let lock_path = self.lock_path();
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .with_context(|| format!("Failed to open log lock: {}", lock_path.display()))?;
        lock.lock_exclusive()
            .context("Failed to acquire lock on log file")?;

        self.rotate_if_needed()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open log file: {}", self.path.display()))?;

        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        writeln!(&file, "[{}] {:<5} {}", timestamp, level, message)
            .context("Failed to write log entry")?;

        Ok(())
    }

    /// Returns the last `lines` entries of the current log file
    pub fn tail(&self, lines: usize) -> Result<Vec<String>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read log file: {}", self.path.display()))?;
        let all: Vec<&str> = content.lines().collect();
        let start = all.len().saturating_sub(lines);

        Ok(all[start..].iter().map(|l| l.to_string()).collect())
    }

    fn rotated_path(&self, index: usize) -> PathBuf {
        self.path.with_extension(format!("log.{}", index))
    }

    fn lock_path(&self) -> PathBuf {
        self.path.with_extension("log.lock")
    }

    /// Rotates log files if the current log exceeds the size limit
    fn rotate_if_needed(&self) -> Result<()> {
        let metadata = match fs::metadata(&self.path) {
            Ok(metadata) => metadata,
            Err(_) => return Ok(()),
        };
        if metadata.len() < self.max_size {
            return Ok(());
        }

        // Rotate existing numbered logs
        for i in (1..self.rotation_count).rev() {
            let old_path = self.rotated_path(i);
            if i + 1 >= self.rotation_count {
                ignore_missing(fs::remove_file(&old_path)).with_context(|| {
                    format!("Failed to remove old log: {}", old_path.display())
                })?;
            } else {
                ignore_missing(fs::rename(&old_path, self.rotated_path(i + 1))).with_context(
                    || format!("Failed to rotate log: {}", old_path.display()),
                )?;
            }
        }

        ignore_missing(fs::rename(&self.path, self.rotated_path(1)))
            .with_context(|| format!("Failed to rotate log: {}", self.path.display()))?;

        Ok(())
    }
}

/// A file that is already gone was rotated by someone else
fn ignore_missing(result: io::Result<()>) -> io::Result<()> {
    match result {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}
