use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to encode {}", .path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_cbor::Error,
    },

    #[error("Failed to decode {}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_cbor::Error,
    },

    #[error("FileNotFoundError: {name} cannot be found.")]
    MissingFile { name: String },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }

    /// Builds the user-facing "not found" error for a record file
    pub fn missing(name: impl Into<String>) -> Self {
        StoreError::MissingFile { name: name.into() }
    }

    /// Returns true for filesystem failures (open, create, stat, rename)
    pub fn is_io(&self) -> bool {
        matches!(self, StoreError::Io { .. })
    }

    /// Returns true when the stored bytes could not be turned back into a value
    pub fn is_decode(&self) -> bool {
        matches!(self, StoreError::Decode { .. })
    }

    /// Returns the underlying I/O error kind, if this is an I/O failure
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            StoreError::Io { source, .. } => Some(source.kind()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_message() {
        let err = StoreError::missing("credentials.cbor");
        assert_eq!(
            err.to_string(),
            "FileNotFoundError: credentials.cbor cannot be found."
        );
        assert!(!err.is_io());
    }

    #[test]
    fn io_kind_is_exposed() {
        let err = StoreError::io("/nope", io::Error::from(io::ErrorKind::NotFound));
        assert!(err.is_io());
        assert_eq!(err.io_kind(), Some(io::ErrorKind::NotFound));
        assert!(err.to_string().contains("/nope"));
    }
}
