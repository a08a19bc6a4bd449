//! Error types for the document store.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading, writing or renaming the backing file failed.
    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backing file exists but is not a valid document.
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Another process held the lock for longer than the configured timeout.
    #[error("timed out after {waited:?} waiting for lock {}", .path.display())]
    LockTimeout { path: PathBuf, waited: Duration },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}
