//! Storage-specific error type wrapping IO errors.

use std::path::PathBuf;

use homewatch_domain::error::HomeWatchError;

/// Errors originating from the file storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Reading, writing or renaming a file failed.
    #[error("io error on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<StorageError> for HomeWatchError {
    fn from(err: StorageError) -> Self {
        Self::Storage(Box::new(err))
    }
}
