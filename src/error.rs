// Error types for the task store

use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced by the fallible (`try_*`) store operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing database could not be opened or its schema created
    #[error("storage unavailable at {}: {source}", .path.display())]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: Box<StoreError>,
    },

    /// The store was never opened successfully or has been shut down
    #[error("store is closed")]
    Closed,

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub(crate) fn unavailable(path: impl Into<PathBuf>, source: impl Into<StoreError>) -> Self {
        StoreError::StorageUnavailable {
            path: path.into(),
            source: Box::new(source.into()),
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
