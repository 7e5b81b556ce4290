use std::path::PathBuf;

use thiserror::Error;

/// Failures reading or writing the persisted leaderboard document.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode leaderboard: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("store lock was poisoned")]
    LockPoisoned,
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}
