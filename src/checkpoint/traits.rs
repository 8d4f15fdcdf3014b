//! Checkpoint store trait and error types

use crate::checkpoint::ResultSet;
use thiserror::Error;

/// Errors that can occur while reading or writing a checkpoint
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unexpected checkpoint structure: {0}")]
    Structure(String),
}

/// Result type for checkpoint operations
pub type CheckpointResult<T> = Result<T, CheckpointError>;

/// Durable storage for the results of completed targets
///
/// Implementations must make `save` atomic: a reader sees either the previous
/// complete snapshot or the new one, never a partial write.
pub trait CheckpointStore: Send + Sync {
    /// Loads the last snapshot
    ///
    /// A missing or unreadable snapshot is not an error; it yields an empty set.
    fn load(&self) -> ResultSet;

    /// Replaces the snapshot with `results`
    fn save(&self, results: &ResultSet) -> CheckpointResult<()>;
}
