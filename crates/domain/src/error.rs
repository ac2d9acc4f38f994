//! Domain error types.

use storage::StorageError;
use thiserror::Error;

/// Errors that can occur during domain operations.
///
/// State transitions themselves are total; the only failure is writing the
/// resulting snapshot.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An error occurred in the storage backend.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
