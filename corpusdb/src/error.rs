use thiserror::Error;

/// Failures surfaced by the storage collaborator.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage backend error: {0}")]
    Backend(#[from] sled::Error),

    #[error("row encoding error: {0}")]
    Codec(String),

    #[error("constraint violation: {0}")]
    Constraint(String),
}

impl From<bincode::Error> for StorageError {
    fn from(err: bincode::Error) -> Self {
        StorageError::Codec(err.to_string())
    }
}

/// Errors reported by index operations.
///
/// `CategoryNotFound` is a recoverable validation outcome callers are
/// expected to branch on; everything from the storage layer passes through
/// unchanged as `Storage`.
#[derive(Debug, Error)]
pub enum Error {
    #[error("category not found: {0}")]
    CategoryNotFound(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type Result<T> = std::result::Result<T, Error>;
