use thiserror::Error;

/// Main error type for mir2graph
#[derive(Error, Debug)]
pub enum Mir2GraphError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Neither the cached feed file nor the remote source produced data
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    /// Uniqueness violation while committing a populate batch
    #[error("Conflicting entity: {0}")]
    ConflictingEntity(String),
}

/// Convenient Result type using Mir2GraphError
pub type Result<T> = std::result::Result<T, Mir2GraphError>;
