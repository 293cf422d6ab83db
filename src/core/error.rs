use rusqlite;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChatshiftError {
    #[error("SQLite error: {0}")]
    RusqliteError(#[from] rusqlite::Error),
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Session not found: {0}")]
    RecordNotFound(String),
    #[error("No workspace store is associated with destination path: {0}")]
    DestinationNotFound(String),
    #[error("Source and destination are the same workspace: {0}")]
    SameLocation(String),
    #[error("Store is locked by another process: {0}")]
    DatabaseLocked(String),
    #[error("Permission denied opening store: {0}")]
    PermissionDenied(String),
    #[error("No sessions found in source workspace: {0}")]
    NoRecordsFound(String),
    #[error("Destination workspace already contains sessions: {0}")]
    DestinationNotEmpty(String),
    #[error("Migration failed: {0}")]
    MigrationFailed(String),
}

impl ChatshiftError {
    /// Stable machine-readable code, used in JSON envelopes and per-record
    /// migration results.
    pub fn code(&self) -> &'static str {
        match self {
            ChatshiftError::RecordNotFound(_) => "RECORD_NOT_FOUND",
            ChatshiftError::DestinationNotFound(_) => "DESTINATION_NOT_FOUND",
            ChatshiftError::SameLocation(_) => "SAME_LOCATION",
            ChatshiftError::DatabaseLocked(_) => "DATABASE_LOCKED",
            ChatshiftError::PermissionDenied(_) => "PERMISSION_DENIED",
            ChatshiftError::NoRecordsFound(_) => "NO_RECORDS_FOUND",
            ChatshiftError::DestinationNotEmpty(_) => "DESTINATION_NOT_EMPTY",
            ChatshiftError::MigrationFailed(_) => "MIGRATION_FAILED",
            ChatshiftError::InvalidInput(_) => "INVALID_INPUT",
            ChatshiftError::RusqliteError(_) => "SQLITE_ERROR",
            ChatshiftError::IoError(_) => "IO_ERROR",
            ChatshiftError::JsonError(_) => "JSON_ERROR",
        }
    }

    /// Errors raised before any store mutation. Safe to retry after
    /// correcting the input; mutation-phase errors are not.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ChatshiftError::RecordNotFound(_)
                | ChatshiftError::DestinationNotFound(_)
                | ChatshiftError::SameLocation(_)
                | ChatshiftError::NoRecordsFound(_)
                | ChatshiftError::DestinationNotEmpty(_)
                | ChatshiftError::InvalidInput(_)
        )
    }
}
