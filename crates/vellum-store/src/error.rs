use thiserror::Error;

/// Errors produced by the store layer.
///
/// Absence of a record is not an error: lookups and targeted writes return
/// `Option`/`bool` so callers can map it to their own not-found signal.
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite error.
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Failed to determine a platform data directory.
    #[error("Could not determine application data directory")]
    NoDataDir,

    /// Generic I/O error (e.g. creating the database directory).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A row written inside the current transaction could not be read back.
    #[error("Record not found")]
    NotFound,

    /// Migration failure.
    #[error("Migration error: {0}")]
    Migration(String),

    /// The requested status name is not in `asset_status_lookup`.
    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    /// The requested comment type is not in `comment_type_lookup` and the
    /// active policy rejects unknown types.
    #[error("Unknown comment type: {0}")]
    UnknownCommentType(String),

    /// Seeded reference data the workflow depends on is missing.
    #[error("Missing lookup entry: {0}")]
    MissingLookup(String),
}

impl StoreError {
    /// True when SQLite refused the write because of a constraint, typically
    /// a foreign key pointing at a user that does not exist.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            StoreError::Sqlite(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation
        )
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
