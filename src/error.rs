use rusqlite::Error as RusqliteError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MigrateError {
    #[error("Store unavailable at '{}': {source}", .path.display())]
    StoreUnavailable {
        path: PathBuf,
        #[source]
        source: RusqliteError,
    },

    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("Constraint violation: record (guild_id={guild_id}, user_id={user_id}) already exists in the destination")]
    ConstraintViolation { guild_id: String, user_id: String },

    #[error("Migration validation failed: expected {expected} inserted rows, found {actual}")]
    ValidationFailed { expected: usize, actual: i64 },

    #[error("Database error: {0}")]
    DatabaseError(#[from] RusqliteError), // Converts rusqlite::Error automatically

    #[error("Logger error: {0}")]
    LoggerError(#[from] flexi_logger::FlexiLoggerError),
}
