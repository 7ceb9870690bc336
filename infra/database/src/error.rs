/// Errors produced by the database layer.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// Any failure reported by the `SurrealDB` driver.
    #[error("SurrealDB error: {0}")]
    Driver(#[from] surrealdb::Error),

    /// The database never became healthy within the retry budget.
    #[error("Database connection failed: {message}")]
    Unavailable { message: String },

    /// A previously applied migration no longer matches its recorded checksum.
    #[error("Migration checksum mismatch for {version}: recorded {recorded}, computed {computed}")]
    ChecksumMismatch { version: String, recorded: String, computed: String },

    /// Migration bookkeeping errors (missing record, nothing to revert, ...).
    #[error("Migration error: {message}")]
    Migration { message: String },
}
