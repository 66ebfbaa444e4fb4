use thiserror::Error;

/// Errors from the console and metainfo repositories.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Console database not configured")]
    NotConfigured,

    /// The row a write targeted no longer exists.
    #[error("Record not found")]
    NotFound,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid record: {0}")]
    Validation(String),

    #[cfg(feature = "database-sqlite")]
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[cfg(feature = "database-sqlite")]
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Entitlement feature sets are stored as JSON text.
    #[error("Entitlement encoding error: {0}")]
    Json(#[from] serde_json::Error),

    /// A stored value could not be mapped back to a model, e.g. an unknown status code.
    #[error("Corrupt row: {0}")]
    Internal(String),
}

pub type DbResult<T> = Result<T, DbError>;
