//! Object metadata storage.
//!
//! The chore only needs one bulk operation from the object store: remove every
//! object in a bucket. It is expressed as a trait so the chore can run against
//! any metadata backend and so tests can inject failures.

#[cfg(feature = "database-sqlite")]
mod sqlite;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

#[cfg(feature = "database-sqlite")]
pub use sqlite::SqliteObjectStore;

/// Errors that can occur during object metadata operations.
#[derive(Debug, Error)]
pub enum MetabaseError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(feature = "database-sqlite")]
impl From<sqlx::Error> for MetabaseError {
    fn from(e: sqlx::Error) -> Self {
        MetabaseError::Database(e.to_string())
    }
}

pub type MetabaseResult<T> = Result<T, MetabaseError>;

/// Identifies a bucket within a project.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BucketLocation {
    pub project_id: Uuid,
    pub bucket_name: String,
}

/// Parameters for [`ObjectStore::delete_all_bucket_objects`].
#[derive(Debug, Clone)]
pub struct DeleteAllBucketObjects {
    pub bucket: BucketLocation,
    /// Objects removed per delete statement.
    pub batch_size: usize,
    /// How stale the reads that enumerate objects may be.
    pub staleness: Duration,
    /// Pause between batches, leaving room for concurrent writers.
    pub max_commit_delay: Duration,
}

/// A committed object version.
#[derive(Debug, Clone)]
pub struct ObjectEntry {
    pub bucket: BucketLocation,
    pub object_key: String,
    pub version: i64,
    pub size: i64,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Remove every object in the bucket without coordinating with in-flight uploads.
    ///
    /// Returns the number of objects deleted. An empty bucket yields `Ok(0)`.
    async fn delete_all_bucket_objects(&self, opts: DeleteAllBucketObjects)
    -> MetabaseResult<u64>;
}
