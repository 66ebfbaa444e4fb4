use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, instrument};

use super::{
    BucketLocation, DeleteAllBucketObjects, MetabaseError, MetabaseResult, ObjectEntry,
    ObjectStore,
};

/// Object metadata kept in the `objects` table.
///
/// SQLite reads are never stale, so `staleness` is accepted but has no effect.
pub struct SqliteObjectStore {
    pool: SqlitePool,
}

impl SqliteObjectStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Record an object version.
    pub async fn put_object(&self, entry: ObjectEntry) -> MetabaseResult<()> {
        sqlx::query(
            r#"
            INSERT INTO objects (project_id, bucket_name, object_key, version, size, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(entry.bucket.project_id.to_string())
        .bind(&entry.bucket.bucket_name)
        .bind(&entry.object_key)
        .bind(entry.version)
        .bind(entry.size)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Number of object versions stored in the bucket.
    pub async fn count_bucket_objects(&self, bucket: &BucketLocation) -> MetabaseResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM objects WHERE project_id = ? AND bucket_name = ?",
        )
        .bind(bucket.project_id.to_string())
        .bind(&bucket.bucket_name)
        .fetch_one(&self.pool)
        .await?;

        u64::try_from(count).map_err(|e| MetabaseError::Internal(e.to_string()))
    }
}

#[async_trait]
impl ObjectStore for SqliteObjectStore {
    #[instrument(skip(self, opts), fields(project_id = %opts.bucket.project_id, bucket = %opts.bucket.bucket_name))]
    async fn delete_all_bucket_objects(
        &self,
        opts: DeleteAllBucketObjects,
    ) -> MetabaseResult<u64> {
        if opts.batch_size == 0 {
            return Err(MetabaseError::InvalidRequest(
                "batch_size must be at least 1".into(),
            ));
        }
        let batch_size = i64::try_from(opts.batch_size).unwrap_or(i64::MAX);

        let mut deleted = 0u64;
        loop {
            let result = sqlx::query(
                r#"
                DELETE FROM objects
                WHERE rowid IN (
                    SELECT rowid FROM objects
                    WHERE project_id = ? AND bucket_name = ?
                    LIMIT ?
                )
                "#,
            )
            .bind(opts.bucket.project_id.to_string())
            .bind(&opts.bucket.bucket_name)
            .bind(batch_size)
            .execute(&self.pool)
            .await?;

            let batch = result.rows_affected();
            deleted += batch;
            debug!(batch, deleted, "Deleted object batch");

            if batch < opts.batch_size as u64 {
                break;
            }
            if !opts.max_commit_delay.is_zero() {
                tokio::time::sleep(opts.max_commit_delay).await;
            }
        }

        Ok(deleted)
    }
}
