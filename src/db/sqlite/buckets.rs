use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::common::{parse_uuid, to_sql_int};
use crate::{
    clock::Clock,
    db::{
        error::{DbError, DbResult},
        repos::BucketRepo,
    },
    models::{Bucket, BucketPage, CreateBucket},
};

pub struct SqliteBucketRepo {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
}

impl SqliteBucketRepo {
    pub fn new(pool: SqlitePool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }
}

#[async_trait]
impl BucketRepo for SqliteBucketRepo {
    async fn create(&self, input: CreateBucket) -> DbResult<Bucket> {
        let now = self.clock.now();

        sqlx::query(
            r#"
            INSERT INTO bucket_metainfos (project_id, name, object_lock_enabled, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(input.project_id.to_string())
        .bind(&input.name)
        .bind(input.object_lock_enabled)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                DbError::Conflict(format!("Bucket '{}' already exists in this project", input.name))
            }
            _ => DbError::from(e),
        })?;

        Ok(Bucket {
            project_id: input.project_id,
            name: input.name,
            object_lock_enabled: input.object_lock_enabled,
            created_at: now,
        })
    }

    async fn list_by_project(
        &self,
        project_id: Uuid,
        after: Option<&str>,
        limit: usize,
    ) -> DbResult<BucketPage> {
        let fetch_limit = to_sql_int(limit.saturating_add(1));

        let rows = sqlx::query(
            r#"
            SELECT project_id, name, object_lock_enabled, created_at
            FROM bucket_metainfos
            WHERE project_id = ? AND name > ?
            ORDER BY name ASC
            LIMIT ?
            "#,
        )
        .bind(project_id.to_string())
        .bind(after.unwrap_or(""))
        .bind(fetch_limit)
        .fetch_all(&self.pool)
        .await?;

        let more = rows.len() > limit;
        let buckets = rows
            .into_iter()
            .take(limit)
            .map(|row| {
                Ok(Bucket {
                    project_id: parse_uuid(&row.get::<String, _>("project_id"))?,
                    name: row.get("name"),
                    object_lock_enabled: row.get("object_lock_enabled"),
                    created_at: row.get("created_at"),
                })
            })
            .collect::<DbResult<Vec<_>>>()?;

        Ok(BucketPage { buckets, more })
    }

    async fn count_object_lock_buckets(&self, project_id: Uuid) -> DbResult<u64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM bucket_metainfos
            WHERE project_id = ? AND object_lock_enabled = 1
            "#,
        )
        .bind(project_id.to_string())
        .fetch_one(&self.pool)
        .await?;

        Ok(u64::try_from(count).unwrap_or(0))
    }
}
