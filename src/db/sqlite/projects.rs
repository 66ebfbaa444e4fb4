use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};
use uuid::Uuid;

use super::common::{parse_project_status, parse_uuid, to_sql_int};
use crate::{
    clock::Clock,
    db::{
        error::{DbError, DbResult},
        repos::{Page, ProjectRepo},
    },
    models::{CreateProject, Project, ProjectCandidate, ProjectStatus},
};

pub struct SqliteProjectRepo {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
}

impl SqliteProjectRepo {
    pub fn new(pool: SqlitePool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }

    fn project_from_row(row: &SqliteRow) -> DbResult<Project> {
        Ok(Project {
            id: parse_uuid(&row.get::<String, _>("id"))?,
            public_id: parse_uuid(&row.get::<String, _>("public_id"))?,
            owner_id: parse_uuid(&row.get::<String, _>("owner_id"))?,
            name: row.get("name"),
            status: parse_project_status(row.get("status"))?,
            status_updated_at: row.get("status_updated_at"),
            created_at: row.get("created_at"),
        })
    }
}

#[async_trait]
impl ProjectRepo for SqliteProjectRepo {
    async fn create(&self, input: CreateProject) -> DbResult<Project> {
        if input.name.trim().is_empty() {
            return Err(DbError::Validation("Project name cannot be empty".into()));
        }

        let id = Uuid::new_v4();
        let public_id = Uuid::new_v4();
        let now = self.clock.now();

        sqlx::query(
            r#"
            INSERT INTO projects (id, public_id, owner_id, name, status, status_updated_at, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(public_id.to_string())
        .bind(input.owner_id.to_string())
        .bind(&input.name)
        .bind(ProjectStatus::Active.as_i64())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                DbError::Conflict(format!("Project with id '{}' already exists", id))
            }
            _ => DbError::from(e),
        })?;

        Ok(Project {
            id,
            public_id,
            owner_id: input.owner_id,
            name: input.name,
            status: ProjectStatus::Active,
            status_updated_at: Some(now),
            created_at: now,
        })
    }

    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<Project>> {
        let row = sqlx::query(
            r#"
            SELECT id, public_id, owner_id, name, status, status_updated_at, created_at
            FROM projects
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::project_from_row).transpose()
    }

    async fn update_status(&self, id: Uuid, status: ProjectStatus) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE projects
            SET status = ?, status_updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(status.as_i64())
        .bind(self.clock.now())
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }

        Ok(())
    }

    async fn list_pending_deletion_before(
        &self,
        before: DateTime<Utc>,
        offset: usize,
        limit: usize,
    ) -> DbResult<Page<ProjectCandidate>> {
        let fetch_limit = to_sql_int(limit.saturating_add(1));

        let rows = sqlx::query(
            r#"
            SELECT id, public_id, owner_id
            FROM projects
            WHERE status = ? AND status_updated_at <= ?
            ORDER BY status_updated_at ASC, id ASC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(ProjectStatus::PendingDeletion.as_i64())
        .bind(before)
        .bind(fetch_limit)
        .bind(to_sql_int(offset))
        .fetch_all(&self.pool)
        .await?;

        let has_more = rows.len() > limit;
        let items = rows
            .into_iter()
            .take(limit)
            .map(|row| {
                Ok(ProjectCandidate {
                    id: parse_uuid(&row.get::<String, _>("id"))?,
                    public_id: parse_uuid(&row.get::<String, _>("public_id"))?,
                    owner_id: parse_uuid(&row.get::<String, _>("owner_id"))?,
                })
            })
            .collect::<DbResult<Vec<_>>>()?;

        Ok(Page { items, has_more })
    }

    async fn list_active_by_owner(&self, owner_id: Uuid) -> DbResult<Vec<Project>> {
        let rows = sqlx::query(
            r#"
            SELECT id, public_id, owner_id, name, status, status_updated_at, created_at
            FROM projects
            WHERE owner_id = ? AND status != ?
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(owner_id.to_string())
        .bind(ProjectStatus::Disabled.as_i64())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::project_from_row).collect()
    }
}
