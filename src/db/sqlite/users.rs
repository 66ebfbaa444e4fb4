use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool, sqlite::SqliteRow};
use uuid::Uuid;

use super::common::{parse_user_status, parse_uuid, to_sql_int};
use crate::{
    clock::Clock,
    db::{
        error::{DbError, DbResult},
        repos::{Page, UserRepo},
    },
    models::{CreateUser, PendingUser, UpdateUser, User, UserStatus},
};

pub struct SqliteUserRepo {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
}

impl SqliteUserRepo {
    pub fn new(pool: SqlitePool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }

    fn user_from_row(row: &SqliteRow) -> DbResult<User> {
        Ok(User {
            id: parse_uuid(&row.get::<String, _>("id"))?,
            email: row.get("email"),
            full_name: row.get("full_name"),
            short_name: row.get("short_name"),
            status: parse_user_status(row.get("status"))?,
            status_updated_at: row.get("status_updated_at"),
            external_id: row.get("external_id"),
            email_change_verification_step: row.get("email_change_verification_step"),
            created_at: row.get("created_at"),
        })
    }
}

/// Build the UPDATE for a partial user change. Returns `None` when nothing changes.
///
/// A status change also stamps `status_updated_at` with `now`.
pub(super) fn build_user_update(
    id: Uuid,
    input: UpdateUser,
    now: DateTime<Utc>,
) -> Option<QueryBuilder<'static, Sqlite>> {
    if input.is_empty() {
        return None;
    }

    let mut query = QueryBuilder::new("UPDATE users SET ");
    {
        let mut set = query.separated(", ");
        if let Some(full_name) = input.full_name {
            set.push("full_name = ").push_bind_unseparated(full_name);
        }
        if let Some(short_name) = input.short_name {
            set.push("short_name = ").push_bind_unseparated(short_name);
        }
        if let Some(email) = input.email {
            set.push("email = ").push_bind_unseparated(email);
        }
        if let Some(status) = input.status {
            set.push("status = ").push_bind_unseparated(status.as_i64());
            set.push("status_updated_at = ").push_bind_unseparated(now);
        }
        if let Some(external_id) = input.external_id {
            set.push("external_id = ").push_bind_unseparated(external_id);
        }
        if let Some(step) = input.email_change_verification_step {
            set.push("email_change_verification_step = ")
                .push_bind_unseparated(step);
        }
    }
    query.push(" WHERE id = ").push_bind(id.to_string());

    Some(query)
}

pub(super) fn map_email_conflict(e: sqlx::Error) -> DbError {
    match e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            DbError::Conflict("User with this email already exists".into())
        }
        _ => DbError::from(e),
    }
}

#[async_trait]
impl UserRepo for SqliteUserRepo {
    async fn create(&self, input: CreateUser) -> DbResult<User> {
        if input.email.trim().is_empty() {
            return Err(DbError::Validation("User email cannot be empty".into()));
        }

        let id = Uuid::new_v4();
        let now = self.clock.now();

        sqlx::query(
            r#"
            INSERT INTO users (
                id, email, full_name, short_name, status, status_updated_at,
                external_id, email_change_verification_step, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, 0, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(&input.email)
        .bind(&input.full_name)
        .bind(&input.short_name)
        .bind(UserStatus::Active.as_i64())
        .bind(now)
        .bind(&input.external_id)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(map_email_conflict)?;

        Ok(User {
            id,
            email: input.email,
            full_name: input.full_name,
            short_name: input.short_name,
            status: UserStatus::Active,
            status_updated_at: Some(now),
            external_id: input.external_id,
            email_change_verification_step: 0,
            created_at: now,
        })
    }

    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, email, full_name, short_name, status, status_updated_at,
                   external_id, email_change_verification_step, created_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::user_from_row).transpose()
    }

    async fn update(&self, id: Uuid, input: UpdateUser) -> DbResult<User> {
        if let Some(mut query) = build_user_update(id, input, self.clock.now()) {
            let result = query
                .build()
                .execute(&self.pool)
                .await
                .map_err(map_email_conflict)?;

            if result.rows_affected() == 0 {
                return Err(DbError::NotFound);
            }
        }

        self.get_by_id(id).await?.ok_or(DbError::NotFound)
    }

    async fn update_status(&self, id: Uuid, status: UserStatus) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
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
        after: Option<&PendingUser>,
        limit: usize,
    ) -> DbResult<Page<PendingUser>> {
        let fetch_limit = to_sql_int(limit.saturating_add(1));
        let cursor_filter = if after.is_some() {
            "AND (u.status_updated_at, u.id) > (?, ?)"
        } else {
            ""
        };

        let query = format!(
            r#"
            SELECT u.id, u.status_updated_at
            FROM users u
            WHERE u.status = ? AND u.status_updated_at <= ?
            {}
            AND NOT EXISTS (
                SELECT 1 FROM account_freeze_events f WHERE f.user_id = u.id
            )
            ORDER BY u.status_updated_at ASC, u.id ASC
            LIMIT ?
            "#,
            cursor_filter
        );

        let mut q = sqlx::query(&query)
            .bind(UserStatus::PendingDeletion.as_i64())
            .bind(before);
        if let Some(cursor) = after {
            q = q.bind(cursor.status_updated_at).bind(cursor.id.to_string());
        }
        let rows = q.bind(fetch_limit).fetch_all(&self.pool).await?;

        let has_more = rows.len() > limit;
        let items = rows
            .into_iter()
            .take(limit)
            .map(|row| {
                Ok(PendingUser {
                    id: parse_uuid(&row.get::<String, _>("id"))?,
                    status_updated_at: row.get("status_updated_at"),
                })
            })
            .collect::<DbResult<Vec<_>>>()?;

        Ok(Page { items, has_more })
    }
}
