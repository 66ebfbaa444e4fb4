use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};
use uuid::Uuid;

use super::common::{parse_freeze_event_type, parse_uuid, to_sql_int};
use crate::{
    clock::Clock,
    db::{
        error::{DbError, DbResult},
        repos::{FreezeEventRepo, Page},
    },
    models::{EscalatedFreeze, FreezeEvent, FreezeEventType, UserStatus},
};

pub struct SqliteFreezeEventRepo {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
}

impl SqliteFreezeEventRepo {
    pub fn new(pool: SqlitePool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }

    fn event_from_row(row: &SqliteRow) -> DbResult<FreezeEvent> {
        Ok(FreezeEvent {
            user_id: parse_uuid(&row.get::<String, _>("user_id"))?,
            event_type: parse_freeze_event_type(row.get("event"))?,
            days_till_escalation: row.get("days_till_escalation"),
            created_at: row.get("created_at"),
        })
    }
}

#[async_trait]
impl FreezeEventRepo for SqliteFreezeEventRepo {
    async fn upsert(
        &self,
        user_id: Uuid,
        event_type: FreezeEventType,
        days_till_escalation: Option<i64>,
    ) -> DbResult<FreezeEvent> {
        let now = self.clock.now();

        sqlx::query(
            r#"
            INSERT INTO account_freeze_events (user_id, event, days_till_escalation, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (user_id, event) DO UPDATE SET
                days_till_escalation = excluded.days_till_escalation
            "#,
        )
        .bind(user_id.to_string())
        .bind(event_type.as_i64())
        .bind(days_till_escalation)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get(user_id, event_type)
            .await?
            .ok_or_else(|| DbError::Internal("Freeze event missing after upsert".into()))
    }

    async fn get(
        &self,
        user_id: Uuid,
        event_type: FreezeEventType,
    ) -> DbResult<Option<FreezeEvent>> {
        let row = sqlx::query(
            r#"
            SELECT user_id, event, days_till_escalation, created_at
            FROM account_freeze_events
            WHERE user_id = ? AND event = ?
            "#,
        )
        .bind(user_id.to_string())
        .bind(event_type.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::event_from_row).transpose()
    }

    async fn list_by_user(&self, user_id: Uuid) -> DbResult<Vec<FreezeEvent>> {
        let rows = sqlx::query(
            r#"
            SELECT user_id, event, days_till_escalation, created_at
            FROM account_freeze_events
            WHERE user_id = ?
            ORDER BY event ASC
            "#,
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::event_from_row).collect()
    }

    async fn list_escalated_before(
        &self,
        thresholds: &[(FreezeEventType, DateTime<Utc>)],
        offset: usize,
        limit: usize,
    ) -> DbResult<Page<EscalatedFreeze>> {
        if thresholds.is_empty() || limit == 0 {
            return Ok(Page::empty());
        }

        let per_type = vec!["(f.event = ? AND u.status_updated_at <= ?)"; thresholds.len()].join(" OR ");
        let query = format!(
            r#"
            SELECT f.user_id, f.event
            FROM account_freeze_events f
            JOIN users u ON u.id = f.user_id
            WHERE f.days_till_escalation IS NULL
              AND u.status = ?
              AND ({})
            ORDER BY u.status_updated_at ASC, f.user_id ASC, f.event ASC
            LIMIT ? OFFSET ?
            "#,
            per_type
        );

        let mut q = sqlx::query(&query).bind(UserStatus::PendingDeletion.as_i64());
        for (event_type, before) in thresholds {
            q = q.bind(event_type.as_i64()).bind(*before);
        }
        let rows = q
            .bind(to_sql_int(limit))
            .bind(to_sql_int(offset))
            .fetch_all(&self.pool)
            .await?;

        let has_more = rows.len() >= limit;
        let items = rows
            .iter()
            .map(|row| {
                Ok(EscalatedFreeze {
                    user_id: parse_uuid(&row.get::<String, _>("user_id"))?,
                    event_type: parse_freeze_event_type(row.get("event"))?,
                })
            })
            .collect::<DbResult<Vec<_>>>()?;

        Ok(Page { items, has_more })
    }

    async fn delete_by_user_and_type(
        &self,
        user_id: Uuid,
        event_type: FreezeEventType,
    ) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM account_freeze_events
            WHERE user_id = ? AND event = ?
            "#,
        )
        .bind(user_id.to_string())
        .bind(event_type.as_i64())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }

        Ok(())
    }

    async fn delete_all_by_user(&self, user_id: Uuid) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM account_freeze_events WHERE user_id = ?")
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
