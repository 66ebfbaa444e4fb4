use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{Sqlite, Transaction};
use uuid::Uuid;

use super::users::{build_user_update, map_email_conflict};
use crate::{
    clock::Clock,
    db::{
        error::{DbError, DbResult},
        repos::ConsoleTx,
    },
    models::{FreezeEventType, ProjectStatus, UpdateUser},
};

/// [`ConsoleTx`] over a SQLite transaction. Rolled back on drop unless committed.
pub struct SqliteConsoleTx {
    tx: Transaction<'static, Sqlite>,
    clock: Arc<dyn Clock>,
}

impl SqliteConsoleTx {
    pub fn new(tx: Transaction<'static, Sqlite>, clock: Arc<dyn Clock>) -> Self {
        Self { tx, clock }
    }
}

#[async_trait]
impl ConsoleTx for SqliteConsoleTx {
    async fn delete_api_keys_by_project(&mut self, project_id: Uuid) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM api_keys WHERE project_id = ?")
            .bind(project_id.to_string())
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected())
    }

    async fn delete_entitlements_by_scope(&mut self, scope: &str) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM entitlements WHERE scope = ?")
            .bind(scope)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected())
    }

    async fn delete_domains_by_project(&mut self, project_id: Uuid) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM domains WHERE project_id = ?")
            .bind(project_id.to_string())
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected())
    }

    async fn update_project_status(
        &mut self,
        project_id: Uuid,
        status: ProjectStatus,
    ) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE projects
            SET status = ?, status_updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(status.as_i64())
        .bind(self.clock.now())
        .bind(project_id.to_string())
        .execute(&mut *self.tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }

        Ok(())
    }

    async fn delete_sessions_by_user(&mut self, user_id: Uuid) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM webapp_sessions WHERE user_id = ?")
            .bind(user_id.to_string())
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected())
    }

    async fn update_user(&mut self, user_id: Uuid, input: UpdateUser) -> DbResult<()> {
        let Some(mut query) = build_user_update(user_id, input, self.clock.now()) else {
            return Ok(());
        };

        let result = query
            .build()
            .execute(&mut *self.tx)
            .await
            .map_err(map_email_conflict)?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }

        Ok(())
    }

    async fn delete_freeze_event(
        &mut self,
        user_id: Uuid,
        event_type: FreezeEventType,
    ) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM account_freeze_events WHERE user_id = ? AND event = ?")
            .bind(user_id.to_string())
            .bind(event_type.as_i64())
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected())
    }

    async fn commit(self: Box<Self>) -> DbResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
