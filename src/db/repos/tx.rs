use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    db::error::DbResult,
    models::{FreezeEventType, ProjectStatus, UpdateUser},
};

/// A console transaction.
///
/// Nothing is visible to other connections until [`ConsoleTx::commit`].
/// Dropping the transaction without committing rolls it back.
#[async_trait]
pub trait ConsoleTx: Send {
    async fn delete_api_keys_by_project(&mut self, project_id: Uuid) -> DbResult<u64>;
    async fn delete_entitlements_by_scope(&mut self, scope: &str) -> DbResult<u64>;
    async fn delete_domains_by_project(&mut self, project_id: Uuid) -> DbResult<u64>;
    async fn update_project_status(&mut self, project_id: Uuid, status: ProjectStatus)
    -> DbResult<()>;
    async fn delete_sessions_by_user(&mut self, user_id: Uuid) -> DbResult<u64>;
    async fn update_user(&mut self, user_id: Uuid, input: UpdateUser) -> DbResult<()>;
    async fn delete_freeze_event(
        &mut self,
        user_id: Uuid,
        event_type: FreezeEventType,
    ) -> DbResult<u64>;
    async fn commit(self: Box<Self>) -> DbResult<()>;
}
