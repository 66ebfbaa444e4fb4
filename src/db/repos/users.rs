use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::Page;
use crate::{
    db::error::DbResult,
    models::{CreateUser, PendingUser, UpdateUser, User, UserStatus},
};

#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn create(&self, input: CreateUser) -> DbResult<User>;
    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<User>>;
    async fn update(&self, id: Uuid, input: UpdateUser) -> DbResult<User>;
    /// Set the status and stamp `status_updated_at` with the current time.
    async fn update_status(&self, id: Uuid, status: UserStatus) -> DbResult<()>;
    /// Users pending deletion since at or before `before` that carry no freeze
    /// events, ordered by (status_updated_at, id) and starting after `after`.
    async fn list_pending_deletion_before(
        &self,
        before: DateTime<Utc>,
        after: Option<&PendingUser>,
        limit: usize,
    ) -> DbResult<Page<PendingUser>>;
}
