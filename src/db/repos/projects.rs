use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::Page;
use crate::{
    db::error::DbResult,
    models::{CreateProject, Project, ProjectCandidate, ProjectStatus},
};

#[async_trait]
pub trait ProjectRepo: Send + Sync {
    async fn create(&self, input: CreateProject) -> DbResult<Project>;
    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<Project>>;
    /// Set the status and stamp `status_updated_at` with the current time.
    async fn update_status(&self, id: Uuid, status: ProjectStatus) -> DbResult<()>;
    /// Projects pending deletion since at or before `before`, oldest mark first.
    ///
    /// `offset` skips that many matching rows. Callers pass the number of
    /// candidates they left in place so far, since processed ones drop out.
    async fn list_pending_deletion_before(
        &self,
        before: DateTime<Utc>,
        offset: usize,
        limit: usize,
    ) -> DbResult<Page<ProjectCandidate>>;
    /// Owned projects that are not disabled.
    async fn list_active_by_owner(&self, owner_id: Uuid) -> DbResult<Vec<Project>>;
}
