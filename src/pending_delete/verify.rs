use std::sync::Arc;

use uuid::Uuid;

use crate::{
    db::{DbResult, ProjectRepo, UserRepo},
    models::{ProjectStatus, UserStatus},
};

/// Re-reads a candidate's status right before it is acted on.
///
/// Listing and processing are not atomic; this check is what keeps a project or
/// account that was restored in between from being reclaimed. A record that no
/// longer exists is not eligible.
#[derive(Clone)]
pub struct StatusVerifier {
    projects: Arc<dyn ProjectRepo>,
    users: Arc<dyn UserRepo>,
}

impl StatusVerifier {
    pub fn new(projects: Arc<dyn ProjectRepo>, users: Arc<dyn UserRepo>) -> Self {
        Self { projects, users }
    }

    pub async fn project_pending_deletion(&self, project_id: Uuid) -> DbResult<bool> {
        Ok(self
            .projects
            .get_by_id(project_id)
            .await?
            .is_some_and(|p| p.status == ProjectStatus::PendingDeletion))
    }

    pub async fn user_pending_deletion(&self, user_id: Uuid) -> DbResult<bool> {
        Ok(self
            .users
            .get_by_id(user_id)
            .await?
            .is_some_and(|u| u.status == UserStatus::PendingDeletion))
    }
}
