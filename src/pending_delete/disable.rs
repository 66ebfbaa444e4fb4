use std::sync::Arc;

use tracing::{debug, warn};

use super::error::ReclaimResult;
use crate::{
    db::DbPool,
    models::{ProjectCandidate, ProjectStatus, project_entitlement_scope},
};

/// Deprovisions a project's console records and marks it Disabled, in one transaction.
///
/// API key removal and the status change must succeed. Entitlements and custom
/// domains are removed on a best-effort basis; a leftover row is logged and the
/// transaction carries on.
#[derive(Clone)]
pub struct ProjectDisabler {
    db: Arc<DbPool>,
}

impl ProjectDisabler {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    pub async fn disable(&self, task: &'static str, project: &ProjectCandidate) -> ReclaimResult<()> {
        let project_id = project.id;
        let mut tx = self.db.begin().await?;

        let api_keys = tx.delete_api_keys_by_project(project_id).await?;

        let scope = project_entitlement_scope(project.public_id);
        if let Err(e) = tx.delete_entitlements_by_scope(&scope).await {
            warn!(task, %project_id, error = %e, "Failed to delete project entitlements");
        }

        if let Err(e) = tx.delete_domains_by_project(project_id).await {
            warn!(task, %project_id, error = %e, "Failed to delete project domains");
        }

        tx.update_project_status(project_id, ProjectStatus::Disabled)
            .await?;
        tx.commit().await?;

        debug!(task, %project_id, api_keys, "Project disabled");
        Ok(())
    }
}
