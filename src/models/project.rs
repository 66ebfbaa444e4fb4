use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Disabled,
    Active,
    PendingDeletion,
}

impl ProjectStatus {
    pub fn as_i64(self) -> i64 {
        match self {
            ProjectStatus::Disabled => 0,
            ProjectStatus::Active => 1,
            ProjectStatus::PendingDeletion => 2,
        }
    }

    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            0 => Some(ProjectStatus::Disabled),
            1 => Some(ProjectStatus::Active),
            2 => Some(ProjectStatus::PendingDeletion),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    /// Externally visible identifier; entitlements are scoped by it.
    pub public_id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub status: ProjectStatus,
    pub status_updated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateProject {
    pub owner_id: Uuid,
    pub name: String,
}

/// Identifiers of a project that is due for deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectCandidate {
    pub id: Uuid,
    pub public_id: Uuid,
    pub owner_id: Uuid,
}

impl From<&Project> for ProjectCandidate {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id,
            public_id: project.public_id,
            owner_id: project.owner_id,
        }
    }
}

/// Entitlement scope key for a project.
pub fn project_entitlement_scope(public_id: Uuid) -> String {
    format!("proj_pub_id:{}", public_id)
}
