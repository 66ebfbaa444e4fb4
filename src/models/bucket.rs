use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bucket {
    pub project_id: Uuid,
    pub name: String,
    /// Retention-enabled buckets veto data reclamation for the whole project.
    pub object_lock_enabled: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBucket {
    pub project_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub object_lock_enabled: bool,
}

/// One page of a project's buckets, ordered by name.
#[derive(Debug, Clone, Default)]
pub struct BucketPage {
    pub buckets: Vec<Bucket>,
    pub more: bool,
}
