use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    db::error::DbResult,
    models::{Bucket, BucketPage, CreateBucket},
};

#[async_trait]
pub trait BucketRepo: Send + Sync {
    async fn create(&self, input: CreateBucket) -> DbResult<Bucket>;
    /// Buckets of a project ordered by name, starting after `after`.
    async fn list_by_project(
        &self,
        project_id: Uuid,
        after: Option<&str>,
        limit: usize,
    ) -> DbResult<BucketPage>;
    async fn count_object_lock_buckets(&self, project_id: Uuid) -> DbResult<u64>;
}
