use std::{sync::Arc, time::Duration};

use tracing::{debug, info};
use uuid::Uuid;

use super::error::ReclaimResult;
use crate::{
    config::ObjectDeletionConfig,
    db::BucketRepo,
    metabase::{BucketLocation, DeleteAllBucketObjects, ObjectStore},
    observability::metrics,
};

/// Buckets fetched per listing call.
const BUCKET_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReclaimOutcome {
    /// Every bucket was emptied.
    Deleted { objects: u64 },
    /// At least one bucket has object lock enabled. Nothing was deleted.
    RetentionVeto { locked_buckets: u64 },
}

/// Empties every bucket of a project.
///
/// All or nothing with respect to object lock: a single locked bucket vetoes the
/// whole project. A failed bucket stops the project and is returned; buckets
/// already emptied stay empty, which a later run treats as zero objects.
#[derive(Clone)]
pub struct BucketObjectReclaimer {
    buckets: Arc<dyn BucketRepo>,
    objects: Arc<dyn ObjectStore>,
    batch_size: usize,
    staleness: Duration,
    max_commit_delay: Duration,
}

impl BucketObjectReclaimer {
    pub fn new(
        buckets: Arc<dyn BucketRepo>,
        objects: Arc<dyn ObjectStore>,
        config: &ObjectDeletionConfig,
    ) -> Self {
        Self {
            buckets,
            objects,
            batch_size: config.batch_size,
            staleness: config.max_staleness(),
            max_commit_delay: config.max_commit_delay(),
        }
    }

    /// Number of the project's buckets under object lock.
    pub async fn locked_buckets(&self, project_id: Uuid) -> ReclaimResult<u64> {
        Ok(self.buckets.count_object_lock_buckets(project_id).await?)
    }

    pub async fn reclaim(&self, task: &'static str, project_id: Uuid) -> ReclaimResult<ReclaimOutcome> {
        let locked_buckets = self.locked_buckets(project_id).await?;
        if locked_buckets > 0 {
            info!(
                task,
                %project_id,
                locked_buckets,
                "Project has buckets with object lock enabled; skipping"
            );
            return Ok(ReclaimOutcome::RetentionVeto { locked_buckets });
        }

        let mut total = 0;
        let mut after: Option<String> = None;
        loop {
            let page = self
                .buckets
                .list_by_project(project_id, after.as_deref(), BUCKET_PAGE_SIZE)
                .await?;

            for bucket in &page.buckets {
                let deleted = self
                    .objects
                    .delete_all_bucket_objects(DeleteAllBucketObjects {
                        bucket: BucketLocation {
                            project_id,
                            bucket_name: bucket.name.clone(),
                        },
                        batch_size: self.batch_size,
                        staleness: self.staleness,
                        max_commit_delay: self.max_commit_delay,
                    })
                    .await?;

                debug!(task, %project_id, bucket = %bucket.name, deleted, "Emptied bucket");
                metrics::record_objects_deleted(task, deleted);
                total += deleted;
            }

            after = page.buckets.last().map(|b| b.name.clone());
            if !page.more || after.is_none() {
                break;
            }
        }

        Ok(ReclaimOutcome::Deleted { objects: total })
    }
}

#[cfg(all(test, feature = "database-sqlite"))]
mod tests {
    use super::*;
    use crate::{
        db::{DbPool, tests::harness::create_test_db},
        metabase::{ObjectEntry, SqliteObjectStore},
        models::{CreateBucket, CreateProject, CreateUser},
    };

    async fn project_with_buckets(db: &DbPool, buckets: &[(&str, bool)]) -> Uuid {
        let user = db
            .users()
            .create(CreateUser {
                email: format!("{}@example.com", Uuid::new_v4()),
                full_name: "Owner".into(),
                short_name: None,
                external_id: None,
            })
            .await
            .unwrap();
        let project = db
            .projects()
            .create(CreateProject {
                owner_id: user.id,
                name: "p".into(),
            })
            .await
            .unwrap();
        for (name, object_lock_enabled) in buckets {
            db.buckets()
                .create(CreateBucket {
                    project_id: project.id,
                    name: name.to_string(),
                    object_lock_enabled: *object_lock_enabled,
                })
                .await
                .unwrap();
        }
        project.id
    }

    async fn put_objects(store: &SqliteObjectStore, project_id: Uuid, bucket: &str, n: usize) {
        for i in 0..n {
            store
                .put_object(ObjectEntry {
                    bucket: BucketLocation {
                        project_id,
                        bucket_name: bucket.into(),
                    },
                    object_key: format!("key-{}", i),
                    version: 1,
                    size: 10,
                })
                .await
                .unwrap();
        }
    }

    fn store_for(db: &DbPool) -> Arc<SqliteObjectStore> {
        match db.pool() {
            crate::db::DbPoolRef::Sqlite(pool) => Arc::new(SqliteObjectStore::new(pool.clone())),
        }
    }

    fn location(project_id: Uuid, bucket: &str) -> BucketLocation {
        BucketLocation {
            project_id,
            bucket_name: bucket.into(),
        }
    }

    #[tokio::test]
    async fn test_empties_every_bucket() {
        let (db, _clock) = create_test_db().await;
        let store = store_for(&db);
        let project_id = project_with_buckets(&db, &[("b1", false), ("b2", false)]).await;
        put_objects(&store, project_id, "b1", 7).await;
        put_objects(&store, project_id, "b2", 3).await;

        let reclaimer = BucketObjectReclaimer::new(
            db.buckets(),
            store.clone(),
            &ObjectDeletionConfig {
                batch_size: 2,
                max_staleness_secs: 0,
                max_commit_delay_ms: 0,
            },
        );

        let outcome = reclaimer.reclaim("test", project_id).await.unwrap();
        assert_eq!(outcome, ReclaimOutcome::Deleted { objects: 10 });
        assert_eq!(store.count_bucket_objects(&location(project_id, "b1")).await.unwrap(), 0);
        assert_eq!(store.count_bucket_objects(&location(project_id, "b2")).await.unwrap(), 0);

        // Already empty
        let outcome = reclaimer.reclaim("test", project_id).await.unwrap();
        assert_eq!(outcome, ReclaimOutcome::Deleted { objects: 0 });
    }

    #[tokio::test]
    async fn test_single_locked_bucket_vetoes_project() {
        let (db, _clock) = create_test_db().await;
        let store = store_for(&db);
        let project_id = project_with_buckets(&db, &[("open", false), ("locked", true)]).await;
        put_objects(&store, project_id, "open", 4).await;
        put_objects(&store, project_id, "locked", 2).await;

        let reclaimer =
            BucketObjectReclaimer::new(db.buckets(), store.clone(), &ObjectDeletionConfig::default());

        let outcome = reclaimer.reclaim("test", project_id).await.unwrap();
        assert_eq!(outcome, ReclaimOutcome::RetentionVeto { locked_buckets: 1 });
        assert_eq!(store.count_bucket_objects(&location(project_id, "open")).await.unwrap(), 4);
        assert_eq!(store.count_bucket_objects(&location(project_id, "locked")).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_project_without_buckets() {
        let (db, _clock) = create_test_db().await;
        let store = store_for(&db);
        let project_id = project_with_buckets(&db, &[]).await;

        let reclaimer =
            BucketObjectReclaimer::new(db.buckets(), store, &ObjectDeletionConfig::default());
        let outcome = reclaimer.reclaim("test", project_id).await.unwrap();
        assert_eq!(outcome, ReclaimOutcome::Deleted { objects: 0 });
    }
}
