//! End-to-end tests for the pending-deletion chore.
//!
//! Each test seeds console records and object metadata in an in-memory SQLite
//! database, moves a manual clock and runs whole ticks through [`Chore`].
//! Failures are injected with small decorators around the object store and the
//! payment provider, or by dropping a table.

use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use async_trait::async_trait;
use chrono::Duration;
use rstest::rstest;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{
    clock::{Clock, ManualClock},
    config::{FlowConfig, ObjectDeletionConfig, PendingDeleteConfig},
    db::{DbPool, DbPoolRef, tests::harness::create_test_db},
    metabase::{
        BucketLocation, DeleteAllBucketObjects, MetabaseError, MetabaseResult, ObjectEntry,
        ObjectStore, SqliteObjectStore,
    },
    models::{
        CreateBucket, CreateDomain, CreateProject, CreateUser, FreezeEventType, Project,
        ProjectStatus, UserStatus, anonymized_email,
    },
    payments::{CreditCards, PaymentsError, PaymentsResult},
    pending_delete::{Chore, ReclaimError},
};

const HOUR: u64 = 3600;

// ─────────────────────────────────────────────────────────────────────────────
// Test doubles
// ─────────────────────────────────────────────────────────────────────────────

/// Payment provider that records calls and can be told to fail.
#[derive(Default)]
struct RecordingCards {
    fail: AtomicBool,
    calls: AtomicUsize,
}

#[async_trait]
impl CreditCards for RecordingCards {
    async fn remove_all(&self, _user_id: Uuid) -> PaymentsResult<u64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(PaymentsError::Api {
                status: 500,
                message: "injected".into(),
            });
        }
        Ok(1)
    }
}

/// Fails bulk deletes for one project.
struct FailingObjects {
    inner: Arc<SqliteObjectStore>,
    fail_project: Uuid,
}

#[async_trait]
impl ObjectStore for FailingObjects {
    async fn delete_all_bucket_objects(
        &self,
        opts: DeleteAllBucketObjects,
    ) -> MetabaseResult<u64> {
        if opts.bucket.project_id == self.fail_project {
            return Err(MetabaseError::Database("injected".into()));
        }
        self.inner.delete_all_bucket_objects(opts).await
    }
}

/// Reactivates another project while emptying the first one's buckets.
struct ReactivatingObjects {
    inner: Arc<SqliteObjectStore>,
    db: Arc<DbPool>,
    trigger: Uuid,
    restore: Uuid,
}

#[async_trait]
impl ObjectStore for ReactivatingObjects {
    async fn delete_all_bucket_objects(
        &self,
        opts: DeleteAllBucketObjects,
    ) -> MetabaseResult<u64> {
        if opts.bucket.project_id == self.trigger {
            self.db
                .projects()
                .update_status(self.restore, ProjectStatus::Active)
                .await
                .map_err(|e| MetabaseError::Internal(e.to_string()))?;
        }
        self.inner.delete_all_bucket_objects(opts).await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Harness
// ─────────────────────────────────────────────────────────────────────────────

struct Harness {
    db: Arc<DbPool>,
    clock: Arc<ManualClock>,
    store: Arc<SqliteObjectStore>,
    cards: Arc<RecordingCards>,
}

impl Harness {
    async fn new() -> Self {
        let (db, clock) = create_test_db().await;
        let DbPoolRef::Sqlite(pool) = db.pool();
        let store = Arc::new(SqliteObjectStore::new(pool.clone()));
        Self {
            db,
            clock,
            store,
            cards: Arc::new(RecordingCards::default()),
        }
    }

    fn chore(&self, config: PendingDeleteConfig) -> Chore {
        self.chore_with_objects(config, self.store.clone())
    }

    fn chore_with_objects(
        &self,
        config: PendingDeleteConfig,
        objects: Arc<dyn ObjectStore>,
    ) -> Chore {
        let chore = Chore::new(config, self.db.clone(), objects, self.cards.clone());
        chore.test_set_clock(self.clock.clone());
        chore
    }

    fn advance(&self, by: Duration) {
        self.clock.advance(by);
    }

    async fn user(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.db
            .users()
            .create(CreateUser {
                email: format!("{}@example.com", id),
                full_name: "Test User".into(),
                short_name: Some("Test".into()),
                external_id: None,
            })
            .await
            .unwrap()
            .id
    }

    async fn project(&self, owner_id: Uuid) -> Project {
        self.db
            .projects()
            .create(CreateProject {
                owner_id,
                name: "project".into(),
            })
            .await
            .unwrap()
    }

    async fn bucket(&self, project_id: Uuid, name: &str, object_lock_enabled: bool, objects: usize) {
        self.db
            .buckets()
            .create(CreateBucket {
                project_id,
                name: name.into(),
                object_lock_enabled,
            })
            .await
            .unwrap();
        for i in 0..objects {
            self.store
                .put_object(ObjectEntry {
                    bucket: BucketLocation {
                        project_id,
                        bucket_name: name.into(),
                    },
                    object_key: format!("object-{}", i),
                    version: 1,
                    size: 64,
                })
                .await
                .unwrap();
        }
    }

    async fn objects(&self, project_id: Uuid, bucket: &str) -> u64 {
        self.store
            .count_bucket_objects(&BucketLocation {
                project_id,
                bucket_name: bucket.into(),
            })
            .await
            .unwrap()
    }

    async fn mark_project(&self, project_id: Uuid) {
        self.db
            .projects()
            .update_status(project_id, ProjectStatus::PendingDeletion)
            .await
            .unwrap();
    }

    async fn mark_user(&self, user_id: Uuid) {
        self.db
            .users()
            .update_status(user_id, UserStatus::PendingDeletion)
            .await
            .unwrap();
    }

    async fn project_status(&self, project_id: Uuid) -> ProjectStatus {
        self.db
            .projects()
            .get_by_id(project_id)
            .await
            .unwrap()
            .unwrap()
            .status
    }

    async fn user_status(&self, user_id: Uuid) -> UserStatus {
        self.db.users().get_by_id(user_id).await.unwrap().unwrap().status
    }

    /// A pending-deletion project with one bucket of `objects` objects, marked now.
    async fn pending_project(&self, objects: usize) -> Uuid {
        let owner = self.user().await;
        let project = self.project(owner).await;
        self.bucket(project.id, "b1", false, objects).await;
        self.mark_project(project.id).await;
        project.id
    }
}

fn flow(enabled: bool) -> FlowConfig {
    FlowConfig {
        enabled,
        buffer_time_secs: HOUR,
    }
}

fn config() -> PendingDeleteConfig {
    PendingDeleteConfig {
        enabled: true,
        interval_secs: 24 * HOUR,
        list_limit: 100,
        delete_concurrency: 1,
        anonymized_email_domain: "deleted.invalid".into(),
        project: flow(true),
        user: flow(true),
        violation_freeze: flow(true),
        billing_freeze: flow(true),
        trial_freeze: flow(true),
        object_deletion: ObjectDeletionConfig {
            batch_size: 3,
            max_staleness_secs: 0,
            max_commit_delay_ms: 0,
        },
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Project flow
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_project_reclaimed_after_buffer() {
    let h = Harness::new().await;
    let owner = h.user().await;
    let project = h.project(owner).await;
    h.bucket(project.id, "b1", false, 10).await;
    h.db.api_keys().create(project.id, "key").await.unwrap();
    h.db.domains()
        .create(CreateDomain {
            project_id: project.id,
            subdomain: "cdn.example.com".into(),
            created_by: owner,
        })
        .await
        .unwrap();
    h.mark_project(project.id).await;
    let chore = h.chore(config());

    h.advance(Duration::minutes(30));
    let report = chore.run_once().await;
    assert!(report.is_ok());
    assert_eq!(report.project.as_ref().unwrap().deleted, 0);
    assert_eq!(h.project_status(project.id).await, ProjectStatus::PendingDeletion);
    assert_eq!(h.objects(project.id, "b1").await, 10);
    assert_eq!(h.db.api_keys().count_by_project(project.id).await.unwrap(), 1);

    h.advance(Duration::minutes(31));
    let report = chore.run_once().await;
    assert!(report.is_ok());
    assert_eq!(report.project.as_ref().unwrap().deleted, 1);
    assert_eq!(h.project_status(project.id).await, ProjectStatus::Disabled);
    assert_eq!(h.objects(project.id, "b1").await, 0);
    assert_eq!(h.db.api_keys().count_by_project(project.id).await.unwrap(), 0);
    assert!(h.db.domains().list_by_project(project.id).await.unwrap().is_empty());
    // The owner account is untouched
    assert_eq!(h.user_status(owner).await, UserStatus::Active);
}

#[tokio::test]
async fn test_buffer_boundary_is_inclusive() {
    let h = Harness::new().await;
    let project_id = h.pending_project(1).await;
    let chore = h.chore(config());

    h.advance(Duration::seconds(HOUR as i64 - 1));
    chore.run_once().await;
    assert_eq!(h.project_status(project_id).await, ProjectStatus::PendingDeletion);

    h.advance(Duration::seconds(1));
    chore.run_once().await;
    assert_eq!(h.project_status(project_id).await, ProjectStatus::Disabled);
}

#[tokio::test]
async fn test_all_pages_processed_in_one_tick() {
    let h = Harness::new().await;
    let mut projects = Vec::new();
    for _ in 0..5 {
        projects.push(h.pending_project(2).await);
    }
    let chore = h.chore(PendingDeleteConfig {
        list_limit: 2,
        ..config()
    });

    h.advance(Duration::hours(2));
    let report = chore.run_once().await;
    assert_eq!(report.project.as_ref().unwrap().deleted, 5);
    for id in projects {
        assert_eq!(h.project_status(id).await, ProjectStatus::Disabled);
        assert_eq!(h.objects(id, "b1").await, 0);
    }
}

#[tokio::test]
async fn test_second_run_is_a_no_op() {
    let h = Harness::new().await;
    h.pending_project(3).await;
    let chore = h.chore(config());

    h.advance(Duration::hours(2));
    assert_eq!(chore.run_once().await.total_deleted(), 1);

    let report = chore.run_once().await;
    assert!(report.is_ok());
    assert_eq!(report.total_deleted(), 0);
    assert_eq!(report.project.as_ref().unwrap().skipped, 0);
}

#[tokio::test]
async fn test_object_lock_vetoes_whole_project() {
    let h = Harness::new().await;
    let owner = h.user().await;
    let locked = h.project(owner).await;
    h.bucket(locked.id, "open", false, 4).await;
    h.bucket(locked.id, "compliance", true, 2).await;
    h.mark_project(locked.id).await;

    h.advance(Duration::seconds(1));
    let others = [h.pending_project(1).await, h.pending_project(1).await];

    // One candidate per page: the vetoed project must not hide the others.
    let chore = h.chore(PendingDeleteConfig {
        list_limit: 1,
        ..config()
    });
    h.advance(Duration::hours(2));
    let report = chore.run_once().await;

    let project = report.project.as_ref().unwrap();
    assert!(project.error.is_none());
    assert_eq!(project.skipped, 1);
    assert_eq!(project.deleted, 2);
    assert_eq!(h.project_status(locked.id).await, ProjectStatus::PendingDeletion);
    assert_eq!(h.objects(locked.id, "open").await, 4);
    assert_eq!(h.objects(locked.id, "compliance").await, 2);
    for id in others {
        assert_eq!(h.project_status(id).await, ProjectStatus::Disabled);
    }
}

#[tokio::test]
async fn test_failed_project_does_not_stop_siblings() {
    let h = Harness::new().await;
    let failing = h.pending_project(5).await;
    h.advance(Duration::seconds(1));
    let healthy = [h.pending_project(5).await, h.pending_project(5).await];

    let objects = Arc::new(FailingObjects {
        inner: h.store.clone(),
        fail_project: failing,
    });
    let chore = h.chore_with_objects(
        PendingDeleteConfig {
            list_limit: 1,
            ..config()
        },
        objects,
    );

    h.advance(Duration::hours(2));
    let report = chore.run_once().await;
    let project = report.project.as_ref().unwrap();
    assert_eq!(project.failed, 1);
    assert_eq!(project.deleted, 2);
    assert!(matches!(project.error, Some(ReclaimError::Metabase(_))));

    assert_eq!(h.project_status(failing).await, ProjectStatus::PendingDeletion);
    assert_eq!(h.objects(failing, "b1").await, 5);
    for id in healthy {
        assert_eq!(h.project_status(id).await, ProjectStatus::Disabled);
    }

    // Retried, and failing again, on the next tick
    let report = chore.run_once().await;
    assert_eq!(report.project.as_ref().unwrap().failed, 1);
    assert_eq!(report.project.as_ref().unwrap().deleted, 0);
}

#[tokio::test]
async fn test_project_restored_mid_tick_is_skipped() {
    let h = Harness::new().await;
    let first = h.pending_project(1).await;
    h.advance(Duration::seconds(1));
    let restored = h.pending_project(3).await;

    let objects = Arc::new(ReactivatingObjects {
        inner: h.store.clone(),
        db: h.db.clone(),
        trigger: first,
        restore: restored,
    });
    let chore = h.chore_with_objects(config(), objects);

    h.advance(Duration::hours(2));
    let report = chore.run_once().await;
    let project = report.project.as_ref().unwrap();
    assert_eq!(project.deleted, 1);
    assert_eq!(project.skipped, 1);
    assert_eq!(h.project_status(restored).await, ProjectStatus::Active);
    assert_eq!(h.objects(restored, "b1").await, 3);
}

#[tokio::test]
async fn test_required_disable_step_failure_keeps_project_pending() {
    let h = Harness::new().await;
    let project_id = h.pending_project(2).await;
    let DbPoolRef::Sqlite(pool) = h.db.pool();
    sqlx::query("DROP TABLE api_keys").execute(pool).await.unwrap();

    let chore = h.chore(config());
    h.advance(Duration::hours(2));
    let report = chore.run_once().await;

    let project = report.project.as_ref().unwrap();
    assert_eq!(project.failed, 1);
    assert!(matches!(project.error, Some(ReclaimError::Db(_))));
    // Objects go first; the status change is the commit point.
    assert_eq!(h.objects(project_id, "b1").await, 0);
    assert_eq!(h.project_status(project_id).await, ProjectStatus::PendingDeletion);
}

#[rstest]
#[case::sequential(1)]
#[case::parallel(4)]
#[tokio::test]
async fn test_outcome_independent_of_concurrency(#[case] concurrency: usize) {
    let h = Harness::new().await;
    let mut healthy = Vec::new();
    for _ in 0..6 {
        healthy.push(h.pending_project(4).await);
    }
    let failing = h.pending_project(4).await;
    let owner = h.user().await;
    let locked = h.project(owner).await;
    h.bucket(locked.id, "b1", true, 1).await;
    h.mark_project(locked.id).await;

    let objects = Arc::new(FailingObjects {
        inner: h.store.clone(),
        fail_project: failing,
    });
    let chore = h.chore_with_objects(
        PendingDeleteConfig {
            list_limit: 3,
            ..config()
        },
        objects,
    );
    chore.test_set_delete_concurrency(concurrency);

    h.advance(Duration::hours(2));
    let report = chore.run_once().await;
    let project = report.project.as_ref().unwrap();
    assert_eq!(project.deleted, 6);
    assert_eq!(project.skipped, 1);
    assert_eq!(project.failed, 1);

    for id in healthy {
        assert_eq!(h.project_status(id).await, ProjectStatus::Disabled);
        assert_eq!(h.objects(id, "b1").await, 0);
    }
    assert_eq!(h.project_status(failing).await, ProjectStatus::PendingDeletion);
    assert_eq!(h.project_status(locked.id).await, ProjectStatus::PendingDeletion);
}

// ─────────────────────────────────────────────────────────────────────────────
// User flows
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_trial_freeze_escalation_deletes_account() {
    let h = Harness::new().await;
    let user = h.user().await;
    let project = h.project(user).await;
    h.bucket(project.id, "b1", false, 6).await;
    h.db.sessions()
        .create(user, h.clock.now() + Duration::days(1))
        .await
        .unwrap();
    h.db.freeze_events()
        .upsert(user, FreezeEventType::TrialExpirationFreeze, None)
        .await
        .unwrap();
    h.mark_user(user).await;
    let chore = h.chore(config());

    h.advance(Duration::minutes(30));
    let report = chore.run_once().await;
    assert!(report.is_ok());
    assert_eq!(h.user_status(user).await, UserStatus::PendingDeletion);
    assert_eq!(h.project_status(project.id).await, ProjectStatus::Active);
    assert_eq!(h.objects(project.id, "b1").await, 6);

    h.advance(Duration::minutes(31));
    let report = chore.run_once().await;
    assert!(report.is_ok());
    let frozen = report.frozen_user.as_ref().unwrap();
    assert_eq!(frozen.deleted, 1);
    assert_eq!(frozen.deleted_projects, 1);
    // Frozen users belong to the escalation flow only
    assert_eq!(report.user.as_ref().unwrap().deleted, 0);

    let stored = h.db.users().get_by_id(user).await.unwrap().unwrap();
    assert_eq!(stored.status, UserStatus::Deleted);
    assert_eq!(stored.email, anonymized_email(user, "deleted.invalid"));
    assert_eq!(stored.full_name, "");
    assert_eq!(h.db.sessions().count_by_user(user).await.unwrap(), 0);
    assert!(h.db.freeze_events().list_by_user(user).await.unwrap().is_empty());
    assert_eq!(h.project_status(project.id).await, ProjectStatus::Disabled);
    assert_eq!(h.objects(project.id, "b1").await, 0);
    assert_eq!(h.cards.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_unescalated_and_disabled_freezes_are_ignored() {
    let h = Harness::new().await;
    let counting_down = h.user().await;
    h.db.freeze_events()
        .upsert(counting_down, FreezeEventType::BillingFreeze, Some(5))
        .await
        .unwrap();
    h.mark_user(counting_down).await;

    let violation = h.user().await;
    h.db.freeze_events()
        .upsert(violation, FreezeEventType::ViolationFreeze, None)
        .await
        .unwrap();
    h.mark_user(violation).await;

    let chore = h.chore(PendingDeleteConfig {
        violation_freeze: flow(false),
        ..config()
    });
    h.advance(Duration::hours(2));
    let report = chore.run_once().await;

    assert_eq!(report.frozen_user.as_ref().unwrap().deleted, 0);
    assert_eq!(h.user_status(counting_down).await, UserStatus::PendingDeletion);
    assert_eq!(h.user_status(violation).await, UserStatus::PendingDeletion);
}

#[tokio::test]
async fn test_pending_user_flow_deletes_account_and_projects() {
    let h = Harness::new().await;
    let user = h.user().await;
    let first = h.project(user).await;
    let second = h.project(user).await;
    h.bucket(first.id, "b1", false, 2).await;
    h.bucket(second.id, "b1", false, 2).await;
    h.mark_user(user).await;
    let chore = h.chore(config());

    h.advance(Duration::hours(2));
    let report = chore.run_once().await;
    let flow = report.user.as_ref().unwrap();
    assert_eq!(flow.deleted, 1);
    assert_eq!(flow.deleted_projects, 2);
    assert_eq!(h.user_status(user).await, UserStatus::Deleted);
    assert_eq!(h.project_status(first.id).await, ProjectStatus::Disabled);
    assert_eq!(h.project_status(second.id).await, ProjectStatus::Disabled);
}

#[tokio::test]
async fn test_locked_project_vetoes_user() {
    let h = Harness::new().await;
    let user = h.user().await;
    let open = h.project(user).await;
    let locked = h.project(user).await;
    h.bucket(open.id, "b1", false, 3).await;
    h.bucket(locked.id, "b1", true, 3).await;
    h.mark_user(user).await;
    let chore = h.chore(config());

    h.advance(Duration::hours(2));
    let report = chore.run_once().await;
    let flow = report.user.as_ref().unwrap();
    assert_eq!(flow.skipped, 1);
    assert_eq!(flow.deleted, 0);
    assert_eq!(h.user_status(user).await, UserStatus::PendingDeletion);
    assert_eq!(h.project_status(open.id).await, ProjectStatus::Active);
    assert_eq!(h.objects(open.id, "b1").await, 3);
    assert_eq!(h.cards.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_payment_failure_retried_next_tick() {
    let h = Harness::new().await;
    let user = h.user().await;
    let project = h.project(user).await;
    h.bucket(project.id, "b1", false, 1).await;
    h.mark_user(user).await;
    let chore = h.chore(config());

    h.cards.fail.store(true, Ordering::SeqCst);
    h.advance(Duration::hours(2));
    let report = chore.run_once().await;
    let flow = report.user.as_ref().unwrap();
    assert_eq!(flow.failed, 1);
    assert!(matches!(flow.error, Some(ReclaimError::Payments(_))));
    assert_eq!(h.user_status(user).await, UserStatus::PendingDeletion);

    h.cards.fail.store(false, Ordering::SeqCst);
    let report = chore.run_once().await;
    let flow = report.user.as_ref().unwrap();
    assert_eq!(flow.deleted, 1);
    // Disabled on the first attempt already
    assert_eq!(flow.deleted_projects, 0);
    assert_eq!(h.user_status(user).await, UserStatus::Deleted);
}

// ─────────────────────────────────────────────────────────────────────────────
// Orchestration
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_listing_failure_is_isolated_to_its_flows() {
    let h = Harness::new().await;
    let project_id = h.pending_project(2).await;
    let DbPoolRef::Sqlite(pool) = h.db.pool();
    sqlx::query("DROP TABLE account_freeze_events")
        .execute(pool)
        .await
        .unwrap();

    let chore = h.chore(config());
    h.advance(Duration::hours(2));
    let report = chore.run_once().await;

    assert!(!report.is_ok());
    assert!(report.project.as_ref().unwrap().is_ok());
    assert!(report.frozen_user.as_ref().unwrap().error.is_some());
    assert!(report.user.as_ref().unwrap().error.is_some());
    assert_eq!(h.project_status(project_id).await, ProjectStatus::Disabled);
}

#[tokio::test]
async fn test_disabled_flows_do_not_run() {
    let h = Harness::new().await;
    let project_id = h.pending_project(1).await;
    let chore = h.chore(PendingDeleteConfig {
        project: flow(false),
        violation_freeze: flow(false),
        billing_freeze: flow(false),
        trial_freeze: flow(false),
        ..config()
    });

    h.advance(Duration::hours(2));
    let report = chore.run_once().await;
    assert!(report.project.is_none());
    assert!(report.frozen_user.is_none());
    assert!(report.user.is_some());
    assert_eq!(h.project_status(project_id).await, ProjectStatus::PendingDeletion);
}

#[tokio::test]
async fn test_disabled_chore_returns_immediately() {
    let h = Harness::new().await;
    let chore = h.chore(PendingDeleteConfig {
        enabled: false,
        ..config()
    });
    chore.run(CancellationToken::new()).await.unwrap();
}

#[tokio::test]
async fn test_trigger_wait_runs_a_tick_then_close_stops() {
    let h = Harness::new().await;
    let project_id = h.pending_project(2).await;
    h.advance(Duration::hours(2));
    let chore = Arc::new(h.chore(config()));

    let runner = {
        let chore = chore.clone();
        tokio::spawn(async move { chore.run(CancellationToken::new()).await })
    };

    chore.cycle().pause();
    chore.cycle().trigger_wait().await;
    assert_eq!(h.project_status(project_id).await, ProjectStatus::Disabled);

    chore.close();
    runner.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_maximum_interval_runs_on_trigger() {
    let h = Harness::new().await;
    let project_id = h.pending_project(1).await;
    h.advance(Duration::hours(2));
    let chore = Arc::new(h.chore(PendingDeleteConfig {
        interval_secs: u64::MAX,
        ..config()
    }));

    let runner = {
        let chore = chore.clone();
        tokio::spawn(async move { chore.run(CancellationToken::new()).await })
    };

    chore.cycle().trigger_wait().await;
    assert_eq!(h.project_status(project_id).await, ProjectStatus::Disabled);

    chore.close();
    runner.await.unwrap().unwrap();
}
