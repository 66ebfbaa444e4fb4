use std::{
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Instant,
};

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::{
    cycle::Cycle,
    deactivate::AccountDeactivator,
    disable::ProjectDisabler,
    error::{ReclaimError, ReclaimResult},
    listers::{CandidateSource, FreezeEscalationLister, ProjectLister, UserLister},
    pool::WorkerPool,
    reclaim::{BucketObjectReclaimer, ReclaimOutcome},
    report::{CycleReport, FlowReport, Outcome},
    verify::StatusVerifier,
};
use crate::{
    clock::{Clock, SystemClock},
    config::PendingDeleteConfig,
    db::DbPool,
    metabase::ObjectStore,
    models::{EscalatedFreeze, FreezeEventType, PendingUser, ProjectCandidate},
    observability::metrics,
    payments::CreditCards,
};

pub const PROJECT_TASK: &str = "project-pending-deletion";
pub const USER_TASK: &str = "user-pending-deletion";
pub const FROZEN_USER_TASK: &str = "frozen-user-deletion";

/// Latest mark time that is past `buffer` at `now`.
pub fn threshold(now: DateTime<Utc>, buffer: Duration) -> DateTime<Utc> {
    now.checked_sub_signed(buffer)
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// The pending-deletion chore.
///
/// Each tick runs the project, frozen-user and pending-user flows concurrently
/// and waits for all three. A flow that fails is logged and does not affect the
/// others; whatever it left behind is picked up again on the next tick.
pub struct Chore {
    config: PendingDeleteConfig,
    db: Arc<DbPool>,
    objects: Arc<dyn ObjectStore>,
    credit_cards: Arc<dyn CreditCards>,
    clock: RwLock<Arc<dyn Clock>>,
    delete_concurrency: AtomicUsize,
    cycle: Cycle,
}

impl Chore {
    pub fn new(
        config: PendingDeleteConfig,
        db: Arc<DbPool>,
        objects: Arc<dyn ObjectStore>,
        credit_cards: Arc<dyn CreditCards>,
    ) -> Self {
        let cycle = Cycle::new(config.interval());
        let delete_concurrency = AtomicUsize::new(config.delete_concurrency.max(1));
        Self {
            config,
            db,
            objects,
            credit_cards,
            clock: RwLock::new(Arc::new(SystemClock)),
            delete_concurrency,
            cycle,
        }
    }

    /// Run ticks until `cancel` fires or [`Chore::close`] is called.
    ///
    /// Returns immediately when the chore is disabled.
    pub async fn run(&self, cancel: CancellationToken) -> ReclaimResult<()> {
        if !self.config.enabled {
            info!("Pending deletion chore disabled by configuration");
            return Ok(());
        }

        info!(
            interval_secs = self.config.interval_secs,
            list_limit = self.config.list_limit,
            delete_concurrency = self.delete_concurrency.load(Ordering::Relaxed),
            project = self.config.project.enabled,
            user = self.config.user.enabled,
            violation_freeze = self.config.violation_freeze.enabled,
            billing_freeze = self.config.billing_freeze.enabled,
            trial_freeze = self.config.trial_freeze.enabled,
            "Starting pending deletion chore"
        );

        self.cycle
            .run(cancel, move || async move {
                match self.run_once().await.into_error() {
                    None => Ok(()),
                    Some(e) => Err(e),
                }
            })
            .await
    }

    /// Run a single tick of all enabled flows.
    pub async fn run_once(&self) -> CycleReport {
        let now = self.clock.read().now();
        let concurrency = self.delete_concurrency.load(Ordering::Relaxed);
        let reclaimers = Arc::new(Reclaimers::new(
            &self.config,
            self.db.clone(),
            self.objects.clone(),
            self.credit_cards.clone(),
        ));

        let (project, frozen_user, user) = tokio::join!(
            self.project_flow(&reclaimers, now, concurrency),
            self.frozen_user_flow(&reclaimers, now, concurrency),
            self.user_flow(&reclaimers, now, concurrency),
        );

        CycleReport {
            project,
            frozen_user,
            user,
        }
    }

    /// Stop the loop started by [`Chore::run`] once the current tick finishes.
    pub fn close(&self) {
        self.cycle.close();
    }

    /// Scheduler controls: pause, resume and synchronous triggering.
    pub fn cycle(&self) -> &Cycle {
        &self.cycle
    }

    /// Replace the clock used to compute eligibility thresholds.
    pub fn test_set_clock(&self, clock: Arc<dyn Clock>) {
        *self.clock.write() = clock;
    }

    /// Change the worker pool size used from the next tick on.
    pub fn test_set_delete_concurrency(&self, concurrency: usize) {
        self.delete_concurrency
            .store(concurrency.max(1), Ordering::Relaxed);
    }

    async fn project_flow(
        &self,
        reclaimers: &Arc<Reclaimers>,
        now: DateTime<Utc>,
        concurrency: usize,
    ) -> Option<FlowReport> {
        if !self.config.project.enabled {
            info!(task = PROJECT_TASK, "Flow disabled; skipping");
            return None;
        }

        let reclaimers = reclaimers.clone();
        let report = run_flow(
            PROJECT_TASK,
            ProjectLister::new(self.db.projects()),
            threshold(now, self.config.project.buffer_time()),
            self.config.list_limit,
            concurrency,
            move |project: ProjectCandidate| {
                let reclaimers = reclaimers.clone();
                async move {
                    reclaimers.project(&project).await.inspect_err(|e| {
                        warn!(
                            task = PROJECT_TASK,
                            project_id = %project.id,
                            error = %e,
                            "Failed to delete project"
                        )
                    })
                }
            },
        )
        .await;
        Some(report)
    }

    async fn frozen_user_flow(
        &self,
        reclaimers: &Arc<Reclaimers>,
        now: DateTime<Utc>,
        concurrency: usize,
    ) -> Option<FlowReport> {
        let thresholds: Vec<(FreezeEventType, DateTime<Utc>)> = self
            .config
            .freeze_flows()
            .into_iter()
            .filter(|(_, flow)| flow.enabled)
            .map(|(event_type, flow)| (event_type, threshold(now, flow.buffer_time())))
            .collect();
        if thresholds.is_empty() {
            info!(task = FROZEN_USER_TASK, "Flow disabled; skipping");
            return None;
        }

        let reclaimers = reclaimers.clone();
        let report = run_flow(
            FROZEN_USER_TASK,
            FreezeEscalationLister::new(self.db.freeze_events(), thresholds),
            now,
            self.config.list_limit,
            concurrency,
            move |freeze: EscalatedFreeze| {
                let reclaimers = reclaimers.clone();
                async move {
                    reclaimers
                        .user(FROZEN_USER_TASK, freeze.user_id, Some(freeze.event_type))
                        .await
                        .inspect_err(|e| {
                            warn!(
                                task = FROZEN_USER_TASK,
                                user_id = %freeze.user_id,
                                freeze = %freeze.event_type,
                                error = %e,
                                "Failed to delete frozen user"
                            )
                        })
                }
            },
        )
        .await;
        Some(report)
    }

    async fn user_flow(
        &self,
        reclaimers: &Arc<Reclaimers>,
        now: DateTime<Utc>,
        concurrency: usize,
    ) -> Option<FlowReport> {
        if !self.config.user.enabled {
            info!(task = USER_TASK, "Flow disabled; skipping");
            return None;
        }

        let reclaimers = reclaimers.clone();
        let report = run_flow(
            USER_TASK,
            UserLister::new(self.db.users()),
            threshold(now, self.config.user.buffer_time()),
            self.config.list_limit,
            concurrency,
            move |user: PendingUser| {
                let reclaimers = reclaimers.clone();
                async move {
                    reclaimers
                        .user(USER_TASK, user.id, None)
                        .await
                        .inspect_err(|e| {
                            warn!(
                                task = USER_TASK,
                                user_id = %user.id,
                                error = %e,
                                "Failed to delete user"
                            )
                        })
                }
            },
        )
        .await;
        Some(report)
    }
}

/// Page through `source`, processing each page under a bounded pool.
///
/// A listing error ends the flow for this tick. Candidate failures are collected
/// and never stop siblings or later pages.
async fn run_flow<S, F, Fut>(
    task: &'static str,
    mut source: S,
    threshold: DateTime<Utc>,
    limit: usize,
    concurrency: usize,
    process: F,
) -> FlowReport
where
    S: CandidateSource,
    F: Fn(S::Candidate) -> Fut + Send + Sync,
    Fut: Future<Output = ReclaimResult<Outcome>> + Send + 'static,
{
    let start = Instant::now();
    let pool = WorkerPool::new(concurrency);
    let mut report = FlowReport::new(task);
    let mut errors = Vec::new();

    loop {
        let page = match source.list(threshold, limit).await {
            Ok(page) => page,
            Err(e) => {
                error!(task, error = %e, "Failed to list candidates");
                metrics::record_flow_error(task);
                errors.push(ReclaimError::from(e));
                break;
            }
        };
        debug!(task, candidates = page.len(), has_more = page.has_more, "Listed candidates");

        let tasks: Vec<Fut> = page.items.iter().cloned().map(&process).collect();
        let results = pool.run(tasks).await;

        let mut retained = Vec::new();
        for (candidate, result) in page.items.into_iter().zip(results) {
            match result {
                Ok(outcome) => {
                    if outcome.still_listed() {
                        retained.push(candidate);
                    }
                    report.record(outcome);
                }
                Err(e) => {
                    report.failed += 1;
                    retained.push(candidate);
                    errors.push(e);
                }
            }
        }
        source.retained(&retained);

        if !page.has_more {
            break;
        }
    }

    report.error = ReclaimError::combine(errors);
    metrics::record_flow_outcome(task, report.deleted, report.skipped, report.failed);
    metrics::record_flow_duration(task, start.elapsed().as_secs_f64());
    report.log();
    report
}

/// Per-tick bundle of the components a candidate goes through.
struct Reclaimers {
    db: Arc<DbPool>,
    verifier: StatusVerifier,
    objects: BucketObjectReclaimer,
    disabler: ProjectDisabler,
    deactivator: AccountDeactivator,
}

impl Reclaimers {
    fn new(
        config: &PendingDeleteConfig,
        db: Arc<DbPool>,
        objects: Arc<dyn ObjectStore>,
        credit_cards: Arc<dyn CreditCards>,
    ) -> Self {
        Self {
            verifier: StatusVerifier::new(db.projects(), db.users()),
            objects: BucketObjectReclaimer::new(db.buckets(), objects, &config.object_deletion),
            disabler: ProjectDisabler::new(db.clone()),
            deactivator: AccountDeactivator::new(
                db.clone(),
                credit_cards,
                config.anonymized_email_domain.clone(),
            ),
            db,
        }
    }

    /// Verify, empty the buckets, then disable. The status change comes last.
    async fn project(&self, project: &ProjectCandidate) -> ReclaimResult<Outcome> {
        let task = PROJECT_TASK;
        let project_id = project.id;

        if !self.verifier.project_pending_deletion(project_id).await? {
            info!(task, %project_id, "Project is no longer pending deletion; skipping");
            return Ok(Outcome::Ineligible);
        }

        let objects = match self.objects.reclaim(task, project_id).await? {
            ReclaimOutcome::Deleted { objects } => objects,
            ReclaimOutcome::RetentionVeto { .. } => return Ok(Outcome::Vetoed),
        };

        self.disabler.disable(task, project).await?;
        info!(task, %project_id, objects, "Project deleted");
        Ok(Outcome::Reclaimed { projects: 0 })
    }

    /// Verify, deprovision every owned project, then deactivate the account.
    ///
    /// Object lock on any owned project vetoes the whole user before anything is deleted.
    async fn user(
        &self,
        task: &'static str,
        user_id: Uuid,
        freeze: Option<FreezeEventType>,
    ) -> ReclaimResult<Outcome> {
        if !self.verifier.user_pending_deletion(user_id).await? {
            info!(task, %user_id, "User is no longer pending deletion; skipping");
            return Ok(Outcome::Ineligible);
        }

        let projects = self.db.projects().list_active_by_owner(user_id).await?;
        for project in &projects {
            let locked_buckets = self.objects.locked_buckets(project.id).await?;
            if locked_buckets > 0 {
                info!(
                    task,
                    %user_id,
                    project_id = %project.id,
                    locked_buckets,
                    "User owns a project with object lock enabled; skipping"
                );
                return Ok(Outcome::Vetoed);
            }
        }

        for project in &projects {
            if let ReclaimOutcome::RetentionVeto { .. } =
                self.objects.reclaim(task, project.id).await?
            {
                return Ok(Outcome::Vetoed);
            }
            self.disabler
                .disable(task, &ProjectCandidate::from(project))
                .await?;
        }

        self.deactivator.deactivate(task, user_id, freeze).await?;
        info!(task, %user_id, projects = projects.len(), "User deleted");
        Ok(Outcome::Reclaimed {
            projects: projects.len() as u64,
        })
    }
}
