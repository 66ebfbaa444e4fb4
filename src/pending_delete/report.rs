use super::error::ReclaimError;

/// Outcome of one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The record no longer qualifies and has dropped out of the listing.
    Ineligible,
    /// Left in place on purpose, e.g. a bucket under object lock. Still listed.
    Vetoed,
    /// Fully reclaimed. `projects` counts projects deprovisioned on a user's behalf.
    Reclaimed { projects: u64 },
}

impl Outcome {
    /// Whether the candidate still matches its listing query afterwards.
    pub fn still_listed(&self) -> bool {
        matches!(self, Outcome::Vetoed)
    }
}

/// Result of running one flow for one tick.
#[derive(Debug)]
pub struct FlowReport {
    pub task: &'static str,
    /// Candidates that were ineligible on re-check or vetoed.
    pub skipped: u64,
    /// Candidates fully reclaimed.
    pub deleted: u64,
    /// Projects disabled while deleting users. Always zero for the project flow.
    pub deleted_projects: u64,
    pub failed: u64,
    /// Listing failure and per-candidate failures, combined.
    pub error: Option<ReclaimError>,
}

impl FlowReport {
    pub fn new(task: &'static str) -> Self {
        Self {
            task,
            skipped: 0,
            deleted: 0,
            deleted_projects: 0,
            failed: 0,
            error: None,
        }
    }

    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Ineligible | Outcome::Vetoed => self.skipped += 1,
            Outcome::Reclaimed { projects } => {
                self.deleted += 1;
                self.deleted_projects += projects;
            }
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn log(&self) {
        match &self.error {
            None => tracing::info!(
                task = self.task,
                skipped = self.skipped,
                deleted = self.deleted,
                deleted_projects = self.deleted_projects,
                "Flow complete"
            ),
            Some(e) => tracing::error!(
                task = self.task,
                skipped = self.skipped,
                deleted = self.deleted,
                deleted_projects = self.deleted_projects,
                failed = self.failed,
                error = %e,
                "Flow completed with errors"
            ),
        }
    }
}

/// Reports of the three flows for one tick. `None` marks a disabled flow.
#[derive(Debug, Default)]
pub struct CycleReport {
    pub project: Option<FlowReport>,
    pub frozen_user: Option<FlowReport>,
    pub user: Option<FlowReport>,
}

impl CycleReport {
    pub fn flows(&self) -> impl Iterator<Item = &FlowReport> {
        [&self.project, &self.frozen_user, &self.user]
            .into_iter()
            .flatten()
    }

    pub fn is_ok(&self) -> bool {
        self.flows().all(FlowReport::is_ok)
    }

    pub fn total_deleted(&self) -> u64 {
        self.flows().map(|f| f.deleted).sum()
    }

    /// Move the flow errors out into one group.
    pub fn into_error(self) -> Option<ReclaimError> {
        let errors = [self.project, self.frozen_user, self.user]
            .into_iter()
            .flatten()
            .filter_map(|f| f.error)
            .collect();
        ReclaimError::combine(errors)
    }
}
