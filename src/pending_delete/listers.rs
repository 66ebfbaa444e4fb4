//! Candidate sources for the three flows.
//!
//! All three answer the same question, "which records are past their buffer",
//! and differ only in how they page. A source is created fresh for every flow run
//! and told after each page which candidates it handed out are still listed. That
//! keeps a tick from re-offering a candidate it already tried.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    db::{DbResult, FreezeEventRepo, Page, ProjectRepo, UserRepo},
    models::{EscalatedFreeze, FreezeEventType, PendingUser, ProjectCandidate},
};

#[async_trait]
pub trait CandidateSource: Send {
    type Candidate: Clone + Send + Sync + 'static;

    /// Next page of candidates marked at or before `threshold`.
    async fn list(
        &mut self,
        threshold: DateTime<Utc>,
        limit: usize,
    ) -> DbResult<Page<Self::Candidate>>;

    /// Report the candidates of the last page that still match the listing,
    /// because they were vetoed or failed.
    fn retained(&mut self, candidates: &[Self::Candidate]);
}

/// Projects pending deletion.
///
/// Processed projects leave the status-filtered result set, so paging restarts
/// at the number of projects left behind so far rather than advancing by page size.
pub struct ProjectLister {
    projects: Arc<dyn ProjectRepo>,
    offset: usize,
}

impl ProjectLister {
    pub fn new(projects: Arc<dyn ProjectRepo>) -> Self {
        Self {
            projects,
            offset: 0,
        }
    }
}

#[async_trait]
impl CandidateSource for ProjectLister {
    type Candidate = ProjectCandidate;

    async fn list(
        &mut self,
        threshold: DateTime<Utc>,
        limit: usize,
    ) -> DbResult<Page<ProjectCandidate>> {
        self.projects
            .list_pending_deletion_before(threshold, self.offset, limit)
            .await
    }

    fn retained(&mut self, candidates: &[ProjectCandidate]) {
        self.offset += candidates.len();
    }
}

/// Users pending deletion without freeze events, walked with a keyset cursor.
pub struct UserLister {
    users: Arc<dyn UserRepo>,
    cursor: Option<PendingUser>,
}

impl UserLister {
    pub fn new(users: Arc<dyn UserRepo>) -> Self {
        Self {
            users,
            cursor: None,
        }
    }
}

#[async_trait]
impl CandidateSource for UserLister {
    type Candidate = PendingUser;

    async fn list(&mut self, threshold: DateTime<Utc>, limit: usize) -> DbResult<Page<PendingUser>> {
        let page = self
            .users
            .list_pending_deletion_before(threshold, self.cursor.as_ref(), limit)
            .await?;
        if let Some(last) = page.items.last() {
            self.cursor = Some(last.clone());
        }
        Ok(page)
    }

    // The cursor already moved past every candidate handed out.
    fn retained(&mut self, _candidates: &[PendingUser]) {}
}

/// Users whose freeze escalated, across every enabled freeze type.
///
/// Each freeze type has its own buffer, so thresholds are fixed at construction
/// and the threshold passed to [`CandidateSource::list`] is ignored. A user with
/// several escalated freezes is offered once, for the first one listed.
pub struct FreezeEscalationLister {
    freeze_events: Arc<dyn FreezeEventRepo>,
    thresholds: Vec<(FreezeEventType, DateTime<Utc>)>,
    offset: usize,
    offered: HashSet<Uuid>,
    /// Rows per user on the last page.
    last_rows: HashMap<Uuid, usize>,
}

impl FreezeEscalationLister {
    pub fn new(
        freeze_events: Arc<dyn FreezeEventRepo>,
        thresholds: Vec<(FreezeEventType, DateTime<Utc>)>,
    ) -> Self {
        Self {
            freeze_events,
            thresholds,
            offset: 0,
            offered: HashSet::new(),
            last_rows: HashMap::new(),
        }
    }
}

#[async_trait]
impl CandidateSource for FreezeEscalationLister {
    type Candidate = EscalatedFreeze;

    async fn list(
        &mut self,
        _threshold: DateTime<Utc>,
        limit: usize,
    ) -> DbResult<Page<EscalatedFreeze>> {
        let page = self
            .freeze_events
            .list_escalated_before(&self.thresholds, self.offset, limit)
            .await?;

        self.last_rows.clear();
        let mut items = Vec::with_capacity(page.items.len());
        for freeze in page.items {
            if self.offered.contains(&freeze.user_id) && !self.last_rows.contains_key(&freeze.user_id)
            {
                // Tried earlier this run and still listed
                self.offset += 1;
                continue;
            }
            *self.last_rows.entry(freeze.user_id).or_default() += 1;
            if self.offered.insert(freeze.user_id) {
                items.push(freeze);
            }
        }

        Ok(Page {
            items,
            has_more: page.has_more,
        })
    }

    fn retained(&mut self, candidates: &[EscalatedFreeze]) {
        for freeze in candidates {
            self.offset += self.last_rows.get(&freeze.user_id).copied().unwrap_or(1);
        }
    }
}
