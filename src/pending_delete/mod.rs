//! Pending-deletion reclamation.
//!
//! Projects and accounts marked for deletion, directly or through an escalated
//! freeze, are reclaimed once their buffer time has passed: object data first,
//! then console records, with the status change as the final step. Anything
//! interrupted before that step is still listed on the next tick and is simply
//! retried.
//!
//! ```text
//! Cycle tick
//!   ├─ project flow      ProjectLister          → verify → empty buckets → disable
//!   ├─ frozen-user flow  FreezeEscalationLister → verify → per project ↑ → deactivate
//!   └─ user flow         UserLister             → verify → per project ↑ → deactivate
//! ```

mod chore;
mod cycle;
mod deactivate;
mod disable;
mod error;
mod listers;
mod pool;
mod reclaim;
mod report;
mod verify;

pub use chore::{Chore, FROZEN_USER_TASK, PROJECT_TASK, USER_TASK, threshold};
pub use cycle::Cycle;
pub use deactivate::AccountDeactivator;
pub use disable::ProjectDisabler;
pub use error::{ReclaimError, ReclaimResult};
pub use listers::{CandidateSource, FreezeEscalationLister, ProjectLister, UserLister};
pub use pool::WorkerPool;
pub use reclaim::{BucketObjectReclaimer, ReclaimOutcome};
pub use report::{CycleReport, FlowReport, Outcome};
pub use verify::StatusVerifier;
