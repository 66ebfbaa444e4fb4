use thiserror::Error;

use crate::{db::DbError, metabase::MetabaseError, payments::PaymentsError};

/// Errors raised while reclaiming a candidate or running a flow.
#[derive(Debug, Error)]
pub enum ReclaimError {
    #[error("Database error: {0}")]
    Db(#[from] DbError),

    #[error("Object store error: {0}")]
    Metabase(#[from] MetabaseError),

    #[error("Payment provider error: {0}")]
    Payments(#[from] PaymentsError),

    #[error("Worker panicked: {0}")]
    WorkerPanicked(String),

    #[error("Cycle is already running")]
    AlreadyRunning,

    #[error("{} errors occurred: {}", .0.len(), join_errors(.0))]
    Aggregate(Vec<ReclaimError>),
}

pub type ReclaimResult<T> = Result<T, ReclaimError>;

impl ReclaimError {
    /// Combine collected errors. `None` when there were none, the error itself when there was one.
    pub fn combine(mut errors: Vec<ReclaimError>) -> Option<ReclaimError> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(ReclaimError::Aggregate(errors)),
        }
    }

    /// Number of underlying failures.
    pub fn count(&self) -> usize {
        match self {
            ReclaimError::Aggregate(errors) => errors.iter().map(ReclaimError::count).sum(),
            _ => 1,
        }
    }
}

fn join_errors(errors: &[ReclaimError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
