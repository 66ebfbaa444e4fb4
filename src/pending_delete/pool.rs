//! Bounded worker pool for one page of candidates.

use std::{future::Future, panic::AssertUnwindSafe, sync::Arc};

use futures::FutureExt;
use tokio::{sync::Semaphore, task::JoinSet};

use super::error::{ReclaimError, ReclaimResult};

/// Runs a batch of tasks with at most `limit` in flight.
///
/// [`WorkerPool::run`] returns only after every task of the batch has finished, so
/// a caller processing pages never has more than one page in flight. A failing or
/// panicking task does not cancel its siblings.
pub struct WorkerPool {
    limit: usize,
    permits: Arc<Semaphore>,
}

impl WorkerPool {
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            limit,
            permits: Arc::new(Semaphore::new(limit)),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Run every task and return their results in input order.
    pub async fn run<Fut, T>(&self, tasks: Vec<Fut>) -> Vec<ReclaimResult<T>>
    where
        Fut: Future<Output = ReclaimResult<T>> + Send + 'static,
        T: Send + 'static,
    {
        let total = tasks.len();
        let mut results: Vec<Option<ReclaimResult<T>>> = (0..total).map(|_| None).collect();
        let mut set = JoinSet::new();

        for (index, task) in tasks.into_iter().enumerate() {
            // The semaphore is never closed; a missing result below reports the task.
            let Ok(permit) = self.permits.clone().acquire_owned().await else {
                break;
            };

            set.spawn(async move {
                let result = match AssertUnwindSafe(task).catch_unwind().await {
                    Ok(result) => result,
                    Err(panic) => Err(ReclaimError::WorkerPanicked(panic_message(&*panic))),
                };
                drop(permit);
                (index, result)
            });
        }

        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((index, result)) => results[index] = Some(result),
                Err(e) => tracing::error!(error = %e, "Worker task did not complete"),
            }
        }

        results
            .into_iter()
            .map(|r| {
                r.unwrap_or_else(|| Err(ReclaimError::WorkerPanicked("task aborted".into())))
            })
            .collect()
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
