//! Fixed-interval scheduler with pause/resume and synchronous triggering.

use std::{future::Future, time::Duration};

use parking_lot::Mutex;
use tokio::{
    sync::{mpsc, oneshot},
    time::Instant,
};
use tokio_util::sync::CancellationToken;

use super::error::{ReclaimError, ReclaimResult};

/// Stand-in deadline for intervals too large to add to an instant.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

enum Control {
    Pause,
    Resume,
    Trigger(oneshot::Sender<()>),
}

/// Runs a callback every `interval` until cancelled or closed.
///
/// The loop waits one interval before the first run. Callback runs never overlap:
/// the next deadline is only considered once the current run has returned.
pub struct Cycle {
    interval: Duration,
    control: mpsc::UnboundedSender<Control>,
    receiver: Mutex<Option<mpsc::UnboundedReceiver<Control>>>,
    closed: CancellationToken,
}

impl Cycle {
    pub fn new(interval: Duration) -> Self {
        let (control, receiver) = mpsc::unbounded_channel();
        Self {
            interval,
            control,
            receiver: Mutex::new(Some(receiver)),
            closed: CancellationToken::new(),
        }
    }

    /// Drive the loop. Returns once `cancel` fires or [`Cycle::close`] is called.
    ///
    /// Callback errors are logged and the loop carries on. A cycle can only be run once.
    pub async fn run<F, Fut>(&self, cancel: CancellationToken, mut callback: F) -> ReclaimResult<()>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ReclaimResult<()>>,
    {
        let mut receiver = self
            .receiver
            .lock()
            .take()
            .ok_or(ReclaimError::AlreadyRunning)?;

        let mut paused = false;
        let mut deadline = self.next_deadline();

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = self.closed.cancelled() => break,
                msg = receiver.recv() => match msg {
                    Some(Control::Pause) => paused = true,
                    Some(Control::Resume) => {
                        if paused {
                            paused = false;
                            deadline = self.next_deadline();
                        }
                    }
                    Some(Control::Trigger(done)) => {
                        Self::invoke(&mut callback).await;
                        let _ = done.send(());
                    }
                    // Sender lives in self
                    None => break,
                },
                _ = tokio::time::sleep_until(deadline), if !paused => {
                    Self::invoke(&mut callback).await;
                    deadline = self.next_deadline();
                }
            }
        }

        tracing::debug!("Cycle stopped");
        Ok(())
    }

    /// One interval from now, or [`FAR_FUTURE`] from now if that overflows.
    fn next_deadline(&self) -> Instant {
        let now = Instant::now();
        now.checked_add(self.interval)
            .unwrap_or_else(|| now + FAR_FUTURE)
    }

    async fn invoke<F, Fut>(callback: &mut F)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ReclaimResult<()>>,
    {
        if let Err(e) = callback().await {
            tracing::error!(error = %e, "Cycle run failed");
        }
    }

    /// Stop scheduled runs. Triggers still run.
    pub fn pause(&self) {
        let _ = self.control.send(Control::Pause);
    }

    /// Resume scheduled runs, the next one a full interval from now.
    pub fn resume(&self) {
        let _ = self.control.send(Control::Resume);
    }

    /// Run the callback now and wait for it to finish.
    ///
    /// Returns immediately if the cycle has been closed.
    pub async fn trigger_wait(&self) {
        let (done, wait) = oneshot::channel();
        if self.control.send(Control::Trigger(done)).is_err() {
            return;
        }
        tokio::select! {
            _ = wait => {}
            _ = self.closed.cancelled() => {}
        }
    }

    /// Stop the loop after the current run, if any.
    pub fn close(&self) {
        self.closed.cancel();
    }
}
