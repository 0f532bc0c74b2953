//! Tokio-backed deferred-execution scheduler.

use backpress::{Job, Scheduler};
use tokio::sync::mpsc;
use tracing::warn;

/// A [`Scheduler`] that runs jobs on a dedicated tokio task, strictly in
/// the order they were scheduled.
///
/// The engine posts one job per deferred delivery, so relative delivery
/// order per subscription is preserved while the producer's call stack
/// returns immediately.
///
/// Dropping the scheduler lets the worker task finish its queued jobs and
/// exit.
pub struct TokioScheduler {
    jobs: mpsc::UnboundedSender<Job>,
}

impl TokioScheduler {
    /// Spawns the worker task. Must be called from within a tokio runtime.
    pub fn new() -> Self {
        let (jobs, mut queue) = mpsc::unbounded_channel::<Job>();
        tokio::spawn(async move {
            while let Some(job) = queue.recv().await {
                job();
            }
        });
        Self { jobs }
    }
}

impl Default for TokioScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, job: Job) {
        if self.jobs.send(job).is_err() {
            warn!("scheduler worker is gone; deferred delivery dropped");
        }
    }
}
