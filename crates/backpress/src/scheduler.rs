//! Deferred-execution hook for decoupled delivery.

/// A unit of deferred work.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// External facility that can run a callback later.
///
/// A subscription may carry a scheduler to decouple the producer's call
/// stack from the consumer's execution context. Implementations must run
/// jobs in the order they were scheduled; each pending delivery is posted
/// as exactly one job.
///
/// Subscriptions without a scheduler are delivered in-line, on the
/// producer's call stack, before `on_next` returns.
pub trait Scheduler: Send + Sync {
    /// Queues `job` to run later.
    fn schedule(&self, job: Job);
}
