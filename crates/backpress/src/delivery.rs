//! The pull-continuation protocol: each delivered value is paired with a
//! single-use resumption token.

use crate::engine::Backpress;
use crate::give_up::GiveUpSignal;
use crate::observer::Observer;
use crate::scheduler::Scheduler;
use std::fmt;
use std::sync::Arc;

/// One value handed to a consumer, together with its pull-continuation.
///
/// Under the give-up policy a delivery also carries the shared
/// [`GiveUpSignal`], so downstream can check "has this pipeline given up"
/// alongside each received value.
pub struct Delivery<T> {
    item: T,
    give_up: Option<GiveUpSignal>,
    resume: Resume<T>,
}

impl<T> Delivery<T> {
    pub(crate) fn new(item: T, give_up: Option<GiveUpSignal>, resume: Resume<T>) -> Self {
        Self { item, give_up, resume }
    }

    /// The delivered value.
    pub fn item(&self) -> &T {
        &self.item
    }

    /// The shared capitulation latch, present only under the give-up policy.
    ///
    /// The returned clone stays valid after [`into_parts`](Self::into_parts),
    /// so a consumer can keep it and observe a later capitulation.
    pub fn give_up(&self) -> Option<GiveUpSignal> {
        self.give_up.clone()
    }

    /// Splits the delivery into the value and its resumption token.
    pub fn into_parts(self) -> (T, Resume<T>) {
        (self.item, self.resume)
    }
}

impl<T: fmt::Debug> fmt::Debug for Delivery<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Delivery")
            .field("item", &self.item)
            .field("given_up", &self.give_up.as_ref().map(GiveUpSignal::is_set))
            .finish_non_exhaustive()
    }
}

/// Resumption token closing over one (observer, scheduler) pair.
///
/// Resuming re-enters the subscription path for that consumer: the active
/// policy may satisfy it immediately from the buffer, otherwise the
/// consumer is registered to wait for the next pushed value. The token is
/// consumed on use, so each delivery can be acknowledged at most once.
pub struct Resume<T> {
    pub(crate) engine: Backpress<T>,
    pub(crate) observer: Arc<dyn Observer<T>>,
    pub(crate) scheduler: Option<Arc<dyn Scheduler>>,
}

impl<T: Clone + Send + 'static> Resume<T> {
    /// Requests the next value for the consumer this token was issued to.
    pub fn resume(self) {
        self.engine.subscribe(self.observer, self.scheduler);
    }
}

impl<T> fmt::Debug for Resume<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resume")
            .field("scheduled", &self.scheduler.is_some())
            .finish_non_exhaustive()
    }
}
