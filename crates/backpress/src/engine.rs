//! Observer registry and send dispatcher.

use crate::delivery::{Delivery, Resume};
use crate::error::BackpressError;
use crate::give_up::GiveUpSignal;
use crate::metrics::BackpressMetrics;
use crate::observer::{Observer, UpstreamError};
use crate::policy::{OverflowOutcome, PolicyState};
use crate::scheduler::Scheduler;
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::warn;

/// Push-to-pull backpressure engine.
///
/// Upstream pushes through [`on_next`](Self::on_next) /
/// [`on_error`](Self::on_error); downstream pulls by calling
/// [`subscribe`](Self::subscribe) once and then resuming each
/// [`Delivery`]'s token after finishing the value.
///
/// The engine performs no concurrency of its own: it runs on whatever
/// thread or task the producer (or a subscription's [`Scheduler`]) uses.
/// It expects a single logical producer sequence; concurrent `on_next`
/// calls from multiple producers are not supported.
///
/// `Backpress` is a cheap cloneable handle; clones share the same registry,
/// buffer and metrics.
pub struct Backpress<T> {
    shared: Arc<Mutex<Inner<T>>>,
    metrics: Arc<BackpressMetrics>,
}

impl<T> Clone for Backpress<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            metrics: Arc::clone(&self.metrics),
        }
    }
}

struct Inner<T> {
    /// Consumers that are ready for a value but have not received one yet,
    /// in arrival order.
    waiters: VecDeque<Waiter<T>>,
    policy: PolicyState<T>,
}

struct Waiter<T> {
    observer: Arc<dyn Observer<T>>,
    scheduler: Option<Arc<dyn Scheduler>>,
}

impl<T: Clone + Send + 'static> Backpress<T> {
    fn with_policy(policy: PolicyState<T>) -> Self {
        Self {
            shared: Arc::new(Mutex::new(Inner {
                waiters: VecDeque::new(),
                policy,
            })),
            metrics: Arc::new(BackpressMetrics::default()),
        }
    }

    /// No buffering: a value arriving with no waiting consumer is discarded.
    pub fn unbuffered() -> Self {
        Self::with_policy(PolicyState::Unbuffered)
    }

    /// Unbounded buffering: no value is ever dropped. A consumer slower
    /// than the producer grows the buffer without bound.
    pub fn buffered() -> Self {
        Self::with_policy(PolicyState::Buffered {
            buffer: VecDeque::new(),
        })
    }

    /// Bounded buffering that keeps the oldest backlog and sheds new
    /// arrivals once `limit` values are parked.
    pub fn drop_newest(limit: usize) -> Result<Self, BackpressError> {
        if limit == 0 {
            return Err(BackpressError::ZeroLimit);
        }
        Ok(Self::with_policy(PolicyState::DropNewest {
            buffer: VecDeque::with_capacity(limit),
            limit,
        }))
    }

    /// Bounded buffering that always keeps the most recent `limit` values,
    /// evicting the oldest to make room.
    pub fn drop_oldest(limit: usize) -> Result<Self, BackpressError> {
        if limit == 0 {
            return Err(BackpressError::ZeroLimit);
        }
        Ok(Self::with_policy(PolicyState::DropOldest {
            buffer: VecDeque::with_capacity(limit),
            limit,
        }))
    }

    /// Drop-newest bound that treats a full buffer as sustained overload:
    /// the backlog is abandoned, the shared [`GiveUpSignal`] is raised and
    /// `on_capitulate` runs (outside the engine lock). The engine keeps
    /// accepting values afterwards; only the latch is terminal.
    pub fn give_up(
        limit: usize,
        on_capitulate: impl Fn() + Send + Sync + 'static,
    ) -> Result<Self, BackpressError> {
        if limit == 0 {
            return Err(BackpressError::ZeroLimit);
        }
        Ok(Self::with_policy(PolicyState::GiveUp {
            buffer: VecDeque::with_capacity(limit),
            limit,
            latch: GiveUpSignal::new(),
            on_capitulate: Arc::new(on_capitulate),
        }))
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Pushes one value from upstream.
    ///
    /// If consumers are waiting, every one of them (in registration order)
    /// receives this value and the registry is left empty. Otherwise the
    /// active overflow policy decides the value's fate.
    pub fn on_next(&self, item: T) {
        let drained: Vec<Waiter<T>> = {
            let mut inner = self.lock();
            if inner.waiters.is_empty() {
                let outcome = inner.policy.handle_no_observers(item, &self.metrics);
                drop(inner);
                if let OverflowOutcome::Capitulated(hook) = outcome {
                    (*hook)();
                }
                return;
            }
            inner.waiters.drain(..).collect()
        };

        // Snapshot-then-clear-then-iterate: the registry was emptied under
        // the lock, so a subscription arriving during this dispatch starts a
        // fresh registry and can never receive `item` twice.
        for waiter in drained {
            self.send_or_schedule(waiter.observer, waiter.scheduler, item.clone());
        }
    }

    /// Signals an upstream failure.
    ///
    /// Propagated to every pending consumer if any exist; otherwise logged
    /// and dropped. Error delivery is best-effort by design.
    pub fn on_error(&self, error: UpstreamError) {
        let drained: Vec<Waiter<T>> = {
            let mut inner = self.lock();
            if inner.waiters.is_empty() {
                drop(inner);
                self.metrics.record_unheard_error();
                warn!(error = %error, "upstream error with no pending consumer");
                return;
            }
            inner.waiters.drain(..).collect()
        };
        for waiter in drained {
            waiter.observer.on_error(Arc::clone(&error));
        }
    }

    /// Registers a pull request for `observer`.
    ///
    /// If the active policy holds buffered backlog, the oldest value is
    /// delivered immediately (bypassing the registry); otherwise the
    /// observer waits, FIFO, for the next pushed value. With a scheduler
    /// the delivery is posted as a single job instead of running in-line.
    pub fn subscribe(&self, observer: Arc<dyn Observer<T>>, scheduler: Option<Arc<dyn Scheduler>>) {
        let caught_up = {
            let mut inner = self.lock();
            match inner.policy.subscribe_hook() {
                Some(item) => Some(item),
                None => {
                    inner.waiters.push_back(Waiter {
                        observer: Arc::clone(&observer),
                        scheduler: scheduler.clone(),
                    });
                    None
                }
            }
        };
        if let Some(item) = caught_up {
            self.send_or_schedule(observer, scheduler, item);
        }
    }

    fn send_or_schedule(
        &self,
        observer: Arc<dyn Observer<T>>,
        scheduler: Option<Arc<dyn Scheduler>>,
        item: T,
    ) {
        match scheduler {
            None => self.send(observer, None, item),
            Some(scheduler) => {
                let engine = self.clone();
                let job_scheduler = Arc::clone(&scheduler);
                scheduler.schedule(Box::new(move || {
                    engine.send(observer, Some(job_scheduler), item);
                }));
            }
        }
    }

    /// Delivers one value, pairing it with a fresh pull-continuation bound
    /// to the same (observer, scheduler) and, under the give-up policy, the
    /// shared latch.
    fn send(&self, observer: Arc<dyn Observer<T>>, scheduler: Option<Arc<dyn Scheduler>>, item: T) {
        let give_up = self.lock().policy.latch();
        let resume = Resume {
            engine: self.clone(),
            observer: Arc::clone(&observer),
            scheduler,
        };
        self.metrics.record_delivered();
        observer.on_next(Delivery::new(item, give_up, resume));
    }

    /// Engine counters.
    pub fn metrics(&self) -> &Arc<BackpressMetrics> {
        &self.metrics
    }

    /// The shared capitulation latch, give-up policy only.
    pub fn give_up_signal(&self) -> Option<GiveUpSignal> {
        self.lock().policy.latch()
    }

    /// Number of values currently parked in the overflow buffer.
    pub fn buffered_len(&self) -> usize {
        self.lock().policy.buffered_len()
    }

    /// Number of consumers waiting for the next value.
    pub fn waiter_count(&self) -> usize {
        self.lock().waiters.len()
    }
}

impl<T> fmt::Debug for Backpress<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.shared.lock().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("Backpress")
            .field("waiters", &inner.waiters.len())
            .field("policy", &inner.policy)
            .finish()
    }
}
