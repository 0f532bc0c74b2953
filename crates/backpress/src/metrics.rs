//! Engine counters.
//!
//! Counters use relaxed atomics: they are monitoring data, not
//! synchronization, and deliveries may be recorded from a scheduler's
//! execution context.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters tracking what the engine did with every pushed value.
#[derive(Debug, Default)]
pub struct BackpressMetrics {
    /// Values handed to a consumer (in-line or scheduled).
    delivered: AtomicU64,
    /// Values parked in the overflow buffer.
    buffered: AtomicU64,
    /// Values discarded by the active policy (including evicted oldest
    /// values and values swallowed by a capitulation).
    dropped: AtomicU64,
    /// Times a give-up policy abandoned its backlog.
    capitulations: AtomicU64,
    /// Upstream errors that arrived with no pending consumer.
    unheard_errors: AtomicU64,
}

impl BackpressMetrics {
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    pub fn buffered(&self) -> u64 {
        self.buffered.load(Ordering::Relaxed)
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn capitulations(&self) -> u64 {
        self.capitulations.load(Ordering::Relaxed)
    }

    pub fn unheard_errors(&self) -> u64 {
        self.unheard_errors.load(Ordering::Relaxed)
    }

    pub(crate) fn record_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_buffered(&self) {
        self.buffered.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_capitulation(&self, abandoned: u64) {
        self.capitulations.fetch_add(1, Ordering::Relaxed);
        self.dropped.fetch_add(abandoned, Ordering::Relaxed);
    }

    pub(crate) fn record_unheard_error(&self) {
        self.unheard_errors.fetch_add(1, Ordering::Relaxed);
    }
}
