//! Overflow policy family.
//!
//! Each variant decides what happens to a value that arrives while no
//! consumer is ready. The family is a closed set sharing two hooks:
//! `subscribe_hook` (may satisfy a fresh subscription straight from the
//! buffer) and `handle_no_observers` (buffer, drop, or give up).

use crate::give_up::GiveUpSignal;
use crate::metrics::BackpressMetrics;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// Application hook invoked when a give-up policy capitulates, e.g. to
/// cancel the upstream producer.
pub(crate) type CapitulationHook = Arc<dyn Fn() + Send + Sync>;

/// What `handle_no_observers` did with the value.
pub(crate) enum OverflowOutcome {
    /// Value was buffered or silently discarded.
    Absorbed,
    /// Buffer hit its limit with nobody pulling: backlog abandoned.
    /// The hook must be invoked by the caller, outside the engine lock.
    Capitulated(CapitulationHook),
}

pub(crate) enum PolicyState<T> {
    /// Base behavior: a value with no waiting consumer is discarded.
    Unbuffered,
    /// Queue without bound; nothing is ever dropped.
    Buffered { buffer: VecDeque<T> },
    /// Bounded queue preserving the oldest backlog.
    DropNewest { buffer: VecDeque<T>, limit: usize },
    /// Bounded sliding window keeping the newest values.
    DropOldest { buffer: VecDeque<T>, limit: usize },
    /// Drop-newest bound that abandons the backlog entirely when it fills.
    GiveUp {
        buffer: VecDeque<T>,
        limit: usize,
        latch: GiveUpSignal,
        on_capitulate: CapitulationHook,
    },
}

impl<T> PolicyState<T> {
    /// Pops the oldest buffered value, if any, so a fresh subscription can
    /// catch up on backlog without touching the registry.
    pub(crate) fn subscribe_hook(&mut self) -> Option<T> {
        match self {
            Self::Unbuffered => None,
            Self::Buffered { buffer }
            | Self::DropNewest { buffer, .. }
            | Self::DropOldest { buffer, .. }
            | Self::GiveUp { buffer, .. } => buffer.pop_front(),
        }
    }

    /// Handles a value that arrived with no consumer waiting.
    pub(crate) fn handle_no_observers(
        &mut self,
        item: T,
        metrics: &BackpressMetrics,
    ) -> OverflowOutcome {
        match self {
            Self::Unbuffered => {
                metrics.record_dropped();
                OverflowOutcome::Absorbed
            }
            Self::Buffered { buffer } => {
                buffer.push_back(item);
                metrics.record_buffered();
                OverflowOutcome::Absorbed
            }
            Self::DropNewest { buffer, limit } => {
                if buffer.len() < *limit {
                    buffer.push_back(item);
                    metrics.record_buffered();
                } else {
                    metrics.record_dropped();
                }
                OverflowOutcome::Absorbed
            }
            Self::DropOldest { buffer, limit } => {
                if buffer.len() >= *limit {
                    buffer.pop_front();
                    metrics.record_dropped();
                }
                buffer.push_back(item);
                metrics.record_buffered();
                OverflowOutcome::Absorbed
            }
            Self::GiveUp {
                buffer,
                limit,
                latch,
                on_capitulate,
            } => {
                if buffer.len() >= *limit {
                    // Sustained overload: stop trying to catch up. The latch
                    // is one-shot but the policy keeps accepting afterwards,
                    // re-buffering future values under the same bound.
                    latch.announce();
                    let abandoned = buffer.len() as u64;
                    buffer.clear();
                    metrics.record_capitulation(abandoned + 1);
                    warn!(abandoned, limit = *limit, "backpressure gave up; backlog abandoned");
                    OverflowOutcome::Capitulated(Arc::clone(on_capitulate))
                } else {
                    buffer.push_back(item);
                    metrics.record_buffered();
                    OverflowOutcome::Absorbed
                }
            }
        }
    }

    /// The shared latch attached to every delivery, give-up policy only.
    pub(crate) fn latch(&self) -> Option<GiveUpSignal> {
        match self {
            Self::GiveUp { latch, .. } => Some(latch.clone()),
            _ => None,
        }
    }

    pub(crate) fn buffered_len(&self) -> usize {
        match self {
            Self::Unbuffered => 0,
            Self::Buffered { buffer }
            | Self::DropNewest { buffer, .. }
            | Self::DropOldest { buffer, .. }
            | Self::GiveUp { buffer, .. } => buffer.len(),
        }
    }
}

impl<T> fmt::Debug for PolicyState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unbuffered => f.write_str("Unbuffered"),
            Self::Buffered { buffer } => {
                f.debug_struct("Buffered").field("len", &buffer.len()).finish()
            }
            Self::DropNewest { buffer, limit } => f
                .debug_struct("DropNewest")
                .field("len", &buffer.len())
                .field("limit", limit)
                .finish(),
            Self::DropOldest { buffer, limit } => f
                .debug_struct("DropOldest")
                .field("len", &buffer.len())
                .field("limit", limit)
                .finish(),
            Self::GiveUp { buffer, limit, latch, .. } => f
                .debug_struct("GiveUp")
                .field("len", &buffer.len())
                .field("limit", limit)
                .field("given_up", &latch.is_set())
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain<T>(state: &mut PolicyState<T>) -> Vec<T> {
        std::iter::from_fn(|| state.subscribe_hook()).collect()
    }

    #[test]
    fn drop_newest_sheds_excess_arrivals() {
        let metrics = BackpressMetrics::default();
        let mut state = PolicyState::DropNewest { buffer: VecDeque::new(), limit: 2 };
        for i in 0..5 {
            state.handle_no_observers(i, &metrics);
        }
        assert_eq!(state.buffered_len(), 2);
        assert_eq!(drain(&mut state), vec![0, 1]);
        assert_eq!(metrics.dropped(), 3);
    }

    #[test]
    fn drop_oldest_keeps_a_sliding_window() {
        let metrics = BackpressMetrics::default();
        let mut state = PolicyState::DropOldest { buffer: VecDeque::new(), limit: 2 };
        for i in 0..5 {
            state.handle_no_observers(i, &metrics);
        }
        assert_eq!(drain(&mut state), vec![3, 4]);
    }

    #[test]
    fn give_up_clears_backlog_at_capacity() {
        let metrics = BackpressMetrics::default();
        let latch = GiveUpSignal::new();
        let mut state = PolicyState::GiveUp {
            buffer: VecDeque::new(),
            limit: 2,
            latch: latch.clone(),
            on_capitulate: Arc::new(|| {}),
        };

        state.handle_no_observers(0, &metrics);
        state.handle_no_observers(1, &metrics);
        assert!(!latch.is_set());

        let outcome = state.handle_no_observers(2, &metrics);
        assert!(matches!(outcome, OverflowOutcome::Capitulated(_)));
        assert!(latch.is_set());
        assert_eq!(state.buffered_len(), 0);
        // Two abandoned plus the arrival that tripped the latch.
        assert_eq!(metrics.dropped(), 3);

        // The policy keeps accepting after capitulating.
        state.handle_no_observers(3, &metrics);
        assert_eq!(state.buffered_len(), 1);
    }
}
