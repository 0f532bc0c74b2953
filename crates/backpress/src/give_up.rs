//! One-shot capitulation latch.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared flag raised when a give-up policy abandons its backlog.
///
/// The latch is monotonic: once set it stays set for the lifetime of the
/// engine instance. Clones share the same flag, so a consumer holding a
/// signal taken from an earlier delivery observes a later capitulation.
///
/// Only the engine writes the flag; everything downstream just reads it.
#[derive(Debug, Clone, Default)]
pub struct GiveUpSignal {
    flag: Arc<AtomicBool>,
}

impl GiveUpSignal {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Raises the latch. Idempotent.
    pub(crate) fn announce(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Returns `true` if the pipeline has given up.
    #[inline]
    pub fn is_set(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latch_starts_clear_and_stays_set() {
        let signal = GiveUpSignal::new();
        let held = signal.clone();
        assert!(!signal.is_set());
        assert!(!held.is_set());

        signal.announce();
        assert!(signal.is_set());
        // An earlier clone sees the same flag.
        assert!(held.is_set());

        // Announcing again changes nothing.
        signal.announce();
        assert!(held.is_set());
    }
}
