//! Consumer-side trait for receiving deliveries.

use crate::delivery::Delivery;
use std::error::Error;
use std::sync::Arc;

/// Error signalled by the upstream producer.
///
/// A single upstream failure fans out to every pending consumer, so the
/// error is shared rather than owned.
pub type UpstreamError = Arc<dyn Error + Send + Sync + 'static>;

/// A consumer of values flowing through a [`Backpress`](crate::Backpress)
/// engine.
///
/// The engine holds an observer only for the duration of one pending
/// delivery: after `on_next` runs, the observer is re-registered only by
/// resuming the delivery's [`Resume`](crate::Resume) token.
pub trait Observer<T>: Send + Sync {
    /// Receives one value together with its pull-continuation.
    fn on_next(&self, delivery: Delivery<T>);

    /// Receives an upstream failure.
    fn on_error(&self, error: UpstreamError);
}
