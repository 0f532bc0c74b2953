//! Error types for stream adapters.

use backpress::UpstreamError;
use thiserror::Error;

/// Errors surfaced by [`PullStream`](crate::PullStream).
#[derive(Debug, Clone, Error)]
pub enum StreamError {
    /// The upstream producer failed while this consumer was pending.
    ///
    /// Error delivery is best-effort: a failure that arrives while no
    /// consumer is pending is logged by the engine and never reaches the
    /// stream.
    #[error("upstream error: {0}")]
    Upstream(#[source] UpstreamError),
}

impl StreamError {
    /// Returns `true` if the stream is permanently finished after this
    /// error. Currently every surfaced error is terminal.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Upstream(_))
    }
}
