//! Error types for engine construction.

use thiserror::Error;

/// Errors produced when configuring a [`Backpress`](crate::Backpress) engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BackpressError {
    /// A bounded overflow policy was given a zero capacity.
    #[error("bounded overflow policy requires a limit of at least 1")]
    ZeroLimit,
}
