//! Attaches a `futures::Stream` as the engine's upstream push source.

use backpress::Backpress;
use futures_util::StreamExt;
use std::error::Error;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Forwards every item of `source` into the engine via `on_next`.
///
/// This is the attachment point for an infallible push source: the spawned
/// task pushes at whatever rate `source` produces, and the engine's
/// overflow policy absorbs the difference from the consumer's pace.
/// Dropping or aborting the returned handle stops future pushes, which is
/// the extent of cancellation at this stage.
pub fn drive<S, T>(engine: Backpress<T>, source: S) -> JoinHandle<()>
where
    S: futures_core::Stream<Item = T> + Send + 'static,
    T: Clone + Send + 'static,
{
    tokio::spawn(async move {
        futures_util::pin_mut!(source);
        while let Some(item) = source.next().await {
            engine.on_next(item);
        }
    })
}

/// Forwards a fallible stream, routing `Err` items into `on_error`.
///
/// The pump keeps going after an error; a source that terminates on
/// failure should simply end after yielding its `Err`.
pub fn drive_results<S, T, E>(engine: Backpress<T>, source: S) -> JoinHandle<()>
where
    S: futures_core::Stream<Item = Result<T, E>> + Send + 'static,
    T: Clone + Send + 'static,
    E: Error + Send + Sync + 'static,
{
    tokio::spawn(async move {
        futures_util::pin_mut!(source);
        while let Some(next) = source.next().await {
            match next {
                Ok(item) => engine.on_next(item),
                Err(error) => engine.on_error(Arc::new(error)),
            }
        }
    })
}
