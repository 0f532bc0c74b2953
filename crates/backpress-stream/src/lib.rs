//! Tokio collaborators for the `backpress` engine
//!
//! The core engine is synchronous; this crate supplies the async pieces a
//! pipeline needs around it:
//!
//! - [`bridge`]: wraps one asynchronous unit of work so that the pull
//!   continuation fires only after the work completes, which is what makes
//!   the whole chain consumer-paced
//! - [`TokioScheduler`]: a [`backpress::Scheduler`] that runs deliveries on
//!   a dedicated task, in scheduling order
//! - [`PullStream`]: exposes an engine as a `futures::Stream` that holds at
//!   most one in-flight value and requests the next only when polled again
//! - [`drive`] / [`drive_results`]: attach a `futures::Stream` as the
//!   upstream push source
//!
//! # Example
//!
//! ```ignore
//! use backpress::Backpress;
//! use backpress_stream::{drive, PullStream, StreamExt};
//!
//! #[tokio::main]
//! async fn main() {
//!     let engine = Backpress::<u64>::drop_oldest(128).unwrap();
//!     drive(engine.clone(), tokio_stream::iter(0..1_000));
//!
//!     let mut values = PullStream::new(engine, None);
//!     while let Some(item) = values.next().await {
//!         println!("processing {:?}", item);
//!     }
//! }
//! ```

mod bridge;
mod error;
mod pull_stream;
mod pump;
mod scheduler;

pub use bridge::bridge;
pub use error::StreamError;
pub use pull_stream::PullStream;
pub use pump::{drive, drive_results};
pub use scheduler::TokioScheduler;

// Re-export useful stream combinators
pub use tokio_stream::StreamExt;
