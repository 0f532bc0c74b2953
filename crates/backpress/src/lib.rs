//! Push-to-pull backpressure adapter
//!
//! This crate adapts a push-based, potentially unbounded-rate stream of values
//! into a consumer-paced delivery model. Upstream calls [`Backpress::on_next`]
//! as fast as it likes; downstream receives each value as a [`Delivery`] that
//! carries a single-use [`Resume`] token. Invoking the token is how a consumer
//! commits to having finished a value and requests the next one.
//!
//! Values that arrive while no consumer is ready are handled by the overflow
//! policy chosen at construction:
//!
//! - [`Backpress::unbuffered`] discards them
//! - [`Backpress::buffered`] queues them without bound
//! - [`Backpress::drop_newest`] queues up to a limit, shedding new arrivals
//! - [`Backpress::drop_oldest`] keeps a sliding window of the newest arrivals
//! - [`Backpress::give_up`] sheds like drop-newest until the buffer fills,
//!   then abandons the backlog and raises a shared [`GiveUpSignal`]
//!
//! # Example
//!
//! ```ignore
//! use backpress::{Backpress, Delivery, Observer, UpstreamError};
//! use std::sync::Arc;
//!
//! struct Printer;
//!
//! impl Observer<u64> for Printer {
//!     fn on_next(&self, delivery: Delivery<u64>) {
//!         println!("got {}", delivery.item());
//!         let (_, resume) = delivery.into_parts();
//!         resume.resume(); // ready for the next value
//!     }
//!     fn on_error(&self, error: UpstreamError) {
//!         eprintln!("upstream failed: {error}");
//!     }
//! }
//!
//! let engine = Backpress::<u64>::buffered();
//! engine.on_next(1); // no consumer yet, buffered
//! engine.subscribe(Arc::new(Printer), None); // catches up immediately
//! ```
//!
//! The engine itself is synchronous and runtime-agnostic. Async collaborators
//! (a tokio-backed scheduler, a `futures::Stream` pull adapter, and the async
//! unit-of-work bridge) live in the companion `backpress-stream` crate.

mod delivery;
mod engine;
mod error;
mod give_up;
mod metrics;
mod observer;
mod policy;
mod scheduler;

pub use delivery::{Delivery, Resume};
pub use engine::Backpress;
pub use error::BackpressError;
pub use give_up::GiveUpSignal;
pub use metrics::BackpressMetrics;
pub use observer::{Observer, UpstreamError};
pub use scheduler::{Job, Scheduler};
