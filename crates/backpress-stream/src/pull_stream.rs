//! Pull-paced `futures::Stream` adapter over a `Backpress` engine.

use crate::error::StreamError;
use backpress::{Backpress, Delivery, Observer, Resume, Scheduler, UpstreamError};
use futures_core::Stream;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tracing::warn;

/// Forwards deliveries from the engine into the stream's channel.
///
/// Capacity 1 is enough: the pull-continuation protocol guarantees at most
/// one outstanding delivery per subscription.
struct ChannelObserver<T> {
    tx: mpsc::Sender<Result<Delivery<T>, UpstreamError>>,
}

impl<T: Send + 'static> Observer<T> for ChannelObserver<T> {
    fn on_next(&self, delivery: Delivery<T>) {
        if self.tx.try_send(Ok(delivery)).is_err() {
            warn!("pull stream receiver is gone; delivery dropped");
        }
    }

    fn on_error(&self, error: UpstreamError) {
        let _ = self.tx.try_send(Err(error));
    }
}

/// Consumer-paced view of a [`Backpress`] engine as a `futures::Stream`.
///
/// The stream subscribes on first poll and thereafter resumes the previous
/// delivery's continuation only when polled for the next item. Holding an
/// unpolled `PullStream` therefore exerts backpressure: at most one value
/// is ever in flight, and everything else sits with the engine's overflow
/// policy.
///
/// An optional [`Scheduler`] decouples delivery from the producer's call
/// stack; without one, values are handed over in-line on the producer's
/// task and surface here through the channel.
///
/// The stream ends after an upstream error has been yielded.
pub struct PullStream<T> {
    engine: Backpress<T>,
    observer: Arc<ChannelObserver<T>>,
    rx: mpsc::Receiver<Result<Delivery<T>, UpstreamError>>,
    scheduler: Option<Arc<dyn Scheduler>>,
    pending_resume: Option<Resume<T>>,
    subscribed: bool,
    done: bool,
}

impl<T: Clone + Send + 'static> PullStream<T> {
    /// Creates a pull-paced stream over `engine`.
    pub fn new(engine: Backpress<T>, scheduler: Option<Arc<dyn Scheduler>>) -> Self {
        let (tx, rx) = mpsc::channel(1);
        Self {
            engine,
            observer: Arc::new(ChannelObserver { tx }),
            rx,
            scheduler,
            pending_resume: None,
            subscribed: false,
            done: false,
        }
    }

    /// Returns `true` if an upstream error terminated the stream.
    pub fn is_done(&self) -> bool {
        self.done
    }
}

impl<T: Clone + Send + 'static> Stream for PullStream<T> {
    type Item = Result<T, StreamError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        if this.done {
            return Poll::Ready(None);
        }

        // Being polled again is the consumer's commitment that the previous
        // value is finished: only now do we request the next one.
        if let Some(resume) = this.pending_resume.take() {
            resume.resume();
        } else if !this.subscribed {
            this.subscribed = true;
            this.engine.subscribe(
                Arc::clone(&this.observer) as Arc<dyn Observer<T>>,
                this.scheduler.clone(),
            );
        }

        match this.rx.poll_recv(cx) {
            Poll::Ready(Some(Ok(delivery))) => {
                let (item, resume) = delivery.into_parts();
                this.pending_resume = Some(resume);
                Poll::Ready(Some(Ok(item)))
            }
            Poll::Ready(Some(Err(error))) => {
                this.done = true;
                Poll::Ready(Some(Err(StreamError::Upstream(error))))
            }
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        }
    }
}
