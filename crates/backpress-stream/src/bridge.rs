//! Async bridge: one unit of work per delivery, pull-paced.

use backpress::Delivery;
use futures_util::future::BoxFuture;
use std::future::Future;

/// Adapts an asynchronous unit of work to the pull-continuation protocol.
///
/// The returned closure takes one [`Delivery`] and produces a future that
/// runs `work` on the delivered value, resumes the continuation once the
/// work has completed successfully, and yields the work's result. The
/// next-value request therefore happens strictly after the unit of work
/// finishes: the producer can never advance past a consumer still
/// mid-work, and the pipeline stays at most one in-flight value ahead.
///
/// A failing unit of work is not special-cased: the error propagates to
/// the caller and the continuation is never invoked, so the pull loop
/// stops with it.
///
/// # Example
///
/// ```ignore
/// let mut work = bridge(|order: Order| async move {
///     fulfil(order).await // Result<Receipt, FulfilError>
/// });
///
/// while let Some(delivery) = deliveries.recv().await {
///     let receipt = work(delivery).await?;
///     record(receipt);
/// }
/// ```
pub fn bridge<T, R, E, F, Fut>(mut work: F) -> impl FnMut(Delivery<T>) -> BoxFuture<'static, Result<R, E>>
where
    T: Clone + Send + 'static,
    R: Send + 'static,
    E: Send + 'static,
    F: FnMut(T) -> Fut,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
{
    move |delivery| {
        let (item, resume) = delivery.into_parts();
        let fut = work(item);
        Box::pin(async move {
            let out = fut.await?;
            // Work done: commit to it and request the next value.
            resume.resume();
            Ok(out)
        })
    }
}
