//! Demonstration of the backpress engine and its async collaborators.
//!
//! Run with: `cargo run -p backpress-stream --bin demo`

use backpress::Backpress;
use backpress_stream::{bridge, drive, PullStream, StreamExt};
use std::convert::Infallible;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    println!("=== backpress demo ===\n");

    demo_backlog_catchup().await?;
    demo_drop_policies().await?;
    demo_give_up().await?;
    demo_pull_pacing().await?;

    println!("\n=== all demos completed ===");
    Ok(())
}

/// Demo 1: values pushed before any consumer exists are buffered, and a
/// late subscriber catches up in order.
async fn demo_backlog_catchup() -> Result<(), Box<dyn std::error::Error>> {
    println!("--- Demo 1: Backlog catch-up ---");

    let engine = Backpress::<u64>::buffered();
    for i in 0..5 {
        engine.on_next(i);
    }
    println!("  pushed 5 values with no consumer; buffered: {}", engine.buffered_len());

    let stream = PullStream::new(engine.clone(), None);
    let received: Vec<u64> = stream.take(5).map(Result::unwrap).collect().await;
    println!("  late consumer received: {received:?}");

    println!("  ✓ backlog drained\n");
    Ok(())
}

/// Demo 2: bounded policies shed opposite ends of the backlog.
async fn demo_drop_policies() -> Result<(), Box<dyn std::error::Error>> {
    println!("--- Demo 2: Bounded drop policies (limit 3, pushes 0..10) ---");

    let newest = Backpress::<u64>::drop_newest(3)?;
    let oldest = Backpress::<u64>::drop_oldest(3)?;
    for i in 0..10 {
        newest.on_next(i);
        oldest.on_next(i);
    }

    let kept_newest: Vec<u64> = PullStream::new(newest, None).take(3).map(Result::unwrap).collect().await;
    let kept_oldest: Vec<u64> = PullStream::new(oldest, None).take(3).map(Result::unwrap).collect().await;

    println!("  drop-newest kept the oldest backlog: {kept_newest:?}");
    println!("  drop-oldest kept the freshest window: {kept_oldest:?}");
    println!("  ✓ bounded policies\n");
    Ok(())
}

/// Demo 3: sustained overload trips the give-up latch.
async fn demo_give_up() -> Result<(), Box<dyn std::error::Error>> {
    println!("--- Demo 3: Give-up on sustained overload ---");

    let capitulations = Arc::new(AtomicU64::new(0));
    let engine = {
        let capitulations = Arc::clone(&capitulations);
        Backpress::<u64>::give_up(4, move || {
            capitulations.fetch_add(1, Ordering::SeqCst);
        })?
    };
    let latch = engine.give_up_signal().expect("give-up policy has a latch");

    for i in 0..10 {
        engine.on_next(i);
    }

    println!(
        "  pushed 10 values into a limit-4 buffer: capitulations={}, latch set={}",
        capitulations.load(Ordering::SeqCst),
        latch.is_set(),
    );
    println!("  engine still accepts values; buffered now: {}", engine.buffered_len());
    println!("  ✓ give-up\n");
    Ok(())
}

/// Demo 4: the async bridge makes a fast producer wait for a slow consumer.
async fn demo_pull_pacing() -> Result<(), Box<dyn std::error::Error>> {
    use backpress::{Delivery, Observer, UpstreamError};
    use tokio::sync::mpsc;

    println!("--- Demo 4: Pull pacing through the async bridge ---");

    struct Forward {
        tx: mpsc::UnboundedSender<Delivery<u64>>,
    }

    impl Observer<u64> for Forward {
        fn on_next(&self, delivery: Delivery<u64>) {
            let _ = self.tx.send(delivery);
        }

        fn on_error(&self, _error: UpstreamError) {}
    }

    let engine = Backpress::<u64>::buffered();

    // Produce every 10 ms.
    let ticks = tokio_stream::wrappers::IntervalStream::new(tokio::time::interval(
        Duration::from_millis(10),
    ));
    let mut next = 0u64;
    let pump = drive(
        engine.clone(),
        ticks.map(move |_| {
            let value = next;
            next += 1;
            value
        }),
    );

    let (tx, mut rx) = mpsc::unbounded_channel();
    engine.subscribe(Arc::new(Forward { tx }), None);

    // Each value takes 50 ms to process; the bridge requests the next one
    // only after that work finishes.
    let mut work = bridge(|value: u64| async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok::<u64, Infallible>(value)
    });

    let mut processed = Vec::new();
    let _ = tokio::time::timeout(Duration::from_millis(300), async {
        while let Some(delivery) = rx.recv().await {
            let value = work(delivery).await.expect("work failed");
            processed.push(value);
        }
    })
    .await;
    pump.abort();

    println!("  in 300 ms the producer emitted ~30 values; consumer finished {}", processed.len());
    println!("  processed in order: {processed:?}");
    println!("  backlog still parked in the engine: {}", engine.buffered_len());
    println!("  ✓ pull pacing\n");
    Ok(())
}
