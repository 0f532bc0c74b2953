//! Scenario tests for the overflow policy family, driven through the
//! public engine surface.

use backpress::{Backpress, Delivery, GiveUpSignal, Observer, UpstreamError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Greedy consumer: records every delivered value (plus the latch, when
/// present) and immediately resumes, draining whatever backlog it can reach.
struct Greedy {
    items: Mutex<Vec<u64>>,
    latches: Mutex<Vec<GiveUpSignal>>,
}

impl Greedy {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            items: Mutex::new(Vec::new()),
            latches: Mutex::new(Vec::new()),
        })
    }

    fn items(&self) -> Vec<u64> {
        self.items.lock().unwrap().clone()
    }
}

impl Observer<u64> for Greedy {
    fn on_next(&self, delivery: Delivery<u64>) {
        self.items.lock().unwrap().push(*delivery.item());
        if let Some(latch) = delivery.give_up() {
            self.latches.lock().unwrap().push(latch);
        }
        let (_, resume) = delivery.into_parts();
        resume.resume();
    }

    fn on_error(&self, _error: UpstreamError) {}
}

#[test]
fn unbounded_delivers_everything_in_arrival_order() {
    let engine = Backpress::<u64>::buffered();
    for i in 0..100 {
        engine.on_next(i);
    }
    assert_eq!(engine.buffered_len(), 100);

    let consumer = Greedy::new();
    engine.subscribe(consumer.clone(), None);

    assert_eq!(consumer.items(), (0..100).collect::<Vec<_>>());
    assert_eq!(engine.buffered_len(), 0);
    assert_eq!(engine.metrics().dropped(), 0);
}

#[test]
fn drop_newest_limit_one_keeps_only_the_first_value() {
    // Three values pushed with no consumer ever subscribing: the buffer
    // ends holding exactly the first, the second and third are discarded.
    let engine = Backpress::<u64>::drop_newest(1).unwrap();
    engine.on_next(0);
    engine.on_next(1);
    engine.on_next(2);

    assert_eq!(engine.buffered_len(), 1);
    assert_eq!(engine.metrics().dropped(), 2);

    let consumer = Greedy::new();
    engine.subscribe(consumer.clone(), None);
    assert_eq!(consumer.items(), vec![0]);
}

#[test]
fn drop_oldest_limit_one_keeps_only_the_last_value() {
    let engine = Backpress::<u64>::drop_oldest(1).unwrap();
    engine.on_next(0);
    engine.on_next(1);
    engine.on_next(2);

    assert_eq!(engine.buffered_len(), 1);

    let consumer = Greedy::new();
    engine.subscribe(consumer.clone(), None);
    assert_eq!(consumer.items(), vec![2]);
}

#[test]
fn drop_newest_preserves_the_oldest_backlog() {
    let engine = Backpress::<u64>::drop_newest(3).unwrap();
    for i in 0..6 {
        engine.on_next(i);
    }

    let consumer = Greedy::new();
    engine.subscribe(consumer.clone(), None);
    assert_eq!(consumer.items(), vec![0, 1, 2]);
}

#[test]
fn drop_oldest_keeps_the_most_recent_window() {
    let engine = Backpress::<u64>::drop_oldest(3).unwrap();
    for i in 0..6 {
        engine.on_next(i);
    }

    let consumer = Greedy::new();
    engine.subscribe(consumer.clone(), None);
    assert_eq!(consumer.items(), vec![3, 4, 5]);
}

#[test]
fn give_up_trips_once_per_overflow_and_clears_the_backlog() {
    let capitulations = Arc::new(AtomicU64::new(0));
    let engine = {
        let capitulations = Arc::clone(&capitulations);
        Backpress::<u64>::give_up(2, move || {
            capitulations.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap()
    };
    let latch = engine.give_up_signal().unwrap();

    engine.on_next(0);
    engine.on_next(1);
    assert_eq!(engine.buffered_len(), 2);
    assert!(!latch.is_set());
    assert_eq!(capitulations.load(Ordering::SeqCst), 0);

    // Buffer at capacity with nobody pulling: capitulate.
    engine.on_next(2);
    assert!(latch.is_set());
    assert_eq!(capitulations.load(Ordering::SeqCst), 1);
    assert_eq!(engine.buffered_len(), 0);
    assert_eq!(engine.metrics().capitulations(), 1);

    // Only the latch is terminal: the engine keeps accepting and
    // re-buffering under the same bound, and may capitulate again.
    engine.on_next(3);
    engine.on_next(4);
    assert_eq!(engine.buffered_len(), 2);
    engine.on_next(5);
    assert_eq!(capitulations.load(Ordering::SeqCst), 2);
    assert!(latch.is_set());
}

/// One-shot consumer: takes a single value and never pulls again.
struct TakeOne {
    seen: Mutex<Option<(u64, Option<GiveUpSignal>)>>,
}

impl Observer<u64> for TakeOne {
    fn on_next(&self, delivery: Delivery<u64>) {
        *self.seen.lock().unwrap() = Some((*delivery.item(), delivery.give_up()));
    }

    fn on_error(&self, _error: UpstreamError) {}
}

#[test]
fn give_up_latch_is_visible_on_earlier_deliveries() {
    let engine = Backpress::<u64>::give_up(1, || {}).unwrap();
    let consumer = Arc::new(TakeOne { seen: Mutex::new(None) });

    // Deliver one value while the pipeline is still healthy, then stall.
    engine.subscribe(consumer.clone(), None);
    engine.on_next(10);

    let (item, held) = consumer.seen.lock().unwrap().clone().unwrap();
    let held = held.unwrap();
    assert_eq!(item, 10);
    assert!(!held.is_set());

    engine.on_next(11); // no waiter: buffered
    engine.on_next(12); // buffer full: capitulation

    // The latch taken from the earlier delivery observes it.
    assert!(held.is_set());
}

#[test]
fn deliveries_outside_give_up_carry_no_latch() {
    let engine = Backpress::<u64>::buffered();
    let consumer = Greedy::new();
    engine.subscribe(consumer.clone(), None);
    engine.on_next(1);

    assert_eq!(consumer.items(), vec![1]);
    assert!(consumer.latches.lock().unwrap().is_empty());
}
