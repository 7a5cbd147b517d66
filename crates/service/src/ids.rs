//! Identity generation for new map objects.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

/// Source of record ids. Implementations must never hand out the same id twice.
pub trait IdGenerator: Send + Sync {
    /// `None` once the id space is exhausted.
    fn next_id(&self) -> Option<u64>;
}

/// Millisecond-clock ids, strictly increasing even when the clock stalls or steps back.
#[derive(Debug, Default)]
pub struct ClockIdGenerator {
    last: AtomicU64,
}

impl ClockIdGenerator {
    pub fn new() -> Self { Self::default() }

    /// Every id handed out will be greater than `last`.
    pub fn starting_after(last: u64) -> Self {
        Self { last: AtomicU64::new(last) }
    }
}

impl IdGenerator for ClockIdGenerator {
    fn next_id(&self) -> Option<u64> {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
        let mut prev = self.last.load(Ordering::Acquire);
        loop {
            let next = now.max(prev.checked_add(1)?);
            match self.last.compare_exchange_weak(prev, next, Ordering::AcqRel, Ordering::Acquire) {
                Ok(_) => return Some(next),
                Err(actual) => prev = actual,
            }
        }
    }
}

/// Plain counter; predictable ids for tests and fixtures.
#[derive(Debug)]
pub struct SequentialIdGenerator {
    next: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn starting_at(first: u64) -> Self {
        Self { next: AtomicU64::new(first) }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> Option<u64> {
        self.next.fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_add(1)).ok()
    }
}
