use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

use crate::store::Timestamp;

/// Source of "now", truncated to whole UTC seconds.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// The `secs` whole seconds ending at `now`, both ends inclusive. Empty when
/// `secs` is zero.
pub fn trailing_window(now: Timestamp, secs: u32) -> RangeInclusive<Timestamp> {
    (now - i64::from(secs) + 1)..=now
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now().timestamp()
    }
}

/// Manually driven clock for tests and replays.
#[derive(Debug, Default)]
pub struct FixedClock {
    now: AtomicI64,
}

impl FixedClock {
    pub fn new(now: Timestamp) -> Self {
        Self {
            now: AtomicI64::new(now),
        }
    }

    pub fn set(&self, now: Timestamp) {
        self.now.store(now, Ordering::SeqCst);
    }

    /// Move the clock forward (or backward, for negative `secs`).
    pub fn advance(&self, secs: i64) -> Timestamp {
        self.now.fetch_add(secs, Ordering::SeqCst) + secs
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.now.load(Ordering::SeqCst)
    }
}
