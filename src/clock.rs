//! Time sources for last-modified stamps.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::record::Stamp;

/// Source of wall-clock stamps. May jump backwards; the concurrency
/// controller never hands out a stamp that does not move forward.
pub trait Clock: Send + Sync {
    fn now(&self) -> Stamp;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Stamp {
        let micros = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_micros() as u64)
            .unwrap_or(0);
        Stamp::from_micros(micros)
    }
}

/// A clock that only moves when told to. Useful for skew tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    micros: AtomicU64,
}

impl ManualClock {
    pub fn new(start: Stamp) -> Self {
        Self {
            micros: AtomicU64::new(start.as_micros()),
        }
    }

    pub fn set(&self, stamp: Stamp) {
        self.micros.store(stamp.as_micros(), Ordering::SeqCst);
    }

    pub fn advance(&self, micros: u64) {
        self.micros.fetch_add(micros, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Stamp {
        Stamp::from_micros(self.micros.load(Ordering::SeqCst))
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> Stamp {
        (**self).now()
    }
}
