//! Logical time sources
//!
//! The ledger never reads wall-clock time itself: every operation takes `now`
//! explicitly and the orchestration layer asks a [`Clock`] for it.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::types::amount::Timestamp;

/// Source of logical time, expected to be monotonically non-decreasing
pub trait Clock: Send + Sync {
    /// Current logical time in seconds
    fn now(&self) -> Timestamp;
}

/// Wall clock in Unix seconds
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        chrono::Utc::now().timestamp().max(0) as Timestamp
    }
}

/// Manually driven clock for simulations and tests
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: AtomicU64::new(start),
        }
    }

    /// Move time forward by `seconds`
    pub fn advance(&self, seconds: u64) -> Timestamp {
        self.now.fetch_add(seconds, Ordering::SeqCst) + seconds
    }

    /// Jump to an absolute time. Going backwards is allowed here so callers can
    /// exercise the ledger's regression checks.
    pub fn set(&self, now: Timestamp) {
        self.now.store(now, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.load(Ordering::SeqCst)
    }
}
