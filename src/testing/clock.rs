use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::store::Clock;

/// A clock that only moves when told to
///
/// Clones share the same time, so one handle can drive the store and the
/// browser-side jar together.
#[derive(Debug, Clone)]
pub struct ManualClock {
    seconds: Arc<AtomicI64>,
}

impl ManualClock {
    #[must_use]
    pub fn starting_at(seconds: i64) -> Self {
        Self {
            seconds: Arc::new(AtomicI64::new(seconds)),
        }
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.seconds.load(Ordering::SeqCst), 0).unwrap_or_default()
    }

    #[must_use]
    pub fn timestamp(&self) -> i64 {
        self.seconds.load(Ordering::SeqCst)
    }

    pub fn advance(&self, seconds: i64) {
        self.seconds.fetch_add(seconds, Ordering::SeqCst);
    }

    pub fn set(&self, seconds: i64) {
        self.seconds.store(seconds, Ordering::SeqCst);
    }

    /// A [`Clock`] reading this manual time
    #[must_use]
    pub fn clock(&self) -> Clock {
        let handle = self.clone();
        Arc::new(move || handle.now())
    }
}
