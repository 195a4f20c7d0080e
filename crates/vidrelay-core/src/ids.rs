//! Record identifier generation
//!
//! Identifiers are Unix milliseconds at creation time, bumped forward when two
//! records would otherwise share a value. Ids handed out by one generator are
//! strictly increasing.

use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct RecordIdGenerator {
    last: AtomicU64,
}

impl RecordIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start above an id that already exists in the store.
    pub fn seeded(highest_existing: u64) -> Self {
        Self {
            last: AtomicU64::new(highest_existing),
        }
    }

    pub fn next_id(&self) -> u64 {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
        self.next_id_at(now)
    }

    fn next_id_at(&self, now: u64) -> u64 {
        let mut previous = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(previous.saturating_add(1));
            match self.last.compare_exchange_weak(
                previous,
                candidate,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return candidate,
                Err(actual) => previous = actual,
            }
        }
    }
}
