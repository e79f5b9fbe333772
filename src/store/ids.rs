//! Time-based record identity.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

/// Issues epoch-millisecond ids. Two calls within the same millisecond get
/// consecutive values, so ids stay unique and increasing within the process.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicI64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> i64 {
        self.next_at(Utc::now().timestamp_millis())
    }

    fn next_at(&self, now_millis: i64) -> i64 {
        let mut previous = self.last.load(Ordering::SeqCst);
        loop {
            let candidate = now_millis.max(previous + 1);
            match self.last.compare_exchange(
                previous,
                candidate,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => return candidate,
                Err(actual) => previous = actual,
            }
        }
    }
}
