//! Single-permit cooldown guard for the treat trigger.
//!
//! The check and the timestamp update happen in one atomic `fetch_update`,
//! so concurrent webhook deliveries inside the same window can never both
//! acquire the permit.

use crate::services::clock::{Clock, SystemClock};
use chrono::{DateTime, TimeZone, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

const NEVER_FIRED: u64 = 0;

#[derive(Debug)]
pub struct Debouncer {
    cooldown_ms: u64,
    last_fired_ms: AtomicU64,
    clock: Arc<dyn Clock>,
}

impl Debouncer {
    pub fn new(cooldown: Duration) -> Self {
        Self::with_clock(cooldown, Arc::new(SystemClock))
    }

    pub fn with_clock(cooldown: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            cooldown_ms: cooldown.as_millis() as u64,
            last_fired_ms: AtomicU64::new(NEVER_FIRED),
            clock,
        }
    }

    /// Takes the permit if the cooldown has elapsed since the last
    /// successful acquisition, recording `now` as the new fire time.
    pub fn try_acquire(&self) -> bool {
        let now = self.clock.now_millis();
        let cooldown = self.cooldown_ms;

        self.last_fired_ms
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                // A clock that went backwards saturates to 0 elapsed.
                if last == NEVER_FIRED || now.saturating_sub(last) >= cooldown {
                    Some(now)
                } else {
                    None
                }
            })
            .is_ok()
    }

    pub fn remaining(&self) -> Duration {
        let last = self.last_fired_ms.load(Ordering::SeqCst);
        if last == NEVER_FIRED {
            return Duration::ZERO;
        }
        let elapsed = self.clock.now_millis().saturating_sub(last);
        Duration::from_millis(self.cooldown_ms.saturating_sub(elapsed))
    }

    pub fn last_fired(&self) -> Option<DateTime<Utc>> {
        match self.last_fired_ms.load(Ordering::SeqCst) {
            NEVER_FIRED => None,
            ms => Utc.timestamp_millis_opt(ms as i64).single(),
        }
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}
