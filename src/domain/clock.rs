use chrono::{DateTime, Duration, Local};
use std::sync::{Arc, Mutex};

/// Source of server wall-clock time.
///
/// Day boundaries and the punctuality cutoff are evaluated in server local time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

pub type ClockPtr = Arc<dyn Clock>;

/// The real system clock.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// A manually driven clock for replays and tests.
pub struct FixedClock {
    // ---
    now: Mutex<DateTime<Local>>,
}

impl FixedClock {
    // ---
    pub fn new(now: DateTime<Local>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Local>) {
        // ---
        let mut guard = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = now;
    }

    pub fn advance(&self, by: Duration) {
        // ---
        let mut guard = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn fixed_clock_moves_only_when_told() {
        // ---
        let start = Local.with_ymd_and_hms(2026, 10, 16, 8, 30, 0).unwrap();
        let clock = FixedClock::new(start);

        assert_eq!(clock.now(), start);

        clock.advance(Duration::minutes(35));
        assert_eq!(clock.now(), start + Duration::minutes(35));

        let next_day = Local.with_ymd_and_hms(2026, 10, 17, 9, 5, 0).unwrap();
        clock.set(next_day);
        assert_eq!(clock.now(), next_day);
    }
}
