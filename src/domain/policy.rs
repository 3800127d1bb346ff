use super::models::AttendanceStatus;
use chrono::NaiveTime;

/// Decides whether a check-in time counts as on time.
///
/// The cutoff itself is on time: with the default 09:00 cutoff, 09:00:00.000
/// is `PRESENT` and 09:00:00.001 is already `LATE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PunctualityPolicy {
    // ---
    cutoff: NaiveTime,
}

impl PunctualityPolicy {
    // ---
    pub fn new(cutoff: NaiveTime) -> Self {
        Self { cutoff }
    }

    pub fn cutoff(&self) -> NaiveTime {
        self.cutoff
    }

    pub fn classify(&self, local_time: NaiveTime) -> AttendanceStatus {
        // ---
        if local_time > self.cutoff {
            AttendanceStatus::Late
        } else {
            AttendanceStatus::Present
        }
    }
}

impl Default for PunctualityPolicy {
    fn default() -> Self {
        Self::new(NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default())
    }
}
