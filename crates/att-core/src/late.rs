//! Late-arrival detection.
//!
//! Compares a day's first entry with the expected start of work. This only
//! needs the first `in` swipe; validity rules of the reconstructor do not
//! apply. Weekends are skipped unless the policy enables them.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::daily::is_workday;

/// When work starts and how late counts as late.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatePolicy {
    /// Expected arrival. Default: 09:00.
    pub work_start: NaiveTime,

    /// Minutes after `work_start` before an arrival is reported.
    /// Default: 15.
    pub threshold_minutes: i64,

    /// Also check Saturdays and Sundays. Default: false.
    #[serde(default)]
    pub weekend_check_enabled: bool,
}

impl LatePolicy {
    /// Whether arrivals on `date` are checked at all.
    pub fn applies_to(&self, date: NaiveDate) -> bool {
        self.weekend_check_enabled || is_workday(date)
    }
}

impl Default for LatePolicy {
    fn default() -> Self {
        Self {
            work_start: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN),
            threshold_minutes: 15,
            weekend_check_enabled: false,
        }
    }
}

/// Result of checking one employee on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LateCheck {
    pub date: NaiveDate,
    pub expected_time: NaiveTime,
    pub actual_time: NaiveTime,
    /// Whole minutes late; zero unless `is_late`.
    pub late_minutes: i64,
    pub is_late: bool,
}

/// Checks a day's first entry against `policy`.
///
/// Returns `None` when the employee did not come in or `date` is not
/// checked under `policy`.
pub fn check_late_arrival(
    first_in: Option<NaiveDateTime>,
    date: NaiveDate,
    policy: &LatePolicy,
) -> Option<LateCheck> {
    if !policy.applies_to(date) {
        return None;
    }
    let actual_time = first_in?.time();
    let expected = date.and_time(policy.work_start);
    let actual = date.and_time(actual_time);

    let late_minutes = if actual > expected {
        (actual - expected).num_minutes()
    } else {
        0
    };
    let is_late = actual > expected && late_minutes >= policy.threshold_minutes;

    Some(LateCheck {
        date,
        expected_time: policy.work_start,
        actual_time,
        late_minutes: if is_late { late_minutes } else { 0 },
        is_late,
    })
}
