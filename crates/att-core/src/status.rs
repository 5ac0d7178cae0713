//! Attendance status derived from a reconstruction.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::{InvalidDayRule, ReconstructionResult, Swipe, reconstruct_with_rule};

/// Seconds inside required for a full working day (8 hours).
pub const FULL_DAY_SECONDS: f64 = 28_800.0;

/// Thresholds used to classify a day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatusThresholds {
    /// Inside time at or above this counts as a full day.
    /// Default: 28800 (8 hours).
    pub full_day_seconds: f64,
}

impl Default for StatusThresholds {
    fn default() -> Self {
        Self {
            full_day_seconds: FULL_DAY_SECONDS,
        }
    }
}

/// Everything that decides how a day's swipes are judged.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AttendancePolicy {
    pub thresholds: StatusThresholds,
    pub invalid_day_rule: InvalidDayRule,
}

impl AttendancePolicy {
    /// Reconstructs `events` and classifies the result.
    pub fn evaluate<E: Swipe>(
        &self,
        events: &[E],
        now: NaiveDateTime,
        today: NaiveDate,
    ) -> (ReconstructionResult, AttendanceStatus) {
        let result = reconstruct_with_rule(events, now, today, self.invalid_day_rule);
        let status = AttendanceStatus::classify(&result, &self.thresholds);
        (result, status)
    }
}

/// Attendance status for one person on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    FullDay,
    ShortHours,
    Absent,
    Invalid,
}

impl AttendanceStatus {
    /// Classifies a reconstruction against `thresholds`.
    pub fn classify(result: &ReconstructionResult, thresholds: &StatusThresholds) -> Self {
        if result.is_invalid_day {
            Self::Invalid
        } else {
            Self::from_inside_seconds(result.total_inside_seconds, thresholds)
        }
    }

    /// Classifies a day known to be valid by its inside time alone.
    pub fn from_inside_seconds(inside_seconds: f64, thresholds: &StatusThresholds) -> Self {
        if inside_seconds >= thresholds.full_day_seconds {
            Self::FullDay
        } else if inside_seconds > 0.0 {
            Self::ShortHours
        } else {
            Self::Absent
        }
    }

    /// Label shown in daily logs and exports.
    pub const fn label(self) -> &'static str {
        match self {
            Self::FullDay => "✓ Full Day",
            Self::ShortHours => "⚠ Short Hours",
            Self::Absent => "✗ Absent",
            Self::Invalid => "⚠ Invalid Data",
        }
    }

    /// CSS class used by the dashboard.
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::FullDay => "full-day",
            Self::ShortHours => "short-hours",
            Self::Absent => "absent",
            Self::Invalid => "invalid",
        }
    }

    /// Highlight color used by the dashboard.
    pub const fn color(self) -> &'static str {
        match self {
            Self::FullDay => "#28a745",
            Self::ShortHours => "#ffc107",
            Self::Absent | Self::Invalid => "#dc3545",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Direction, SwipeEvent, reconstruct};

    fn result_with_inside(seconds: f64) -> ReconstructionResult {
        ReconstructionResult {
            first_in: None,
            last_out: None,
            total_inside_seconds: seconds,
            total_outside_seconds: 0.0,
            total_span_seconds: seconds,
            is_currently_inside: false,
            current_time_used: None,
            is_invalid_day: false,
            is_today: true,
        }
    }

    #[test]
    fn threshold_boundary_is_inclusive() {
        let thresholds = StatusThresholds::default();
        assert_eq!(
            AttendanceStatus::classify(&result_with_inside(28_800.0), &thresholds),
            AttendanceStatus::FullDay
        );
        assert_eq!(
            AttendanceStatus::classify(&result_with_inside(28_799.9), &thresholds),
            AttendanceStatus::ShortHours
        );
        assert_eq!(
            AttendanceStatus::classify(&result_with_inside(0.0), &thresholds),
            AttendanceStatus::Absent
        );
    }

    #[test]
    fn invalid_wins_over_inside_time() {
        let mut result = result_with_inside(40_000.0);
        result.is_invalid_day = true;
        assert_eq!(
            AttendanceStatus::classify(&result, &StatusThresholds::default()),
            AttendanceStatus::Invalid
        );
    }

    #[test]
    fn custom_threshold_applies() {
        let thresholds = StatusThresholds {
            full_day_seconds: 6.0 * 3600.0,
        };
        assert_eq!(
            AttendanceStatus::classify(&result_with_inside(7.0 * 3600.0), &thresholds),
            AttendanceStatus::FullDay
        );
    }

    #[test]
    fn classify_reconstructed_scenarios() {
        let day = NaiveDate::from_ymd_opt(2025, 3, 4).unwrap();
        let at = |h, m| day.and_hms_opt(h, m, 0).unwrap();
        let thresholds = StatusThresholds::default();

        let full = reconstruct(
            &[
                SwipeEvent::new(at(8, 58), Direction::In),
                SwipeEvent::new(at(17, 32), Direction::Out),
            ],
            at(18, 0),
            day,
        );
        assert_eq!(AttendanceStatus::classify(&full, &thresholds), AttendanceStatus::FullDay);

        let short = reconstruct(&[SwipeEvent::new(at(9, 10), Direction::In)], at(12, 10), day);
        assert_eq!(
            AttendanceStatus::classify(&short, &thresholds),
            AttendanceStatus::ShortHours
        );

        let yesterday = day.pred_opt().unwrap();
        let invalid = reconstruct(
            &[SwipeEvent::new(yesterday.and_hms_opt(8, 0, 0).unwrap(), Direction::In)],
            at(9, 0),
            day,
        );
        assert_eq!(
            AttendanceStatus::classify(&invalid, &thresholds),
            AttendanceStatus::Invalid
        );
    }

    #[test]
    fn policy_applies_its_invalid_day_rule() {
        let day = NaiveDate::from_ymd_opt(2025, 3, 4).unwrap();
        let events = [SwipeEvent::new(day.and_hms_opt(9, 0, 0).unwrap(), Direction::In)];
        let now = day.and_hms_opt(11, 0, 0).unwrap();

        let (_, lenient) = AttendancePolicy::default().evaluate(&events, now, day);
        assert_eq!(lenient, AttendanceStatus::ShortHours);

        let strict = AttendancePolicy {
            invalid_day_rule: InvalidDayRule::NoClosingSwipe,
            ..AttendancePolicy::default()
        };
        let (result, status) = strict.evaluate(&events, now, day);
        assert!(result.is_invalid_day);
        assert_eq!(status, AttendanceStatus::Invalid);
    }

    #[test]
    fn presentation_attributes() {
        assert_eq!(AttendanceStatus::FullDay.label(), "✓ Full Day");
        assert_eq!(AttendanceStatus::ShortHours.css_class(), "short-hours");
        assert_eq!(AttendanceStatus::Invalid.color(), "#dc3545");
        assert_eq!(AttendanceStatus::Absent.to_string(), "✗ Absent");
    }
}
