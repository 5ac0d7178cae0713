//! One person's swipes on one day, with a reconstructed summary.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::format::{format_seconds, format_time};
use crate::{AttendancePolicy, AttendanceStatus, Direction, Swipe};

/// A classified swipe that keeps the reader it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReaderSwipe {
    pub timestamp: NaiveDateTime,
    pub reader_name: String,
    pub direction: Direction,
}

impl Swipe for ReaderSwipe {
    fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    fn direction(&self) -> Direction {
        self.direction
    }
}

/// Swipe list and summary for one day.
///
/// Times are still shown for invalid days; only the durations are zeroed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayDetails {
    pub date: NaiveDate,
    pub swipes: Vec<ReaderSwipe>,
    pub first_in: String,
    pub last_out: String,
    pub inside_time: String,
    pub outside_time: String,
    pub is_currently_inside: bool,
    pub is_invalid_day: bool,
    pub status: AttendanceStatus,
}

/// Builds the details for `date` from one person's swipes.
///
/// Swipes on other days are dropped. The rest are listed in time order;
/// swipes sharing a timestamp keep their input order.
pub fn day_details(
    date: NaiveDate,
    mut swipes: Vec<ReaderSwipe>,
    now: NaiveDateTime,
    policy: &AttendancePolicy,
) -> DayDetails {
    swipes.retain(|swipe| swipe.timestamp.date() == date);
    swipes.sort_by_key(|swipe| swipe.timestamp);

    let (result, status) = policy.evaluate(&swipes, now, now.date());
    DayDetails {
        date,
        first_in: format_time(result.first_in),
        last_out: format_time(result.last_out),
        inside_time: format_seconds(result.total_inside_seconds),
        outside_time: format_seconds(result.total_outside_seconds),
        is_currently_inside: result.is_currently_inside,
        is_invalid_day: result.is_invalid_day,
        status,
        swipes,
    }
}
