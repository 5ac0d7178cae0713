//! Tracked hours for one person over a range of days.
//!
//! Every weekday in the range gets a row, whether or not it has swipes, with
//! the time spent inside and its grid code. Weekend swipes are ignored.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::daily::is_workday;
use crate::format::format_seconds;
use crate::{AttendancePolicy, GridCell, PersonKey, PersonSwipe};

/// One weekday of tracked time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackedDay {
    pub date: NaiveDate,
    pub inside_seconds: f64,
    pub inside_time: String,
    pub cell: GridCell,
}

/// Tracked weekdays, newest first, and their summed time inside.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackedHours {
    pub days: Vec<TrackedDay>,
    pub total_seconds: f64,
    pub total_time: String,
}

/// Sums time inside for `person` on every weekday from `from` to `to`.
///
/// Days without swipes, invalid days and days with no time inside are `D`.
/// An empty range (`from > to`) yields no days.
pub fn tracked_hours(
    swipes: &[PersonSwipe],
    person: &PersonKey,
    from: NaiveDate,
    to: NaiveDate,
    now: NaiveDateTime,
    policy: &AttendancePolicy,
) -> TrackedHours {
    let mut by_date: BTreeMap<NaiveDate, Vec<&PersonSwipe>> = BTreeMap::new();
    for swipe in swipes.iter().filter(|s| s.person_key == *person) {
        by_date.entry(swipe.timestamp.date()).or_default().push(swipe);
    }

    let mut days: Vec<TrackedDay> = from
        .iter_days()
        .take_while(|date| *date <= to)
        .filter(|date| is_workday(*date))
        .map(|date| {
            let (inside_seconds, cell) = match by_date.get(&date) {
                Some(group) => {
                    let (result, status) = policy.evaluate(group, now, now.date());
                    (result.total_inside_seconds, GridCell::from_status(status))
                }
                None => (0.0, GridCell::Absent),
            };
            TrackedDay {
                date,
                inside_seconds,
                inside_time: format_seconds(inside_seconds),
                cell,
            }
        })
        .collect();

    let total_seconds: f64 = days.iter().map(|day| day.inside_seconds).sum();
    days.reverse();
    tracing::debug!(days = days.len(), total_seconds, "tracked hours");
    TrackedHours {
        days,
        total_seconds,
        total_time: format_seconds(total_seconds),
    }
}
