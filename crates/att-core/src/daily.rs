//! Daily attendance log.
//!
//! Groups classified swipes by `(date, person)`, reconstructs every group and
//! renders one row per group. When the log is for a single person, weekdays
//! without any swipes between their first recorded day and today are filled
//! in as absences.

use std::collections::{BTreeMap, HashSet};

use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use serde::Serialize;

use crate::format::{NOT_AVAILABLE, STILL_INSIDE, format_seconds, format_time};
use crate::{AttendancePolicy, AttendanceStatus, PersonKey, PersonSwipe, ReconstructionResult};

/// One person's attendance on one day, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyLogRow {
    pub date: NaiveDate,
    pub person_key: PersonKey,
    pub name: String,
    pub last_name: String,
    pub first_in: String,
    pub last_out: String,
    pub inside_time: String,
    pub outside_time: String,
    pub total_span: String,
    pub total_inside_seconds: f64,
    pub total_outside_seconds: f64,
    pub total_span_seconds: f64,
    pub is_currently_inside: bool,
    pub is_invalid_day: bool,
    pub status: AttendanceStatus,
}

impl DailyLogRow {
    fn from_result(
        date: NaiveDate,
        first: &PersonSwipe,
        result: &ReconstructionResult,
        status: AttendanceStatus,
    ) -> Self {
        let (first_in, last_out, inside_time, outside_time, total_span) = if result.is_invalid_day
        {
            (
                NOT_AVAILABLE.to_string(),
                NOT_AVAILABLE.to_string(),
                NOT_AVAILABLE.to_string(),
                NOT_AVAILABLE.to_string(),
                NOT_AVAILABLE.to_string(),
            )
        } else {
            let last_out = if result.is_currently_inside {
                STILL_INSIDE.to_string()
            } else {
                format_time(result.last_out)
            };
            (
                format_time(result.first_in),
                last_out,
                format_seconds(result.total_inside_seconds),
                format_seconds(result.total_outside_seconds),
                format_seconds(result.total_span_seconds),
            )
        };

        Self {
            date,
            person_key: first.person_key.clone(),
            name: first.name.clone(),
            last_name: first.last_name.clone(),
            first_in,
            last_out,
            inside_time,
            outside_time,
            total_span,
            total_inside_seconds: result.total_inside_seconds,
            total_outside_seconds: result.total_outside_seconds,
            total_span_seconds: result.total_span_seconds,
            is_currently_inside: result.is_currently_inside,
            is_invalid_day: result.is_invalid_day,
            status,
        }
    }

    fn absent(date: NaiveDate, person_key: PersonKey, name: &str, last_name: &str) -> Self {
        Self {
            date,
            person_key,
            name: name.to_string(),
            last_name: last_name.to_string(),
            first_in: NOT_AVAILABLE.to_string(),
            last_out: NOT_AVAILABLE.to_string(),
            inside_time: format_seconds(0.0),
            outside_time: format_seconds(0.0),
            total_span: format_seconds(0.0),
            total_inside_seconds: 0.0,
            total_outside_seconds: 0.0,
            total_span_seconds: 0.0,
            is_currently_inside: false,
            is_invalid_day: false,
            status: AttendanceStatus::Absent,
        }
    }
}

/// Returns true for Monday through Friday.
pub fn is_workday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Builds the daily log, newest day first.
///
/// With `person` set, swipes of everyone else are ignored and missing
/// workdays up to `today` are reported as absences.
pub fn build_daily_log(
    swipes: &[PersonSwipe],
    person: Option<&PersonKey>,
    now: NaiveDateTime,
    today: NaiveDate,
    policy: &AttendancePolicy,
) -> Vec<DailyLogRow> {
    let mut groups: BTreeMap<(NaiveDate, PersonKey), Vec<&PersonSwipe>> = BTreeMap::new();
    for swipe in swipes {
        if person.is_some_and(|key| *key != swipe.person_key) {
            continue;
        }
        groups
            .entry((swipe.timestamp.date(), swipe.person_key.clone()))
            .or_default()
            .push(swipe);
    }

    let mut rows: Vec<DailyLogRow> = groups
        .iter()
        .map(|((date, _), group)| {
            let (result, status) = policy.evaluate(group, now, today);
            DailyLogRow::from_result(*date, group[0], &result, status)
        })
        .collect();

    if let Some(key) = person {
        fill_missing_workdays(&mut rows, &groups, key, today);
    }

    rows.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| a.person_key.cmp(&b.person_key))
    });
    tracing::debug!(rows = rows.len(), "built daily log");
    rows
}

fn fill_missing_workdays(
    rows: &mut Vec<DailyLogRow>,
    groups: &BTreeMap<(NaiveDate, PersonKey), Vec<&PersonSwipe>>,
    key: &PersonKey,
    today: NaiveDate,
) {
    // Groups are ordered by date, so the first entry is the earliest day.
    let Some(((first_date, _), first_group)) = groups.iter().next() else {
        return;
    };
    let first = first_group[0];
    let seen: HashSet<NaiveDate> = rows.iter().map(|row| row.date).collect();

    let mut date = *first_date;
    while date <= today {
        if is_workday(date) && !seen.contains(&date) {
            rows.push(DailyLogRow::absent(
                date,
                key.clone(),
                &first.name,
                &first.last_name,
            ));
        }
        let Some(next) = date.succ_opt() else {
            break;
        };
        date = next;
    }
}
