//! Attendance time reconstruction.
//!
//! Turns an unordered set of directional swipes for one person into first
//! entry, last exit, time inside, time outside and a validity judgment.
//!
//! # Algorithm Summary
//!
//! 1. Sort swipes by timestamp (stable)
//! 2. Find first `in`, last `out`, and whether the latest swipe is an `in`
//! 3. A session left open on a day that is not today is invalid; durations are zeroed
//! 4. Span runs from first `in` to last `out`, or to `now` while inside
//! 5. Inside time is accumulated by a forward scan starting at first `in`
//! 6. Outside time is span minus inside time, never negative
//!
//! Nothing here reads the wall clock: `now` and `today` come from the caller.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::Direction;

/// A swipe suitable for reconstruction.
///
/// Lets the reconstructor work with stored rows, grouped person swipes and
/// test fixtures alike.
pub trait Swipe {
    /// When the reader fired, in organization local time.
    fn timestamp(&self) -> NaiveDateTime;

    /// Classified direction of the swipe.
    fn direction(&self) -> Direction;
}

impl<T: Swipe + ?Sized> Swipe for &T {
    fn timestamp(&self) -> NaiveDateTime {
        (**self).timestamp()
    }

    fn direction(&self) -> Direction {
        (**self).direction()
    }
}

/// A classified swipe with nothing else attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwipeEvent {
    pub timestamp: NaiveDateTime,
    pub direction: Direction,
}

impl SwipeEvent {
    pub const fn new(timestamp: NaiveDateTime, direction: Direction) -> Self {
        Self {
            timestamp,
            direction,
        }
    }
}

impl Swipe for SwipeEvent {
    fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    fn direction(&self) -> Direction {
        self.direction
    }
}

/// Rule deciding when a day's swipes are too incomplete to count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidDayRule {
    /// Invalid when the last swipe is an `in` and none of the swipes are from today.
    #[default]
    OpenOnPastDay,
    /// Additionally invalid when the last swipe is an `in` and there was no `out` at all,
    /// even today.
    NoClosingSwipe,
}

impl InvalidDayRule {
    const fn is_invalid(self, currently_inside: bool, is_today: bool, has_exit: bool) -> bool {
        match self {
            Self::OpenOnPastDay => currently_inside && !is_today,
            Self::NoClosingSwipe => currently_inside && (!is_today || !has_exit),
        }
    }
}

/// Outcome of reconstructing one person's swipes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconstructionResult {
    /// Earliest `in` swipe.
    pub first_in: Option<NaiveDateTime>,

    /// Latest `out` swipe.
    pub last_out: Option<NaiveDateTime>,

    /// Seconds inside. Zero for invalid days.
    pub total_inside_seconds: f64,

    /// Seconds outside within the observed span. Zero for invalid days.
    pub total_outside_seconds: f64,

    /// Seconds from first `in` to the end boundary. Zero for invalid days.
    pub total_span_seconds: f64,

    /// The latest swipe is an `in`.
    pub is_currently_inside: bool,

    /// `now`, when it was used to close an open session.
    pub current_time_used: Option<NaiveDateTime>,

    /// A session was left open where it cannot be closed by `now`.
    pub is_invalid_day: bool,

    /// At least one swipe falls on `today`.
    pub is_today: bool,
}

/// Reconstructs attendance using the default [`InvalidDayRule::OpenOnPastDay`].
pub fn reconstruct<E: Swipe>(
    events: &[E],
    now: NaiveDateTime,
    today: NaiveDate,
) -> ReconstructionResult {
    reconstruct_with_rule(events, now, today, InvalidDayRule::default())
}

/// Reconstructs attendance for one person's swipes.
///
/// # Arguments
///
/// * `events` - Swipes in any order; duplicates and ties are tolerated
/// * `now` - Closes an open session
/// * `today` - Decides whether an open session may still be closed
/// * `rule` - Which swipe patterns make the day invalid
pub fn reconstruct_with_rule<E: Swipe>(
    events: &[E],
    now: NaiveDateTime,
    today: NaiveDate,
    rule: InvalidDayRule,
) -> ReconstructionResult {
    let mut swipes: Vec<(NaiveDateTime, Direction)> = events
        .iter()
        .map(|e| (e.timestamp(), e.direction()))
        .collect();
    swipes.sort_by_key(|(ts, _)| *ts);

    let is_today = swipes.iter().any(|(ts, _)| ts.date() == today);

    let first_in = swipes
        .iter()
        .filter(|(_, dir)| dir.is_in())
        .map(|(ts, _)| *ts)
        .min();
    let last_out = swipes
        .iter()
        .filter(|(_, dir)| !dir.is_in())
        .map(|(ts, _)| *ts)
        .max();

    // The earliest of several swipes sharing the latest timestamp decides.
    let is_currently_inside = swipes
        .last()
        .and_then(|(latest, _)| swipes.iter().find(|(ts, _)| ts == latest))
        .is_some_and(|(_, dir)| dir.is_in());

    let is_invalid_day = rule.is_invalid(is_currently_inside, is_today, last_out.is_some());
    let current_time_used = is_currently_inside.then_some(now);

    if is_invalid_day {
        return ReconstructionResult {
            first_in,
            last_out,
            total_inside_seconds: 0.0,
            total_outside_seconds: 0.0,
            total_span_seconds: 0.0,
            is_currently_inside,
            current_time_used,
            is_invalid_day,
            is_today,
        };
    }

    let total_span_seconds = match (first_in, last_out) {
        (Some(first), _) if is_currently_inside => seconds_between(first, now),
        (Some(first), Some(last)) if last > first => seconds_between(first, last),
        _ => 0.0,
    };

    let total_inside_seconds = inside_seconds(&swipes, first_in, now);

    let total_outside_seconds = if total_span_seconds > 0.0 {
        (total_span_seconds - total_inside_seconds).max(0.0)
    } else {
        0.0
    };

    ReconstructionResult {
        first_in,
        last_out,
        total_inside_seconds,
        total_outside_seconds,
        total_span_seconds,
        is_currently_inside,
        current_time_used,
        is_invalid_day,
        is_today,
    }
}

/// Forward scan over sorted swipes, starting at `first_in` when there is one.
fn inside_seconds(
    swipes: &[(NaiveDateTime, Direction)],
    first_in: Option<NaiveDateTime>,
    now: NaiveDateTime,
) -> f64 {
    let mut total = 0.0;
    let mut is_inside = false;
    let mut last_event_time: Option<NaiveDateTime> = None;

    for &(ts, direction) in swipes {
        if first_in.is_some_and(|first| ts < first) {
            continue;
        }

        let Some(previous) = last_event_time else {
            is_inside = direction.is_in();
            last_event_time = Some(ts);
            continue;
        };

        let delta = seconds_between(previous, ts);
        if delta < 0.0 {
            // Clock skew between readers
            last_event_time = Some(ts);
            continue;
        }

        if is_inside {
            total += delta;
            if direction == Direction::Out {
                is_inside = false;
            }
        } else if direction.is_in() {
            is_inside = true;
        }

        last_event_time = Some(ts);
    }

    if is_inside {
        if let Some(previous) = last_event_time {
            let open = seconds_between(previous, now);
            if open > 0.0 {
                total += open;
            }
        }
    }

    total
}

/// Signed seconds from `start` to `end`, keeping sub-second precision.
#[allow(clippy::cast_precision_loss)]
fn seconds_between(start: NaiveDateTime, end: NaiveDateTime) -> f64 {
    let delta = end - start;
    delta.num_microseconds().map_or_else(
        || delta.num_seconds() as f64,
        |micros| micros as f64 / 1_000_000.0,
    )
}
