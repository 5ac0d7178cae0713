//! Organization time.
//!
//! Swipe timestamps are stored as naive local times of the organization, so
//! "now" must be the same kind of value. Only the process boundary reads a
//! [`Clock`]; everything below takes `now` and `today` as arguments.

use chrono::{FixedOffset, NaiveDate, NaiveDateTime, Offset, Utc};

/// Default organization offset from UTC, in hours (no daylight saving).
pub const DEFAULT_UTC_OFFSET_HOURS: i32 = 4;

/// Source of the current organization-local time.
pub trait Clock {
    /// Current naive local time.
    fn now(&self) -> NaiveDateTime;

    /// Current local date.
    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// Wall clock shifted by a fixed UTC offset.
#[derive(Debug, Clone, Copy)]
pub struct OrgClock {
    offset: FixedOffset,
}

impl OrgClock {
    /// Creates a clock for a whole-hour offset, or `None` if it is out of range.
    pub fn from_offset_hours(hours: i32) -> Option<Self> {
        FixedOffset::east_opt(hours.checked_mul(3600)?).map(|offset| Self { offset })
    }

    pub const fn offset(&self) -> FixedOffset {
        self.offset
    }
}

impl Default for OrgClock {
    fn default() -> Self {
        Self::from_offset_hours(DEFAULT_UTC_OFFSET_HOURS).unwrap_or(Self { offset: Utc.fix() })
    }
}

impl Clock for OrgClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.offset).naive_local()
    }
}

/// A clock stopped at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
