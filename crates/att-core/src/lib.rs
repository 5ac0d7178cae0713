//! Core domain logic for attendance tracking.
//!
//! This crate contains the fundamental types and logic for:
//! - Classification: mapping reader names to entry/exit directions
//! - Reconstruction: first entry, last exit and time inside from raw swipes
//! - Status: full day, short hours, absent or invalid
//! - Reports: daily logs, monthly grids, tracked hours, day details and
//!   late-arrival checks
//!
//! Nothing here performs I/O or reads the wall clock; see [`Clock`] for the
//! boundary where "now" is obtained.

pub mod classifier;
pub mod clock;
pub mod daily;
pub mod details;
mod direction;
pub mod format;
pub mod hours;
pub mod late;
pub mod monthly;
mod person;
mod reconstruct;
mod status;

pub use classifier::{ClassifierConfig, DirectionClassifier};
pub use clock::{Clock, FixedClock, OrgClock};
pub use daily::{DailyLogRow, build_daily_log};
pub use details::{DayDetails, ReaderSwipe, day_details};
pub use direction::{Direction, UnknownDirection};
pub use hours::{TrackedDay, TrackedHours, tracked_hours};
pub use late::{LateCheck, LatePolicy, check_late_arrival};
pub use monthly::{GridCell, GridError, MonthlyGrid, Page, build_monthly_grid};
pub use person::{Employee, PersonKey, PersonSwipe, fold_case, normalize_name};
pub use reconstruct::{
    InvalidDayRule, ReconstructionResult, Swipe, SwipeEvent, reconstruct, reconstruct_with_rule,
};
pub use status::{AttendancePolicy, AttendanceStatus, FULL_DAY_SECONDS, StatusThresholds};
