//! Display formatting shared by logs, grids and exports.

use chrono::{NaiveDate, NaiveDateTime};

/// Placeholder for a missing value.
pub const NOT_AVAILABLE: &str = "N/A";

/// Exit placeholder for a session that is still open.
pub const STILL_INSIDE: &str = "Still Inside";

/// Formats seconds as `HH:MM:SS`, truncating fractions.
///
/// Zero and negative durations render as `00:00:00`. Hours are not wrapped.
#[allow(clippy::cast_possible_truncation)]
pub fn format_seconds(seconds: f64) -> String {
    if seconds <= 0.0 || seconds.is_nan() {
        return "00:00:00".to_string();
    }
    let total = seconds as i64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// Formats a date as `DD.MM.YYYY`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

/// Formats the time of day as `HH:MM:SS`, or `N/A` when absent.
pub fn format_time(ts: Option<NaiveDateTime>) -> String {
    ts.map_or_else(
        || NOT_AVAILABLE.to_string(),
        |ts| ts.format("%H:%M:%S").to_string(),
    )
}
