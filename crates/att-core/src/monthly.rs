//! Monthly attendance grid.
//!
//! One row per employee, one cell per weekday of the month. Cells use the
//! single-letter codes of the attendance sheet:
//!
//! | Code | Meaning |
//! |------|---------|
//! | `T`  | full day |
//! | `E`  | short hours |
//! | `D`  | absent, invalid, or no swipes |
//! | `N`  | day has not happened yet |

use std::collections::HashMap;
use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use rayon::prelude::*;
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::daily::is_workday;
use crate::{AttendancePolicy, AttendanceStatus, Employee, PersonKey, PersonSwipe};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Errors building a monthly grid.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("invalid month: {year}-{month}")]
    InvalidMonth { year: i32, month: u32 },
    #[error("page size must be positive")]
    ZeroPageSize,
}

/// Status of one employee on one weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GridCell {
    FullDay,
    ShortHours,
    Absent,
    Upcoming,
}

impl GridCell {
    /// Collapses a day status onto the grid. Invalid days count as absent.
    pub const fn from_status(status: AttendanceStatus) -> Self {
        match status {
            AttendanceStatus::FullDay => Self::FullDay,
            AttendanceStatus::ShortHours => Self::ShortHours,
            AttendanceStatus::Absent | AttendanceStatus::Invalid => Self::Absent,
        }
    }

    pub const fn code(self) -> char {
        match self {
            Self::FullDay => 'T',
            Self::ShortHours => 'E',
            Self::Absent => 'D',
            Self::Upcoming => 'N',
        }
    }
}

impl fmt::Display for GridCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl Serialize for GridCell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_char(self.code())
    }
}

/// One employee's row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridRow {
    pub id: i64,
    pub name: String,
    pub days: Vec<GridCell>,
}

/// A page of the monthly grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyGrid {
    pub year: i32,
    pub month: u32,
    pub month_name: &'static str,
    /// Day-of-month numbers of the weekday columns.
    pub headers: Vec<u32>,
    pub rows: Vec<GridRow>,
    pub total_items: usize,
    pub total_pages: usize,
    pub current_page: usize,
    pub per_page: usize,
}

/// Requested page of a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// 1-based; clamped into range.
    pub number: usize,
    pub per_page: usize,
}

/// First and last day of a month.
pub fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate), GridError> {
    let invalid = GridError::InvalidMonth { year, month };
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| invalid.clone())?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    let last = next_first
        .and_then(|d| d.pred_opt())
        .ok_or(invalid)?;
    Ok((first, last))
}

/// Builds one page of the monthly grid.
///
/// `swipes` should cover the month; swipes of people not in `employees` and
/// outside the month are ignored. `now` closes sessions still open today.
pub fn build_monthly_grid(
    employees: &[Employee],
    swipes: &[PersonSwipe],
    year: i32,
    month: u32,
    now: NaiveDateTime,
    page: Page,
    policy: &AttendancePolicy,
) -> Result<MonthlyGrid, GridError> {
    if page.per_page == 0 {
        return Err(GridError::ZeroPageSize);
    }
    let (first, last) = month_bounds(year, month)?;
    let today = now.date();

    let workdays: Vec<NaiveDate> = first
        .iter_days()
        .take_while(|d| *d <= last)
        .filter(|d| is_workday(*d))
        .collect();

    let mut by_person: HashMap<&PersonKey, HashMap<NaiveDate, Vec<&PersonSwipe>>> =
        HashMap::new();
    for swipe in swipes {
        let date = swipe.timestamp.date();
        if date < first || date > last {
            continue;
        }
        by_person
            .entry(&swipe.person_key)
            .or_default()
            .entry(date)
            .or_default()
            .push(swipe);
    }

    let rows: Vec<GridRow> = employees
        .par_iter()
        .map(|employee| {
            let person_days = by_person.get(&employee.key());
            let days = workdays
                .iter()
                .map(|date| {
                    if *date > today {
                        return GridCell::Upcoming;
                    }
                    person_days
                        .and_then(|by_date| by_date.get(date))
                        .map_or(GridCell::Absent, |group| {
                            let (_, status) = policy.evaluate(group, now, today);
                            GridCell::from_status(status)
                        })
                })
                .collect();
            GridRow {
                id: employee.id,
                name: employee.full_name(),
                days,
            }
        })
        .collect();

    let total_items = rows.len();
    let total_pages = total_items.div_ceil(page.per_page);
    let mut current_page = page.number.max(1);
    if total_pages > 0 && current_page > total_pages {
        current_page = total_pages;
    }
    let rows = rows
        .into_iter()
        .skip((current_page - 1) * page.per_page)
        .take(page.per_page)
        .collect();

    Ok(MonthlyGrid {
        year,
        month,
        month_name: MONTH_NAMES[first.month0() as usize],
        headers: workdays.iter().map(Datelike::day).collect(),
        rows,
        total_items,
        total_pages,
        current_page,
        per_page: page.per_page,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Direction;

    fn employee(id: i64, name: &str, last_name: &str) -> Employee {
        Employee {
            id,
            name: name.to_string(),
            last_name: last_name.to_string(),
            position: None,
            email: None,
        }
    }

    fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, d)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn page(number: usize, per_page: usize) -> Page {
        Page { number, per_page }
    }

    #[test]
    fn month_bounds_handle_december_and_february() {
        let (first, last) = month_bounds(2024, 12).unwrap();
        assert_eq!(first, NaiveDate::from_ymd_opt(2024, 12, 1).unwrap());
        assert_eq!(last, NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());

        let (_, last) = month_bounds(2024, 2).unwrap();
        assert_eq!(last.day(), 29);

        assert_eq!(
            month_bounds(2024, 13),
            Err(GridError::InvalidMonth {
                year: 2024,
                month: 13
            })
        );
    }

    #[test]
    fn headers_list_weekdays_only() {
        let grid = build_monthly_grid(
            &[],
            &[],
            2025,
            1,
            at(31, 12, 0),
            page(1, 20),
            &AttendancePolicy::default(),
        )
        .unwrap();

        assert_eq!(grid.month_name, "January");
        assert_eq!(grid.headers.len(), 23);
        assert_eq!(&grid.headers[..5], &[1, 2, 3, 6, 7]);
        assert_eq!(grid.total_pages, 0);
        assert_eq!(grid.current_page, 1);
    }

    #[test]
    fn cells_reflect_daily_status() {
        let employees = vec![employee(1, "Aysel", "Guliyeva")];
        let swipes = vec![
            // Wed 1st: full day
            PersonSwipe::new("Aysel", "Guliyeva", at(1, 8, 58), Direction::In),
            PersonSwipe::new("Aysel", "Guliyeva", at(1, 17, 32), Direction::Out),
            // Thu 2nd: short day
            PersonSwipe::new("Aysel", "Guliyeva", at(2, 9, 0), Direction::In),
            PersonSwipe::new("Aysel", "Guliyeva", at(2, 12, 0), Direction::Out),
            // Fri 3rd: never left, invalid
            PersonSwipe::new("Aysel", "Guliyeva", at(3, 9, 0), Direction::In),
            // Someone not on the list
            PersonSwipe::new("Rashad", "Huseynov", at(1, 9, 0), Direction::In),
        ];

        let grid = build_monthly_grid(
            &employees,
            &swipes,
            2025,
            1,
            at(7, 10, 0),
            page(1, 20),
            &AttendancePolicy::default(),
        )
        .unwrap();

        let codes: String = grid.rows[0].days.iter().map(|c| c.code()).collect();
        // 1 2 3 | 6 7 | 8.. upcoming
        assert_eq!(&codes[..6], "TEDDDN");
        assert!(codes[5..].chars().all(|c| c == 'N'));
        assert_eq!(grid.rows[0].name, "Aysel Guliyeva");
        assert_eq!(grid.total_items, 1);
    }

    #[test]
    fn open_session_today_counts_as_short_hours() {
        let employees = vec![employee(1, "Aysel", "Guliyeva")];
        let swipes = vec![PersonSwipe::new(
            "Aysel",
            "Guliyeva",
            at(6, 9, 0),
            Direction::In,
        )];
        let grid = build_monthly_grid(
            &employees,
            &swipes,
            2025,
            1,
            at(6, 11, 0),
            page(1, 20),
            &AttendancePolicy::default(),
        )
        .unwrap();

        // 6th is the fourth weekday column
        assert_eq!(grid.rows[0].days[3], GridCell::ShortHours);
        assert_eq!(grid.rows[0].days[4], GridCell::Upcoming);
    }

    #[test]
    fn pagination_clamps_page_number() {
        let employees: Vec<Employee> = (1..=5)
            .map(|i| employee(i, &format!("Name{i}"), "Last"))
            .collect();

        let grid = build_monthly_grid(
            &employees,
            &[],
            2025,
            1,
            at(31, 12, 0),
            page(9, 2),
            &AttendancePolicy::default(),
        )
        .unwrap();
        assert_eq!(grid.total_pages, 3);
        assert_eq!(grid.current_page, 3);
        assert_eq!(grid.rows.len(), 1);
        assert_eq!(grid.rows[0].id, 5);

        let grid = build_monthly_grid(
            &employees,
            &[],
            2025,
            1,
            at(31, 12, 0),
            page(0, 2),
            &AttendancePolicy::default(),
        )
        .unwrap();
        assert_eq!(grid.current_page, 1);
        assert_eq!(grid.rows.len(), 2);
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let result = build_monthly_grid(
            &[],
            &[],
            2025,
            1,
            at(31, 12, 0),
            page(1, 0),
            &AttendancePolicy::default(),
        );
        assert_eq!(result.unwrap_err(), GridError::ZeroPageSize);
    }

    #[test]
    fn cells_serialize_as_codes() {
        let json = serde_json::to_string(&vec![GridCell::FullDay, GridCell::Upcoming]).unwrap();
        assert_eq!(json, r#"["T","N"]"#);
    }
}
