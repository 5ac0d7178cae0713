//! CLI subcommand implementations.

pub mod daily;
pub mod details;
pub mod export;
pub mod hours;
pub mod import;
pub mod late;
pub mod monthly;
pub mod status;

use std::collections::HashSet;

use anyhow::{Context, Result, bail};
use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use clap::Args;

use att_core::{Employee, PersonKey, normalize_name};
use att_db::Database;

use crate::Config;

/// Days shown when no `--from` is given.
const DEFAULT_LOOKBACK_DAYS: u64 = 365;

/// Inclusive date range shared by the reporting commands.
#[derive(Debug, Clone, Copy, Default, Args)]
pub struct DateRangeArgs {
    /// First day to include (YYYY-MM-DD). Default: one year before `--to`.
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Last day to include (YYYY-MM-DD). Default: today.
    #[arg(long)]
    pub to: Option<NaiveDate>,
}

impl DateRangeArgs {
    /// Resolves to concrete days, relative to `today`.
    pub fn resolve(self, today: NaiveDate) -> Result<DateRange> {
        let to = self.to.unwrap_or(today);
        let from = self.from.unwrap_or_else(|| {
            to.checked_sub_days(Days::new(DEFAULT_LOOKBACK_DAYS))
                .unwrap_or(NaiveDate::MIN)
        });
        if from > to {
            bail!("--from ({from}) is after --to ({to})");
        }
        Ok(DateRange { from, to })
    }
}

/// A resolved, non-empty range of days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn start(self) -> NaiveDateTime {
        self.from.and_time(NaiveTime::MIN)
    }

    pub fn end(self) -> NaiveDateTime {
        att_db::day_range(self.to).1
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        (self.from..=self.to).contains(&date)
    }
}

/// Keys of everyone in the attendance directory, after position exclusion.
pub fn directory_keys(db: &Database, config: &Config) -> Result<HashSet<PersonKey>> {
    let employees = db
        .list_employees(&config.employee_filter(None))
        .context("failed to load employees")?;
    Ok(employees.iter().map(Employee::key).collect())
}

/// Looks up one directory employee by full name, ignoring case and spaces.
pub fn find_employee(db: &Database, config: &Config, person: &str) -> Result<Employee> {
    let key = PersonKey::new(normalize_name(person));
    let employees = db
        .list_employees(&config.employee_filter(None))
        .context("failed to load employees")?;
    match employees.into_iter().find(|e| e.key() == key) {
        Some(employee) => Ok(employee),
        None => bail!("no employee named {person:?}"),
    }
}
