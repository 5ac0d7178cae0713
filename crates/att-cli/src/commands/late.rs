//! Late-arrival check.
//!
//! Meant to run once a day from a scheduler after the grace period has
//! passed. Each late employee gets one record per day; re-running the check
//! updates it in place.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use clap::Args;

use att_core::format::format_date;
use att_core::{Employee, LateCheck, check_late_arrival};
use att_db::Database;

use crate::Config;

#[derive(Debug, Args)]
pub struct LateArgs {
    /// Day to check (YYYY-MM-DD). Default: today.
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

pub fn run<W: Write>(
    writer: &mut W,
    db: &mut Database,
    config: &Config,
    args: &LateArgs,
    now: NaiveDateTime,
) -> Result<usize> {
    let date = args.date.unwrap_or_else(|| now.date());
    let policy = config.late_policy();
    if !policy.applies_to(date) {
        tracing::info!(%date, "weekend, late check skipped");
        writeln!(writer, "{} is a weekend; late check skipped.", format_date(date))?;
        return Ok(0);
    }
    let late = find_late(db, config, date)?;

    for (employee, check) in &late {
        db.save_late_arrival(employee.id, check, now)
            .with_context(|| {
                format!("failed to save late arrival for employee {}", employee.id)
            })?;
        tracing::info!(
            employee_id = employee.id,
            late_minutes = check.late_minutes,
            "late arrival recorded"
        );
    }

    if late.is_empty() {
        writeln!(writer, "No late arrivals on {}.", format_date(date))?;
        return Ok(0);
    }
    writeln!(
        writer,
        "Late arrivals on {} (expected {}, {} min grace):",
        format_date(date),
        policy.work_start.format("%H:%M:%S"),
        policy.threshold_minutes
    )?;
    for (employee, check) in &late {
        writeln!(
            writer,
            "- {}: {} ({} min late)",
            employee.full_name(),
            check.actual_time.format("%H:%M:%S"),
            check.late_minutes
        )?;
    }
    Ok(late.len())
}

/// Employees whose first entry on `date` counts as late.
fn find_late(
    db: &Database,
    config: &Config,
    date: NaiveDate,
) -> Result<Vec<(Employee, LateCheck)>> {
    let employees = db
        .list_employees(&config.employee_filter(None))
        .context("failed to load employees")?;
    let classifier = config.classifier();
    let firsts = db
        .first_entries(date, classifier.as_ref())
        .context("failed to load first entries")?;
    let policy = config.late_policy();

    let late: Vec<(Employee, LateCheck)> = employees
        .into_iter()
        .filter_map(|employee| {
            let first_in = firsts.get(&employee.key()).copied();
            let check = check_late_arrival(first_in, date, &policy)?;
            check.is_late.then_some((employee, check))
        })
        .collect();
    tracing::debug!(
        checked = firsts.len(),
        late = late.len(),
        %date,
        "late-arrival check"
    );
    Ok(late)
}
