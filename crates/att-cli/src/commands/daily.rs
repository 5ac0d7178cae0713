//! Daily attendance log, one row per person and day.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use clap::Args;

use att_core::format::format_date;
use att_core::{DailyLogRow, PersonKey, build_daily_log, normalize_name};
use att_db::Database;

use super::{DateRange, DateRangeArgs, directory_keys};
use crate::Config;

#[derive(Debug, Args)]
pub struct DailyArgs {
    /// Only show one person, by full name (e.g. "Aysel Guliyeva").
    ///
    /// Weekdays without swipes are listed as absences.
    #[arg(long)]
    pub person: Option<String>,

    #[command(flatten)]
    pub range: DateRangeArgs,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    config: &Config,
    args: &DailyArgs,
    now: NaiveDateTime,
) -> Result<()> {
    let range = args.range.resolve(now.date())?;
    let person = args
        .person
        .as_deref()
        .map(|p| PersonKey::new(normalize_name(p)));
    let rows = load_rows(db, config, range, person.as_ref(), now)?;

    if args.json {
        let json = serde_json::to_string_pretty(&rows).context("failed to serialize daily log")?;
        writeln!(writer, "{json}")?;
        return Ok(());
    }
    write_table(writer, &rows)
}

/// Daily log rows for `range`, newest first.
///
/// Only people in the employee directory appear; swipes of excluded
/// positions and of names with no directory entry are dropped.
pub fn load_rows(
    db: &Database,
    config: &Config,
    range: DateRange,
    person: Option<&PersonKey>,
    now: NaiveDateTime,
) -> Result<Vec<DailyLogRow>> {
    let classifier = config.classifier();
    let mut swipes = db
        .classified_swipes(range.start(), range.end(), classifier.as_ref())
        .context("failed to load swipes")?;
    let directory = directory_keys(db, config)?;
    let total = swipes.len();
    swipes.retain(|swipe| directory.contains(&swipe.person_key));
    tracing::debug!(
        total,
        kept = swipes.len(),
        "dropped swipes outside the employee directory"
    );
    let mut rows = build_daily_log(&swipes, person, now, now.date(), &config.policy());
    // Absences are filled up to today, which may lie past the range.
    rows.retain(|row| range.contains(row.date));
    Ok(rows)
}

fn write_table<W: Write>(writer: &mut W, rows: &[DailyLogRow]) -> Result<()> {
    if rows.is_empty() {
        writeln!(writer, "No attendance records.")?;
        return Ok(());
    }

    writeln!(
        writer,
        "{:<10}  {:<24}  {:<8}  {:<12}  {:<8}  {:<8}  Status",
        "Date", "Name", "First In", "Last Out", "Inside", "Outside"
    )?;
    for row in rows {
        let name = format!("{} {}", row.name, row.last_name);
        writeln!(
            writer,
            "{:<10}  {:<24}  {:<8}  {:<12}  {:<8}  {:<8}  {}",
            format_date(row.date),
            name,
            row.first_in,
            row.last_out,
            row.inside_time,
            row.outside_time,
            row.status
        )?;
    }
    Ok(())
}
