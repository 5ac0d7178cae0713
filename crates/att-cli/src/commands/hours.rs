//! Tracked hours for one employee, one row per weekday.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDateTime};
use clap::Args;

use att_core::format::format_date;
use att_core::{TrackedHours, tracked_hours};
use att_db::Database;

use super::{DateRangeArgs, find_employee};
use crate::Config;

#[derive(Debug, Args)]
pub struct HoursArgs {
    /// Employee full name (e.g. "Aysel Guliyeva").
    #[arg(long)]
    pub person: String,

    /// Range to sum. `--from` defaults to the first day of the `--to` month.
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
    args: &HoursArgs,
    now: NaiveDateTime,
) -> Result<()> {
    let employee = find_employee(db, config, &args.person)?;
    let today = now.date();
    let to = args.range.to.unwrap_or(today);
    let range = DateRangeArgs {
        from: Some(args.range.from.unwrap_or_else(|| to.with_day(1).unwrap_or(to))),
        to: Some(to),
    }
    .resolve(today)?;

    let classifier = config.classifier();
    let swipes = db
        .classified_swipes(range.start(), range.end(), classifier.as_ref())
        .context("failed to load swipes")?;
    let hours = tracked_hours(
        &swipes,
        &employee.key(),
        range.from,
        range.to,
        now,
        &config.policy(),
    );

    if args.json {
        let json =
            serde_json::to_string_pretty(&hours).context("failed to serialize tracked hours")?;
        writeln!(writer, "{json}")?;
        return Ok(());
    }
    writeln!(
        writer,
        "Tracked hours for {}, {} to {}",
        employee.full_name(),
        format_date(range.from),
        format_date(range.to)
    )?;
    write_table(writer, &hours)
}

fn write_table<W: Write>(writer: &mut W, hours: &TrackedHours) -> Result<()> {
    writeln!(writer, "{:<14}  {:<8}  Code", "Date", "Inside")?;
    for day in &hours.days {
        // chrono's delayed formatter ignores width, so pad a String
        let date = day.date.format("%a %d.%m.%Y").to_string();
        writeln!(writer, "{date:<14}  {:<8}  {}", day.inside_time, day.cell)?;
    }
    writeln!(writer, "Total: {}", hours.total_time)?;
    Ok(())
}
