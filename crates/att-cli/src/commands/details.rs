//! Every swipe of one employee on one day, with a summary.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use clap::Args;

use att_core::format::format_date;
use att_core::{DayDetails, day_details};
use att_db::Database;

use super::find_employee;
use crate::Config;

#[derive(Debug, Args)]
pub struct DetailsArgs {
    /// Employee full name (e.g. "Aysel Guliyeva").
    #[arg(long)]
    pub person: String,

    /// Day to show (YYYY-MM-DD). Default: today.
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    config: &Config,
    args: &DetailsArgs,
    now: NaiveDateTime,
) -> Result<()> {
    let employee = find_employee(db, config, &args.person)?;
    let date = args.date.unwrap_or_else(|| now.date());
    let classifier = config.classifier();
    let swipes = db
        .reader_swipes_on(date, &employee.key(), classifier.as_ref())
        .context("failed to load swipes")?;
    let details = day_details(date, swipes, now, &config.policy());

    if args.json {
        let json =
            serde_json::to_string_pretty(&details).context("failed to serialize day details")?;
        writeln!(writer, "{json}")?;
        return Ok(());
    }
    writeln!(writer, "{}, {}", employee.full_name(), format_date(date))?;
    write_details(writer, &details)
}

fn write_details<W: Write>(writer: &mut W, details: &DayDetails) -> Result<()> {
    if details.swipes.is_empty() {
        writeln!(writer, "No swipes.")?;
    }
    let reader_width = details
        .swipes
        .iter()
        .map(|swipe| swipe.reader_name.chars().count())
        .max()
        .unwrap_or(0);
    for swipe in &details.swipes {
        writeln!(
            writer,
            "{}  {:<reader_width$}  {}",
            swipe.timestamp.format("%H:%M:%S"),
            swipe.reader_name,
            swipe.direction.label()
        )?;
    }

    writeln!(writer)?;
    writeln!(writer, "First In:  {}", details.first_in)?;
    writeln!(writer, "Last Out:  {}", details.last_out)?;
    writeln!(writer, "Inside:    {}", details.inside_time)?;
    writeln!(writer, "Outside:   {}", details.outside_time)?;
    if details.is_currently_inside && !details.is_invalid_day {
        writeln!(writer, "Currently inside.")?;
    }
    writeln!(writer, "Status:    {}", details.status)?;
    Ok(())
}
