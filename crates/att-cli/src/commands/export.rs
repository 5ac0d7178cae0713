//! Implementation of the `att export` command.
//!
//! Writes the daily log for a date range as CSV, one row per person and day.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use clap::Args;
use serde::Serialize;

use att_core::DailyLogRow;
use att_core::format::format_date;
use att_db::Database;

use super::DateRangeArgs;
use super::daily::load_rows;
use crate::Config;

#[derive(Debug, Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub range: DateRangeArgs,
}

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Name")]
    name: &'a str,
    #[serde(rename = "Last Name")]
    last_name: &'a str,
    #[serde(rename = "First In")]
    first_in: &'a str,
    #[serde(rename = "Last Out")]
    last_out: &'a str,
    #[serde(rename = "Inside Time")]
    inside_time: &'a str,
    #[serde(rename = "Outside Time")]
    outside_time: &'a str,
    #[serde(rename = "Status")]
    status: &'static str,
}

impl<'a> From<&'a DailyLogRow> for CsvRow<'a> {
    fn from(row: &'a DailyLogRow) -> Self {
        Self {
            date: format_date(row.date),
            name: &row.name,
            last_name: &row.last_name,
            first_in: &row.first_in,
            last_out: &row.last_out,
            inside_time: &row.inside_time,
            outside_time: &row.outside_time,
            status: row.status.label(),
        }
    }
}

/// Writes the CSV export and returns the number of data rows.
pub fn run<W: Write>(
    writer: W,
    db: &Database,
    config: &Config,
    args: &ExportArgs,
    now: NaiveDateTime,
) -> Result<usize> {
    let range = args.range.resolve(now.date())?;
    let rows = load_rows(db, config, range, None, now)?;

    let mut csv = csv::Writer::from_writer(writer);
    if rows.is_empty() {
        // serde only emits headers alongside the first record
        csv.write_record([
            "Date",
            "Name",
            "Last Name",
            "First In",
            "Last Out",
            "Inside Time",
            "Outside Time",
            "Status",
        ])?;
    }
    for row in &rows {
        csv.serialize(CsvRow::from(row))
            .context("failed to write CSV row")?;
    }
    csv.flush().context("failed to flush CSV output")?;
    tracing::debug!(rows = rows.len(), "exported daily log");
    Ok(rows.len())
}
