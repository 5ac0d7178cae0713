//! Monthly attendance grid.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDateTime, NaiveTime};
use clap::Args;

use att_core::monthly::month_bounds;
use att_core::{MonthlyGrid, Page, build_monthly_grid};
use att_db::Database;

use crate::Config;

#[derive(Debug, Args)]
pub struct MonthlyArgs {
    /// Year to show. Default: current year.
    #[arg(long)]
    pub year: Option<i32>,

    /// Month to show (1-12). Default: current month.
    #[arg(long)]
    pub month: Option<u32>,

    /// Only employees whose name contains this text.
    #[arg(long)]
    pub search: Option<String>,

    /// Page of employees to show, starting at 1.
    #[arg(long, default_value_t = 1)]
    pub page: usize,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    config: &Config,
    args: &MonthlyArgs,
    now: NaiveDateTime,
) -> Result<()> {
    let grid = load_grid(db, config, args, now)?;

    if args.json {
        let json = serde_json::to_string_pretty(&grid).context("failed to serialize grid")?;
        writeln!(writer, "{json}")?;
        return Ok(());
    }
    write_grid(writer, &grid)
}

fn load_grid(
    db: &Database,
    config: &Config,
    args: &MonthlyArgs,
    now: NaiveDateTime,
) -> Result<MonthlyGrid> {
    let mut year = args.year.unwrap_or_else(|| now.year());
    let mut month = args.month.unwrap_or_else(|| now.month());
    if let Err(err) = month_bounds(year, month) {
        tracing::warn!(%err, "falling back to the current month");
        year = now.year();
        month = now.month();
    }
    let (first, last) = month_bounds(year, month)?;

    let employees = db
        .list_employees(&config.employee_filter(args.search.as_deref()))
        .context("failed to load employees")?;
    let (_, end) = att_db::day_range(last);
    let classifier = config.classifier();
    let swipes = db
        .classified_swipes(first.and_time(NaiveTime::MIN), end, classifier.as_ref())
        .context("failed to load swipes")?;

    let page = Page {
        number: args.page,
        per_page: config.per_page,
    };
    build_monthly_grid(&employees, &swipes, year, month, now, page, &config.policy())
        .context("failed to build monthly grid")
}

fn write_grid<W: Write>(writer: &mut W, grid: &MonthlyGrid) -> Result<()> {
    writeln!(writer, "{} {}", grid.month_name, grid.year)?;
    if grid.rows.is_empty() {
        writeln!(writer, "No employees.")?;
        return Ok(());
    }

    write!(writer, "{:<24}", "Employee")?;
    for day in &grid.headers {
        write!(writer, " {day:>2}")?;
    }
    writeln!(writer)?;

    for row in &grid.rows {
        write!(writer, "{:<24}", row.name)?;
        for cell in &row.days {
            write!(writer, "  {cell}")?;
        }
        writeln!(writer)?;
    }
    writeln!(
        writer,
        "Page {} of {} ({} employees)",
        grid.current_page, grid.total_pages, grid.total_items
    )?;
    Ok(())
}
