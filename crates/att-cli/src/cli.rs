//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::{daily, details, export, hours, late, monthly};

/// Office attendance tracker.
///
/// Reconstructs arrival, departure and time inside the building from
/// badge-reader swipes.
#[derive(Debug, Parser)]
#[command(name = "att", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Import JSONL records from stdin.
    Import {
        #[command(subcommand)]
        kind: ImportKind,
    },

    /// Show the daily attendance log.
    Daily(daily::DailyArgs),

    /// Show the monthly attendance grid.
    Monthly(monthly::MonthlyArgs),

    /// Show one employee's tracked hours per weekday, with the total.
    Hours(hours::HoursArgs),

    /// Show one employee's swipes on one day.
    Details(details::DetailsArgs),

    /// Export the daily log as CSV to stdout.
    Export(export::ExportArgs),

    /// Check today's arrivals against the start of work and record late ones.
    Late(late::LateArgs),

    /// Show database status and the last swipe per reader.
    Status,
}

/// Record types accepted by `att import`.
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ImportKind {
    /// Reader swipes: `{"id", "name", "last_name", "timestamp", "reader_name"}`.
    Swipes,

    /// Employee directory: `{"id", "name", "last_name", "position", "email"}`.
    Employees,
}
