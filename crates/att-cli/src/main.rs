use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use att_cli::commands::{daily, details, export, hours, import, late, monthly, status};
use att_cli::{Cli, Commands, Config};
use att_core::Clock;

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(att_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = att_db::Database::open(&config.database_path)
        .with_context(|| format!("failed to open {}", config.database_path.display()))?;
    Ok((db, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Logs go to stderr so reports on stdout stay pipeable.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let (mut db, config) = open_database(cli.config.as_deref())?;
    // One reading of the clock per invocation.
    let now = config.clock()?.now();
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    match command {
        Commands::Import { kind } => {
            let summary = import::run(&mut db, *kind, io::stdin().lock())?;
            eprintln!(
                "Imported {} new of {} records",
                summary.written, summary.read
            );
        }
        Commands::Daily(args) => daily::run(&mut out, &db, &config, args, now)?,
        Commands::Monthly(args) => monthly::run(&mut out, &db, &config, args, now)?,
        Commands::Hours(args) => hours::run(&mut out, &db, &config, args, now)?,
        Commands::Details(args) => details::run(&mut out, &db, &config, args, now)?,
        Commands::Export(args) => {
            export::run(&mut out, &db, &config, args, now)?;
        }
        Commands::Late(args) => {
            late::run(&mut out, &mut db, &config, args, now)?;
        }
        Commands::Status => status::run(&mut out, &db, &config)?,
    }

    out.flush().context("failed to flush output")?;
    Ok(())
}
