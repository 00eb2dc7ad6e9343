//! DJ Import
//!
//! Loads a CSV file into a table of the SQLite database served by `dj-mcp`.

use clap::Parser;
use std::path::PathBuf;

/// Import a CSV file into a SQLite table (all columns TEXT, header row names them)
#[derive(Debug, Parser)]
#[command(name = "dj-import", version)]
struct Args {
    /// CSV file to import
    csv: PathBuf,

    /// SQLite database file, created if missing
    #[arg(long, short, env = "DJ_DATABASE", default_value = "database.db")]
    database: PathBuf,

    /// Table to create or append to
    #[arg(long, short, default_value = "song")]
    table: String,
}

fn main() -> anyhow::Result<()> {
    mcp_common::init_tracing("dj_import")?;

    let args = Args::parse();
    let summary = dj_mcp::import::import_csv(&args.csv, &args.database, &args.table)?;

    tracing::info!(
        "Imported {} rows from {:?} into table '{}' in {:?}",
        summary.rows,
        args.csv,
        summary.table,
        args.database
    );

    Ok(())
}
