use std::{path::PathBuf, process::ExitCode};

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use env_logger::Env;
use order_split::{split_orders, Error, SheetStyle};

#[derive(Parser)]
#[command(version)]
/// Splits a sales data CSV file into one spreadsheet per order.
///
/// The spreadsheets are written to a directory named Orders<YYYY-MM-DD>,
/// next to the CSV file.
struct Args {
    /// Path of the sales data CSV file
    csv_path: Option<PathBuf>,
    /// Date to use in the output directory name [default: today]
    #[arg(long, value_name = "YYYY-MM-DD")]
    date: Option<NaiveDate>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let csv_path = args.csv_path.ok_or(Error::MissingArgument)?;
    if !csv_path.is_file() {
        return Err(Error::NotFound(csv_path).into());
    }
    let date = args.date.unwrap_or_else(|| Local::now().date_naive());
    let summary = split_orders(&csv_path, date, &SheetStyle::default())
        .with_context(|| format!("splitting {}", csv_path.display()))?;
    if !summary.is_success() {
        bail!(
            "failed to write {} order file(s): {}",
            summary.failed.len(),
            summary.failed_ids()
        );
    }
    Ok(())
}
