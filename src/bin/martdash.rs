/// MartDash command-line report
///
/// Loads an order file, runs the dashboard pipeline for one date range and
/// prints the snapshot as JSON on stdout.

use chrono::NaiveDate;
use clap::Parser;
use martdash::{Dashboard, DateRange, OrderTable, DEFAULT_LEADERBOARD_SIZE};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "martdash", version, about = "Order analytics snapshot for a date range")]
struct Cli {
    /// Order-line CSV file
    #[arg(short, long, default_value = "all_data.csv")]
    data: PathBuf,

    /// First day of the range (YYYY-MM-DD); defaults to the first purchase date
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Last day of the range, inclusive; defaults to the last purchase date
    #[arg(long)]
    end: Option<NaiveDate>,

    /// Rows per leaderboard
    #[arg(long, default_value_t = DEFAULT_LEADERBOARD_SIZE)]
    top: usize,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

fn main() -> ExitCode {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    let cli = Cli::parse();

    let table = match OrderTable::from_csv_path(&cli.data) {
        Ok(table) => table,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let dashboard = Dashboard::new(&table).with_leaderboard_size(cli.top);
    let Some(bounds) = dashboard.bounds() else {
        log::error!("{} contains no order lines", cli.data.display());
        return ExitCode::FAILURE;
    };

    // Clamped like the date picker; a window past the data stays empty
    let range = DateRange::new(cli.start.unwrap_or(bounds.0), cli.end.unwrap_or(bounds.1))
        .clamp_to(bounds);
    let snapshot = dashboard.snapshot(range);

    let json = if cli.pretty {
        serde_json::to_string_pretty(&snapshot)
    } else {
        serde_json::to_string(&snapshot)
    };
    match json {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Failed to serialize snapshot: {}", e);
            ExitCode::FAILURE
        }
    }
}
