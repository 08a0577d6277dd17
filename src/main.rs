use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::{ArgAction, Parser};

use std::path::PathBuf;

use orders::{Config, DEFAULT_DROP_COLUMNS};

#[derive(Parser)]
#[command(version, about)]
/// Splits a sales data CSV file into one spreadsheet per order.
///
/// The spreadsheets are written to an `Orders_<YYYY-MM-DD>` directory beside
/// the CSV file.
struct Args {
    /// Path to the sales data CSV file
    sales_csv: Option<PathBuf>,
    /// Column to leave out of the order sheets (repeat for several; replaces
    /// the default list)
    #[arg(long = "drop", value_name = "COLUMN", default_values_t = DEFAULT_DROP_COLUMNS.map(String::from))]
    drop: Vec<String>,
    /// Keep every input column
    #[arg(long)]
    keep_all_columns: bool,
    /// Date to stamp on the output, as YYYY-MM-DD [default: today]
    #[arg(long, value_name = "DATE")]
    date: Option<NaiveDate>,
    /// Log more detail to stderr (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let sales_csv = orders::sales_csv(args.sales_csv)?;
    let run_date = args.date.unwrap_or_else(|| Local::now().date_naive());
    let drop = if args.keep_all_columns {
        Vec::new()
    } else {
        args.drop
    };
    let config = Config::new(run_date).with_drop_columns(drop);
    let orders_dir = orders::create_orders_dir(&sales_csv, run_date)?;
    for order in orders::process_sales_data(&sales_csv, &orders_dir, &config)? {
        println!("Order {} saved to: {}", order.order_id, order.path.display());
    }
    Ok(())
}
