#![doc = include_str!("../README.md")]
use tracing::{debug, info};

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

mod config;
mod error;
mod order;
mod paths;
mod sales;
mod usd;
pub mod xlsx;

pub use config::{Config, DEFAULT_DROP_COLUMNS};
pub use error::{Error, Result};
pub use order::{Cell, OrderReport, GRAND_TOTAL_LABEL};
pub use paths::{create_orders_dir, sales_csv};
pub use sales::{Column, ItemNumber, Key, LineItem, OrderId, SalesTable};
pub use usd::Usd;

/// Summary of one order spreadsheet written by [`process_sales_data`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedOrder {
    pub order_id: String,
    pub path: PathBuf,
    pub items: usize,
    pub grand_total: Usd,
}

/// Splits the sales data in `sales_csv` into one spreadsheet per order,
/// written to `orders_dir`.
///
/// Each sheet lists the order's line items sorted by item number, with a
/// TOTAL PRICE for each and a final GRAND TOTAL row. An input with no data
/// rows writes nothing. Orders whose IDs map to the same file name are
/// written to distinct files (see [`OrderReport::claim_file_name`]).
///
/// # Errors
///
/// Returns the first error from reading the sales data (see
/// [`SalesTable::read_csv`]), totalling the orders (see
/// [`SalesTable::into_orders`]) or writing a spreadsheet (see
/// [`xlsx::write_report`]). Sheets already written are left in place.
pub fn process_sales_data(
    sales_csv: &Path,
    orders_dir: &Path,
    config: &Config,
) -> Result<Vec<SavedOrder>> {
    let table = SalesTable::read_csv(sales_csv, config)?;
    let mut saved = Vec::new();
    let mut taken = HashSet::new();
    for mut report in table.into_orders()? {
        report.claim_file_name(&mut taken);
        debug!("\n{report}");
        let path = xlsx::write_report(&report, orders_dir, config.run_date)?;
        info!(order = report.order_id(), path = %path.display(), "order saved");
        saved.push(SavedOrder {
            order_id: report.order_id().to_string(),
            path,
            items: report.items().len(),
            grand_total: report.grand_total(),
        });
    }
    Ok(saved)
}
