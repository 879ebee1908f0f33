#![doc = include_str!("../README.md")]
use chrono::NaiveDate;
use log::{error, info};

use std::{
    fs,
    path::{Path, PathBuf},
};

pub mod error;
pub mod naming;
pub mod order;
pub mod table;
pub mod usd;
pub mod writer;

pub use error::{Error, Result};
pub use order::{Cell, OrderGroup, OutputSheet};
pub use table::SalesTable;
pub use usd::Usd;
pub use writer::SheetStyle;

use table::ADDRESS_COLUMNS;

/// The outcome of writing one spreadsheet per order.
#[derive(Debug, Default)]
pub struct Summary {
    /// Files written, in order.
    pub written: Vec<PathBuf>,
    /// Orders whose sheet could not be built or written, with the reason.
    pub failed: Vec<(String, Error)>,
}

impl Summary {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Returns the IDs of the orders that failed, comma separated.
    #[must_use]
    pub fn failed_ids(&self) -> String {
        self.failed
            .iter()
            .map(|(id, _)| id.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Reads the sales export at `path` and prepares it for splitting: adds the
/// `TOTAL PRICE` column and drops the address columns.
///
/// # Errors
///
/// Returns any error from [`SalesTable::read_csv`],
/// [`SalesTable::derive_total_price`] or [`SalesTable::drop_columns`].
pub fn load_sales(path: impl AsRef<Path>) -> Result<SalesTable> {
    let mut table = SalesTable::read_csv(path)?;
    table.derive_total_price()?;
    table.drop_columns(&ADDRESS_COLUMNS)?;
    Ok(table)
}

/// Creates the `Orders<YYYY-MM-DD>` directory next to `csv_path`, unless
/// it already exists, and returns its path.
///
/// # Errors
///
/// Returns any error from creating the directory.
pub fn prepare_orders_dir(csv_path: impl AsRef<Path>, date: NaiveDate) -> Result<PathBuf> {
    let parent = csv_path.as_ref().parent().unwrap_or_else(|| Path::new(""));
    let dir = parent.join(naming::orders_dir_name(date));
    if !dir.is_dir() {
        fs::create_dir_all(&dir)?;
        info!("created {}", dir.display());
    }
    Ok(dir)
}

/// Writes one spreadsheet per order in `table` into `dir`.
///
/// An order whose sheet cannot be built or written does not stop the
/// others: the failure is logged and recorded in the returned [`Summary`].
#[must_use]
pub fn write_orders(table: &SalesTable, dir: &Path, style: &SheetStyle) -> Summary {
    let mut summary = Summary::default();
    for order in table.orders() {
        let path = dir.join(order.file_name(table));
        match write_order(table, &order, &path, style) {
            Ok(total) => {
                info!(
                    "wrote order {} ({} items, {total}) to {}",
                    order.order_id(),
                    order.len(),
                    path.display()
                );
                summary.written.push(path);
            }
            Err(err) => {
                error!("{err}");
                summary.failed.push((order.order_id().to_string(), err));
            }
        }
    }
    summary
}

fn write_order(
    table: &SalesTable,
    order: &OrderGroup,
    path: &Path,
    style: &SheetStyle,
) -> Result<Usd> {
    let total = order.grand_total(table)?;
    let sheet = order.to_sheet(table)?;
    writer::write_sheet(&sheet, path, style).map_err(|source| Error::Write {
        order_id: order.order_id().to_string(),
        path: path.to_path_buf(),
        source,
    })?;
    Ok(total)
}

/// Splits the sales export at `csv_path` into one spreadsheet per order,
/// in the `Orders<YYYY-MM-DD>` directory for `date` next to it.
///
/// The export is loaded in full before the directory is created, so a bad
/// input leaves nothing behind.
///
/// # Errors
///
/// Returns any error from [`load_sales`] or [`prepare_orders_dir`].
/// Failures of individual orders are reported in the [`Summary`] instead.
pub fn split_orders(
    csv_path: impl AsRef<Path>,
    date: NaiveDate,
    style: &SheetStyle,
) -> Result<Summary> {
    let table = load_sales(&csv_path)?;
    let dir = prepare_orders_dir(&csv_path, date)?;
    Ok(write_orders(&table, &dir, style))
}
