use log::debug;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_with::{serde_as, DisplayFromStr};

use std::path::{Path, PathBuf};

use crate::{
    error::{Error, Result},
    usd::Usd,
};

pub const ORDER_ID: &str = "ORDER ID";
pub const ITEM_NUMBER: &str = "ITEM NUMBER";
pub const ITEM_QUANTITY: &str = "ITEM QUANTITY";
pub const ITEM_PRICE: &str = "ITEM PRICE";
pub const TOTAL_PRICE: &str = "TOTAL PRICE";
pub const CUSTOMER_NAME: &str = "CUSTOMER NAME";

/// Address columns, which have no place on a per-order sheet.
pub const ADDRESS_COLUMNS: [&str; 5] = ["ADDRESS", "CITY", "STATE", "POSTAL CODE", "COUNTRY"];

/// Columns every sales export must have.
pub const REQUIRED_COLUMNS: [&str; 10] = [
    ORDER_ID,
    ITEM_NUMBER,
    ITEM_QUANTITY,
    ITEM_PRICE,
    CUSTOMER_NAME,
    "ADDRESS",
    "CITY",
    "STATE",
    "POSTAL CODE",
    "COUNTRY",
];

/// Where the value of a column comes from in a [`SalesRecord`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Field {
    OrderId,
    ItemNumber,
    ItemQuantity,
    ItemPrice,
    TotalPrice,
    CustomerName,
    /// Any other column, by its index in the source row.
    Passthrough(usize),
}

/// A named column of a [`SalesTable`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Column {
    pub name: String,
    pub field: Field,
}

impl Column {
    fn new(name: impl Into<String>, field: Field) -> Self {
        Self {
            name: name.into(),
            field,
        }
    }
}

/// One line item of a sales export.
#[serde_as]
#[derive(Clone, Debug, Deserialize)]
pub struct SalesRecord {
    #[serde(rename = "ORDER ID")]
    pub order_id: String,
    #[serde(rename = "ITEM NUMBER")]
    pub item_number: i64,
    #[serde_as(as = "DisplayFromStr")]
    #[serde(rename = "ITEM QUANTITY")]
    pub item_quantity: Decimal,
    #[serde(rename = "ITEM PRICE")]
    pub item_price: Usd,
    #[serde(rename = "CUSTOMER NAME")]
    pub customer_name: String,
    /// `item_quantity * item_price`, once [`SalesTable::derive_total_price`]
    /// has run.
    #[serde(skip)]
    pub total_price: Usd,
    /// The complete source row, for passthrough columns.
    #[serde(skip)]
    pub source: csv::StringRecord,
}

impl SalesRecord {
    /// Returns the raw source text of column `index`, if present.
    #[must_use]
    pub fn source_field(&self, index: usize) -> Option<&str> {
        self.source.get(index)
    }
}

/// Holds a loaded sales export: its column layout and its records, in
/// source order.
#[derive(Debug, Default)]
pub struct SalesTable {
    path: PathBuf,
    columns: Vec<Column>,
    records: Vec<SalesRecord>,
}

impl SalesTable {
    /// Reads a sales export from the CSV file at `path`.
    ///
    /// The file must have a header row naming at least the
    /// [`REQUIRED_COLUMNS`], in any order. Leading and trailing whitespace
    /// is trimmed from every field.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if `path` is not a regular file, and
    /// [`Error::MalformedInput`] if the file cannot be parsed as CSV, lacks
    /// a required column, or holds a value of the wrong type.
    pub fn read_csv(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::NotFound(path.to_path_buf()));
        }
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| Error::malformed(path, e))?;
        let headers = rdr.headers().map_err(|e| Error::malformed(path, e))?.clone();
        let missing: Vec<_> = REQUIRED_COLUMNS
            .iter()
            .filter(|&&name| !headers.iter().any(|h| h == name))
            .copied()
            .collect();
        if !missing.is_empty() {
            return Err(Error::malformed(
                path,
                format!("missing required column(s): {}", missing.join(", ")),
            ));
        }
        let columns = headers
            .iter()
            .enumerate()
            .map(|(index, name)| {
                let field = match name {
                    ORDER_ID => Field::OrderId,
                    ITEM_NUMBER => Field::ItemNumber,
                    ITEM_QUANTITY => Field::ItemQuantity,
                    ITEM_PRICE => Field::ItemPrice,
                    CUSTOMER_NAME => Field::CustomerName,
                    _ => Field::Passthrough(index),
                };
                Column::new(name, field)
            })
            .collect();
        let mut records = Vec::new();
        for result in rdr.records() {
            let source = result.map_err(|e| Error::malformed(path, e))?;
            let mut record: SalesRecord = source
                .deserialize(Some(&headers))
                .map_err(|e| Error::malformed(path, e))?;
            record.source = source;
            records.push(record);
        }
        debug!("read {} line items from {}", records.len(), path.display());
        Ok(Self {
            path: path.to_path_buf(),
            columns,
            records,
        })
    }

    /// Returns the path the table was read from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    #[must_use]
    pub fn records(&self) -> &[SalesRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the position of the column named `name`, if any.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Computes the total price of every record, and adds a `TOTAL PRICE`
    /// column directly after `ITEM PRICE`.
    ///
    /// A source column that happens to be called `TOTAL PRICE` is replaced
    /// by the computed one. Calling this more than once has no further
    /// effect on the layout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedInput`] if any total price is too large to
    /// represent, in which case no record or column is changed.
    pub fn derive_total_price(&mut self) -> Result<()> {
        let totals = self
            .records
            .iter()
            .map(|record| {
                record
                    .item_price
                    .checked_mul(record.item_quantity)
                    .ok_or_else(|| {
                        let line = record.source.position().map_or(0, csv::Position::line);
                        Error::malformed(
                            &self.path,
                            format!(
                                "line {line}: total price of order {} item {} overflows",
                                record.order_id, record.item_number
                            ),
                        )
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        for (record, total) in self.records.iter_mut().zip(totals) {
            record.total_price = total;
        }
        self.columns
            .retain(|c| c.name != TOTAL_PRICE || c.field == Field::TotalPrice);
        if self.columns.iter().any(|c| c.field == Field::TotalPrice) {
            return Ok(());
        }
        let at = self
            .columns
            .iter()
            .position(|c| c.field == Field::ItemPrice)
            .map_or(self.columns.len(), |i| i + 1);
        self.columns
            .insert(at, Column::new(TOTAL_PRICE, Field::TotalPrice));
        Ok(())
    }

    /// Removes the columns called `names` from the layout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] if any of `names` is not a column, in which
    /// case no column is removed.
    pub fn drop_columns(&mut self, names: &[&str]) -> Result<()> {
        if let Some(name) = names.iter().find(|&&name| self.position(name).is_none()) {
            return Err(Error::Schema((*name).to_string()));
        }
        self.columns.retain(|c| !names.contains(&c.name.as_str()));
        Ok(())
    }
}
