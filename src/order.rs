use rust_decimal::Decimal;

use std::{collections::HashMap, str::FromStr};

use crate::{
    error::{Error, Result},
    naming,
    table::{Field, SalesTable, ITEM_PRICE, ORDER_ID, TOTAL_PRICE},
    usd::Usd,
};

/// Label placed in the `ITEM PRICE` column of the last row of a sheet.
pub const GRAND_TOTAL_LABEL: &str = "GRAND TOTAL:";

/// The line items of one order, as indices into the records of the
/// [`SalesTable`] it was grouped from.
///
/// A group always holds at least one record, and its indices are sorted by
/// item number. Items with the same item number keep their source order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OrderGroup {
    order_id: String,
    rows: Vec<usize>,
}

impl OrderGroup {
    #[must_use]
    pub fn order_id(&self) -> &str {
        &self.order_id
    }

    #[must_use]
    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the customer name of the order's first line item.
    #[must_use]
    pub fn customer_name<'a>(&self, table: &'a SalesTable) -> &'a str {
        &table.records()[self.rows[0]].customer_name
    }

    /// Returns the name of the file this order is written to.
    #[must_use]
    pub fn file_name(&self, table: &SalesTable) -> String {
        naming::order_file_name(&self.order_id, self.customer_name(table))
    }

    /// Returns the sum of the total prices of the order's line items.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedInput`] if the sum is too large to
    /// represent.
    pub fn grand_total(&self, table: &SalesTable) -> Result<Usd> {
        self.rows
            .iter()
            .try_fold(Usd::default(), |sum, &i| {
                sum.checked_add(table.records()[i].total_price)
            })
            .ok_or_else(|| {
                Error::malformed(
                    table.path(),
                    format!("grand total of order {} overflows", self.order_id),
                )
            })
    }

    /// Builds the sheet for this order: one row per line item, in item
    /// number order, and a final grand total row.
    ///
    /// The `ORDER ID` column is left out, since every row would hold the
    /// same value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] if `table` has no `ORDER ID`, `ITEM PRICE`
    /// or `TOTAL PRICE` column, and [`Error::MalformedInput`] if the grand
    /// total overflows.
    pub fn to_sheet(&self, table: &SalesTable) -> Result<OutputSheet> {
        if table.position(ORDER_ID).is_none() {
            return Err(Error::Schema(ORDER_ID.to_string()));
        }
        let columns: Vec<_> = table
            .columns()
            .iter()
            .filter(|c| c.field != Field::OrderId)
            .collect();
        let position = |field: Field, name: &str| {
            columns
                .iter()
                .position(|c| c.field == field)
                .ok_or_else(|| Error::Schema(name.to_string()))
        };
        let price_at = position(Field::ItemPrice, ITEM_PRICE)?;
        let total_at = position(Field::TotalPrice, TOTAL_PRICE)?;

        let mut rows: Vec<Vec<Cell>> = self
            .rows
            .iter()
            .map(|&i| {
                let record = &table.records()[i];
                columns
                    .iter()
                    .map(|c| match c.field {
                        Field::OrderId => Cell::Text(record.order_id.clone()),
                        Field::ItemNumber => Cell::Integer(record.item_number),
                        Field::ItemQuantity => Cell::Number(record.item_quantity),
                        Field::ItemPrice => Cell::Money(record.item_price),
                        Field::TotalPrice => Cell::Money(record.total_price),
                        Field::CustomerName => Cell::Text(record.customer_name.clone()),
                        Field::Passthrough(index) => {
                            Cell::parse(record.source_field(index).unwrap_or_default())
                        }
                    })
                    .collect()
            })
            .collect();
        let mut total_row = vec![Cell::Empty; columns.len()];
        total_row[price_at] = Cell::Text(GRAND_TOTAL_LABEL.to_string());
        total_row[total_at] = Cell::Money(self.grand_total(table)?);
        rows.push(total_row);

        Ok(OutputSheet {
            name: naming::sheet_name(&self.order_id),
            headers: columns.iter().map(|c| c.name.clone()).collect(),
            rows,
        })
    }
}

impl SalesTable {
    /// Partitions the records by order ID.
    ///
    /// Orders appear in the order their IDs are first seen in the source.
    #[must_use]
    pub fn orders(&self) -> Vec<OrderGroup> {
        let mut slots: HashMap<&str, usize> = HashMap::new();
        let mut groups: Vec<OrderGroup> = Vec::new();
        for (i, record) in self.records().iter().enumerate() {
            let slot = *slots.entry(&record.order_id).or_insert_with(|| {
                groups.push(OrderGroup {
                    order_id: record.order_id.clone(),
                    rows: Vec::new(),
                });
                groups.len() - 1
            });
            groups[slot].rows.push(i);
        }
        for group in &mut groups {
            group
                .rows
                .sort_by_key(|&i| self.records()[i].item_number);
        }
        groups
    }
}

/// One cell of an [`OutputSheet`].
#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Integer(i64),
    Number(Decimal),
    Money(Usd),
}

impl Cell {
    /// Interprets raw passthrough text: blank is empty, decimals are
    /// numbers, anything else is text.
    fn parse(text: &str) -> Self {
        if text.is_empty() {
            Self::Empty
        } else if let Ok(n) = Decimal::from_str(text) {
            Self::Number(n)
        } else {
            Self::Text(text.to_string())
        }
    }
}

/// The finished contents of one order's spreadsheet.
///
/// `rows` excludes the header row, so its length is the number of line
/// items plus one for the grand total.
#[derive(Clone, Debug, PartialEq)]
pub struct OutputSheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::ADDRESS_COLUMNS;

    fn sales() -> SalesTable {
        let mut table = SalesTable::read_csv("testdata/sales.csv").unwrap();
        table.derive_total_price().unwrap();
        table.drop_columns(&ADDRESS_COLUMNS).unwrap();
        table
    }

    fn usd(s: &str) -> Usd {
        Usd::from_str(s).unwrap()
    }

    #[test]
    fn orders_fn_groups_by_order_id_in_first_seen_order() {
        let table = sales();
        let ids: Vec<_> = table.orders().iter().map(|g| g.order_id().to_string()).collect();
        assert_eq!(ids, vec!["1001", "1002", "1003"]);
    }

    #[test]
    fn orders_fn_covers_every_record_exactly_once() {
        let table = sales();
        let mut seen: Vec<usize> = table.orders().iter().flat_map(|g| g.rows().to_vec()).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..table.len()).collect::<Vec<_>>());
    }

    #[test]
    fn orders_fn_sorts_items_stably_by_item_number() {
        let table = sales();
        let order = &table.orders()[0];
        // items 3, 1, 3 in the source; the two item 3s keep their order
        assert_eq!(order.rows(), &[2, 0, 4]);
    }

    #[test]
    fn orders_fn_returns_nothing_for_empty_table() {
        let mut table = SalesTable::read_csv("testdata/headers_only.csv").unwrap();
        table.derive_total_price().unwrap();
        assert!(table.orders().is_empty());
    }

    #[test]
    fn grand_total_fn_sums_total_prices_exactly() {
        let table = sales();
        let totals: Vec<_> = table.orders().iter().map(|g| g.grand_total(&table).unwrap()).collect();
        assert_eq!(totals, vec![usd("32.65"), usd("199.98"), usd("59.97")]);
    }

    #[test]
    fn grand_total_fn_returns_error_on_overflow() {
        let mut table = SalesTable::read_csv("testdata/overflow_total.csv").unwrap();
        table.derive_total_price().unwrap();
        let orders = table.orders();
        let err = orders[0].grand_total(&table).unwrap_err();
        let Error::MalformedInput { message, .. } = err else {
            panic!("wrong error: {err:?}");
        };
        assert!(message.contains("order 1"), "{message}");
        assert_eq!(orders[1].grand_total(&table).unwrap(), usd("5.00"));
        assert!(matches!(
            orders[0].to_sheet(&table),
            Err(Error::MalformedInput { .. })
        ));
    }

    #[test]
    fn customer_name_fn_uses_first_line_item() {
        let table = sales();
        let order = &table.orders()[1];
        assert_eq!(order.customer_name(&table), "O'Neil, Ltd.");
        assert_eq!(order.file_name(&table), "Order1002_ONeilLtd.xlsx");
    }

    #[test]
    fn to_sheet_fn_lays_out_items_and_grand_total() {
        let table = sales();
        let sheet = table.orders()[0].to_sheet(&table).unwrap();
        assert_eq!(sheet.name, "ORDER 1001");
        assert_eq!(
            sheet.headers,
            vec![
                "ORDER DATE",
                "ITEM NUMBER",
                "ITEM QUANTITY",
                "ITEM PRICE",
                "TOTAL PRICE",
                "STATUS",
                "CUSTOMER NAME",
            ]
        );
        assert_eq!(sheet.rows.len(), 4);
        assert_eq!(
            sheet.rows[0],
            vec![
                Cell::Text("2024-03-01".into()),
                Cell::Integer(1),
                Cell::Number(Decimal::from(4)),
                Cell::Money(usd("0.10")),
                Cell::Money(usd("0.40")),
                Cell::Text("Shipped".into()),
                Cell::Text("A&B Co".into()),
            ]
        );
        assert_eq!(
            sheet.rows[3],
            vec![
                Cell::Empty,
                Cell::Empty,
                Cell::Empty,
                Cell::Text(GRAND_TOTAL_LABEL.into()),
                Cell::Money(usd("32.65")),
                Cell::Empty,
                Cell::Empty,
            ]
        );
    }

    #[test]
    fn to_sheet_fn_rows_are_non_decreasing_by_item_number() {
        let table = sales();
        for order in table.orders() {
            let sheet = order.to_sheet(&table).unwrap();
            assert_eq!(sheet.rows.len(), order.len() + 1);
            let items: Vec<_> = sheet.rows[..order.len()]
                .iter()
                .map(|row| match row[1] {
                    Cell::Integer(n) => n,
                    ref other => panic!("unexpected item number cell {other:?}"),
                })
                .collect();
            assert!(items.windows(2).all(|w| w[0] <= w[1]), "{items:?}");
        }
    }

    #[test]
    fn to_sheet_fn_returns_schema_error_without_total_price() {
        let table = SalesTable::read_csv("testdata/sales.csv").unwrap();
        let err = table.orders()[0].to_sheet(&table).unwrap_err();
        assert!(matches!(err, Error::Schema(ref name) if name == TOTAL_PRICE), "{err:?}");
    }

    #[test]
    fn to_sheet_fn_returns_schema_error_without_order_id() {
        let mut table = sales();
        table.drop_columns(&[ORDER_ID]).unwrap();
        let err = table.orders()[0].to_sheet(&table).unwrap_err();
        assert!(matches!(err, Error::Schema(ref name) if name == ORDER_ID), "{err:?}");
    }

    #[test]
    fn cell_parse_fn_distinguishes_numbers_from_text() {
        assert_eq!(Cell::parse(""), Cell::Empty);
        assert_eq!(Cell::parse("62701"), Cell::Number(Decimal::from(62701)));
        assert_eq!(Cell::parse("Shipped"), Cell::Text("Shipped".into()));
    }
}
