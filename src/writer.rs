use log::debug;
use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{ColNum, Format, FormatBorder, RowNum, Workbook, XlsxError};

use std::path::Path;

use crate::{
    order::{Cell, OutputSheet},
    table::{ITEM_PRICE, TOTAL_PRICE},
};

/// Display settings applied when an [`OutputSheet`] is written.
///
/// The sheet data carries no formatting of its own; everything about how
/// it looks in the spreadsheet is decided here.
#[derive(Clone, Debug, PartialEq)]
pub struct SheetStyle {
    /// Excel number format for money columns.
    pub currency_format: String,
    /// Headers of the columns that get `currency_format`.
    pub currency_columns: Vec<String>,
    /// Width of every column, in characters.
    pub column_width: f64,
}

impl Default for SheetStyle {
    fn default() -> Self {
        Self {
            currency_format: "$0".to_string(),
            currency_columns: vec![ITEM_PRICE.to_string(), TOTAL_PRICE.to_string()],
            column_width: 15.0,
        }
    }
}

impl SheetStyle {
    fn is_currency(&self, header: &str) -> bool {
        self.currency_columns.iter().any(|c| c == header)
    }
}

/// Writes `sheet` to a new workbook at `path`, replacing any existing file.
///
/// The header row comes first, in bold, followed by the sheet's rows. No
/// index column is written.
///
/// # Errors
///
/// Returns any error from building the workbook or saving it to `path`.
pub fn write_sheet(sheet: &OutputSheet, path: &Path, style: &SheetStyle) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold().set_border(FormatBorder::Thin);
    let currency_format = Format::new().set_num_format(&style.currency_format);

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(&sheet.name)?;
    for (col, header) in sheet.headers.iter().enumerate() {
        let col = col_num(col)?;
        worksheet.write_string_with_format(0, col, header, &header_format)?;
        worksheet.set_column_width(col, style.column_width)?;
    }

    for (r, cells) in sheet.rows.iter().enumerate() {
        let row = row_num(r + 1)?;
        for (c, cell) in cells.iter().enumerate() {
            let col = col_num(c)?;
            let currency = sheet
                .headers
                .get(c)
                .is_some_and(|h| style.is_currency(h));
            let number = match cell {
                Cell::Empty => continue,
                Cell::Text(text) => {
                    worksheet.write_string(row, col, text)?;
                    continue;
                }
                Cell::Integer(n) => *n as f64,
                Cell::Number(n) => n.to_f64().unwrap_or_default(),
                Cell::Money(usd) => usd.to_f64(),
            };
            if currency {
                worksheet.write_number_with_format(row, col, number, &currency_format)?;
            } else {
                worksheet.write_number(row, col, number)?;
            }
        }
    }

    workbook.save(path)?;
    debug!("saved sheet {:?} to {}", sheet.name, path.display());
    Ok(())
}

fn row_num(index: usize) -> Result<RowNum, XlsxError> {
    RowNum::try_from(index).map_err(|_| XlsxError::RowColumnLimitError)
}

fn col_num(index: usize) -> Result<ColNum, XlsxError> {
    ColNum::try_from(index).map_err(|_| XlsxError::RowColumnLimitError)
}
