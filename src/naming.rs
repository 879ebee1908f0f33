use chrono::NaiveDate;
use regex::Regex;

use std::sync::OnceLock;

fn non_word() -> &'static Regex {
    static NON_WORD: OnceLock<Regex> = OnceLock::new();
    NON_WORD.get_or_init(|| Regex::new(r"\W").expect("valid regex"))
}

/// Strips every character that is not a letter, digit or underscore from
/// `name`, so that it can be used in a file name.
///
/// # Examples
///
/// ```
/// # use order_split::naming::sanitize;
/// assert_eq!(sanitize("A&B Co"), "ABCo");
/// assert_eq!(sanitize("ABCo"), "ABCo");
/// ```
#[must_use]
pub fn sanitize(name: &str) -> String {
    non_word().replace_all(name, "").into_owned()
}

/// Returns the spreadsheet file name for an order, in the format
/// `Order<ORDER_ID>_<CUSTOMER>.xlsx`.
///
/// Only the customer name is sanitized; the order ID is used as it
/// appears in the export.
#[must_use]
pub fn order_file_name(order_id: &str, customer_name: &str) -> String {
    format!("Order{order_id}_{}.xlsx", sanitize(customer_name))
}

/// Returns the name of the single sheet in an order's spreadsheet.
#[must_use]
pub fn sheet_name(order_id: &str) -> String {
    format!("ORDER {order_id}")
}

/// Returns the name of the directory that holds the order spreadsheets
/// produced on `date`.
#[must_use]
pub fn orders_dir_name(date: NaiveDate) -> String {
    format!("Orders{}", date.format("%Y-%m-%d"))
}
