use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while splitting a sales export into order sheets.
#[derive(Debug, Error)]
pub enum Error {
    /// No input path was given on the command line.
    #[error("Missing CSV file path parameter.")]
    MissingArgument,

    /// The input path does not name an existing regular file.
    #[error("CSV file does not exist.")]
    NotFound(PathBuf),

    /// The input could not be read as a sales export.
    #[error("reading {path:?}: {message}")]
    MalformedInput { path: PathBuf, message: String },

    /// A column the pipeline relies on is not in the table layout.
    #[error("column {0:?} not found")]
    Schema(String),

    /// The spreadsheet for one order could not be written.
    #[error("writing order {order_id} to {path:?}: {source}")]
    Write {
        order_id: String,
        path: PathBuf,
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn malformed(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::MalformedInput {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
