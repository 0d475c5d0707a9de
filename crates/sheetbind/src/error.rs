//! Error types for sheetbind

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while configuring, rendering or importing sheets
///
/// A path that simply does not exist on an item is never an error; it
/// resolves to the caller's default.
#[derive(Debug, Error)]
pub enum Error {
    /// Path text that cannot be parsed
    #[error("Invalid path '{path}': {reason}")]
    InvalidPath {
        /// The offending path
        path: String,
        /// What is wrong with it
        reason: String,
    },

    /// Sheet or binding set up in a way the backend cannot honor
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A value that cannot be stored in a cell of the requested type
    #[error("Cannot write {value} as {target}")]
    InvalidCellValue {
        /// Description of the value
        value: String,
        /// Target cell type
        target: String,
    },

    /// `apply_data` was already called on this sheet
    #[error("Data was already applied to sheet '{0}'")]
    AlreadyApplied(String),

    /// `apply_data` was called without data
    #[error("No data attached to sheet '{0}'")]
    NoData(String),

    /// Required import headers were not found
    #[error(
        "Not all necessary columns found in row {row}. Required: {}. Missing: {}",
        required.join(", "),
        missing.join(", ")
    )]
    MissingHeaders {
        /// Header row (1-based)
        row: u32,
        /// Every required header
        required: Vec<String>,
        /// The headers that were not found
        missing: Vec<String>,
    },

    /// An importer hook that must be overridden was not
    #[error("Importer hook '{0}' is not implemented")]
    HookNotImplemented(&'static str),

    /// Import source does not exist
    #[error("Cannot find spreadsheet file {}", .0.display())]
    FileNotFound(PathBuf),

    /// XLSX reading/writing error
    #[error("XLSX error: {0}")]
    Xlsx(#[from] sheetbind_xlsx::XlsxError),

    /// Spreadsheet model error
    #[error("Core error: {0}")]
    Core(#[from] sheetbind_core::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn invalid_path(path: &str, reason: impl Into<String>) -> Self {
        Error::InvalidPath {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn config<S: Into<String>>(msg: S) -> Self {
        Error::Configuration(msg.into())
    }

    pub(crate) fn invalid_cell(value: impl Into<String>, target: impl Into<String>) -> Self {
        Error::InvalidCellValue {
            value: value.into(),
            target: target.into(),
        }
    }
}
