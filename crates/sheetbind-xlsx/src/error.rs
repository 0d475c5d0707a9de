//! XLSX error types

use thiserror::Error;

/// Result type for XLSX operations
pub type XlsxResult<T> = std::result::Result<T, XlsxError>;

/// Errors that can occur during XLSX reading/writing
#[derive(Debug, Error)]
pub enum XlsxError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP error
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// XML error
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Invalid file format
    #[error("Invalid XLSX format: {0}")]
    InvalidFormat(String),

    /// Missing required part
    #[error("Missing required part: {0}")]
    MissingPart(String),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// The stream writer was already finished
    #[error("Stream writer is closed")]
    StreamClosed,

    /// A row was appended below the sheet's write position
    #[error("Row {row} of sheet '{sheet}' is before the next writable row {next}")]
    RowOrder {
        /// Sheet name
        sheet: String,
        /// Requested row (0-based)
        row: u32,
        /// Next writable row (0-based)
        next: u32,
    },

    /// No sheet at this index
    #[error("Unknown sheet index {0}")]
    UnknownSheet(usize),

    /// Core error
    #[error("Core error: {0}")]
    Core(#[from] sheetbind_core::Error),
}
