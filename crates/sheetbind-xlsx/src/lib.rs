//! # sheetbind-xlsx
//!
//! XLSX (Office Open XML) support for sheetbind.
//!
//! - [`XlsxWriter`] serializes a complete in-memory [`Workbook`](sheetbind_core::Workbook)
//! - [`StreamWriter`] appends rows to per-sheet temp files and assembles the
//!   package on [`finish`](StreamWriter::finish), keeping memory flat
//! - [`XlsxReader`] loads a file back into a `Workbook`

pub mod error;
pub mod reader;
pub mod stream;
pub mod writer;

mod package;
mod styles;
mod xml;

pub use error::{XlsxError, XlsxResult};
pub use reader::XlsxReader;
pub use stream::{RowCell, StreamWriter};
pub use writer::XlsxWriter;
