//! # sheetbind-core
//!
//! In-memory spreadsheet model shared by the sheetbind crates.
//!
//! This crate provides the types the random-access backend renders into and
//! the importer reads back from:
//! - [`CellValue`] - Values a cell can hold (numbers, strings, booleans, formulas, errors)
//! - [`CellAddress`] and [`CellRange`] - Cell addressing and ranges
//! - [`Style`] - Cell formatting (font, fill, alignment, number format)
//! - [`Workbook`], [`Worksheet`] - The document structures
//!
//! ## Example
//!
//! ```rust
//! use sheetbind_core::{CellValue, Workbook};
//!
//! let mut workbook = Workbook::new();
//! let index = workbook.add_worksheet_with_name("Guests").unwrap();
//! let sheet = workbook.worksheet_mut(index).unwrap();
//!
//! // Row/column indices are 0-based
//! sheet.set_cell_value_at(0, 0, "Name").unwrap();
//! sheet.set_cell_value_at(1, 0, CellValue::string("Peter")).unwrap();
//! sheet.set_row_outline_level(1, 1).unwrap();
//! ```

pub mod cell;
pub mod column;
pub mod date;
pub mod error;
pub mod row;
pub mod style;
pub mod workbook;
pub mod worksheet;

// Re-exports for convenience
pub use cell::{CellAddress, CellData, CellRange, CellValue};
pub use column::Column;
pub use error::{Error, Result};
pub use row::Row;
pub use workbook::{sanitize_sheet_name, DocumentProperties, Workbook};
pub use worksheet::{FreezePane, Worksheet};

pub use style::{
    Alignment, Color, FillStyle, FontStyle, HorizontalAlignment, NumberFormat, Style, StylePool,
    VerticalAlignment,
};

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u16 = 16_384;

/// Maximum length of a sheet name
pub const MAX_SHEET_NAME_LEN: usize = 31;

/// Maximum outline (grouping) level Excel supports
pub const MAX_OUTLINE_LEVEL: u8 = 7;
