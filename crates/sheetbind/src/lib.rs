//! # sheetbind
//!
//! Bind in-memory data collections to spreadsheet columns and render them to XLSX.
//!
//! A [`ColumnBinding`] says what a column shows: a label, a path into each
//! data item (or a literal, or a callback), and how the cell looks. A
//! [`ConfiguredSheet`] holds the bindings of one sheet plus its data, and
//! [`ConfiguredSheet::apply_data`] renders the header row and one row per
//! item. The [`Document`] owning the sheets writes them out through one of
//! two backends:
//!
//! - [`DocumentKind::RandomAccess`] keeps the workbook in memory; it supports
//!   row grouping, autofilter, frozen panes, wrap text and auto-sized columns
//! - [`DocumentKind::Streaming`] appends finished rows to temp files, keeping
//!   memory flat for large exports
//!
//! ## Path expressions
//!
//! | form | meaning |
//! |------|---------|
//! | `name`, `a.b`, `[0]`, `a[1].c` | read from the item through [`Record`] |
//! | `$text` | the literal `text` |
//! | `!key.rest` | read `rest` from the row's extra data entry `key` |
//!
//! A path that does not exist on an item yields the default (an empty
//! string for cell values); only malformed paths are errors.
//!
//! ## Example
//!
//! ```rust
//! use sheetbind::prelude::*;
//!
//! let mut doc = Document::new(DocumentKind::RandomAccess).unwrap();
//! let sheet = doc.add_sheet("Guests").unwrap();
//! sheet.add_column_binding(ColumnBinding::new("Name", "[0]"));
//! sheet.add_column_binding(
//!     ColumnBinding::new("Paid", "[1]").with_formatter(|v| Value::from(if v.is_truthy() { "yes" } else { "no" })),
//! );
//! sheet.add_column_binding(ColumnBinding::new("Source", "$web"));
//! sheet.set_data(vec![
//!     vec![Value::from("Peter"), Value::Bool(true)],
//!     vec![Value::from("Mary"), Value::Bool(false)],
//! ]);
//! assert_eq!(sheet.apply_data(1, 1).unwrap(), 2);
//!
//! // doc.write_to_file("guests.xlsx").unwrap();
//! ```

pub mod backend;
pub mod binding;
pub mod config;
pub mod data_type;
pub mod document;
pub mod error;
pub mod format;
pub mod formatter;
pub mod html;
pub mod import;
pub mod path;
pub mod prelude;
pub mod resolve;
pub mod sheet;
pub mod translate;
pub mod value;

mod engine;
mod style_map;

pub use backend::{CellHandle, GridCell, StreamCell};
pub use binding::{
    BindingFn, CellModifier, ColumnBinding, ColumnWidth, Formatter, LinkFn, LinkUrl, PathExpr,
};
pub use config::{DocumentKind, SheetDefaults};
pub use data_type::{DataType, STREAM_DATE_FORMAT};
pub use document::{create_document, Document};
pub use error::{Error, Result};
pub use format::{
    currency_modifier, date_modifier, date_time_modifier, float_modifier, format_modifier,
    int_modifier, FormatCode,
};
pub use formatter::{translation_formatter, yes_no_formatter};
pub use html::decode_html_entities;
pub use import::{open_workbook, HeaderMapping, ImportSheet, Importer};
pub use resolve::ValuePathResolver;
pub use sheet::{BindingId, ConfiguredSheet, ExtraDataFn};
pub use translate::{translate_label, LabelDomain, MessageCatalog, Translator, DEFAULT_DOMAIN};
pub use value::{ExtraData, Record, Value};

// Re-export the model types that appear in the public API
pub use sheetbind_core::{CellValue, Color, HorizontalAlignment, Style, VerticalAlignment};
