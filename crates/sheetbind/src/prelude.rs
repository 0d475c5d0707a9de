//! Prelude module - common imports for sheetbind users
//!
//! ```rust
//! use sheetbind::prelude::*;
//! ```

pub use crate::{
    // Bindings
    ColumnBinding,
    ColumnWidth,
    LabelDomain,
    LinkUrl,
    PathExpr,
    // Documents and sheets
    ConfiguredSheet,
    Document,
    DocumentKind,
    SheetDefaults,
    // Cells
    CellHandle,
    DataType,
    FormatCode,
    // Values
    ExtraData,
    Record,
    Value,
    // Import
    ImportSheet,
    Importer,
    // Errors
    Error,
    Result,
    // Styles
    Color,
    Style,
};
