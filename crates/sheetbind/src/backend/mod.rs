//! Backend abstraction
//!
//! The render engine talks to a [`Backend`] and fills in [`CellHandle`]s;
//! it never looks at which backend it is driving. The two implementations
//! differ in capability:
//! - [`grid`]: the whole workbook in memory; cells can be restyled after
//!   they are written, rows can be grouped, and the sheet gets table-wide
//!   post-processing
//! - [`stream`]: rows are appended once, fully styled, in increasing order

pub(crate) mod grid;
pub(crate) mod stream;

use sheetbind_core::{CellValue, NumberFormat, Style};

use crate::binding::ColumnBinding;
use crate::config::DocumentKind;
use crate::data_type::{self, DataType};
use crate::error::Result;
use crate::value::Value;

pub use grid::GridCell;
pub use stream::StreamCell;

/// A cell being rendered, before it is handed to its backend
///
/// Cell modifiers receive this interface, so they can adjust the value,
/// style or number format without knowing the backend.
pub trait CellHandle {
    /// Backend the cell belongs to
    fn kind(&self) -> DocumentKind;

    /// Row (1-based)
    fn row(&self) -> u32;

    /// Column (1-based)
    fn column(&self) -> u32;

    /// Current value
    fn value(&self) -> &CellValue;

    /// Set a value, inferring the cell type
    fn set_value(&mut self, value: &Value) -> Result<()>;

    /// Set a value with an explicit cell type
    fn set_value_explicit(&mut self, value: &Value, data_type: DataType) -> Result<()>;

    /// Explicit type, if one was used
    fn data_type(&self) -> Option<DataType>;

    /// Current style
    fn style(&self) -> &Style;

    /// Replace the style
    fn set_style(&mut self, style: Style);

    /// Change only the number format of the style
    fn set_number_format(&mut self, code: &str) {
        let mut style = self.style().clone();
        style.number_format = NumberFormat::from_string(code);
        self.set_style(style);
    }

    /// Hyperlink target
    fn hyperlink(&self) -> Option<&str>;

    /// Set or clear the hyperlink target
    fn set_hyperlink(&mut self, url: Option<String>);
}

/// Value, style and link shared by both cell kinds
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct CellState {
    pub(crate) value: CellValue,
    pub(crate) style: Style,
    pub(crate) data_type: Option<DataType>,
    pub(crate) hyperlink: Option<String>,
}

impl CellState {
    pub(crate) fn with_style(style: Style) -> Self {
        Self {
            style,
            ..Self::default()
        }
    }

    pub(crate) fn set_inferred(&mut self, value: &Value, kind: DocumentKind) -> Result<()> {
        self.value = data_type::infer(value, kind)?;
        self.data_type = None;
        Ok(())
    }

    pub(crate) fn set_explicit(
        &mut self,
        value: &Value,
        data_type: DataType,
        kind: DocumentKind,
    ) -> Result<()> {
        let native = data_type.native(kind);
        let value = data_type::native_date(value.clone(), kind);
        self.value = data_type::convert(&value, native)?;
        self.data_type = Some(native);
        Ok(())
    }
}

/// Where a sheet's table sits, for post-processing
pub(crate) struct SheetLayout<'a> {
    pub(crate) bindings: &'a [ColumnBinding],
    /// First column (0-based)
    pub(crate) start_col: u16,
    /// Header row (0-based)
    pub(crate) header_row: u32,
    /// Last rendered row (0-based); equals `header_row` without data
    pub(crate) last_row: u32,
}

impl SheetLayout<'_> {
    /// Columns of the bindings, in order
    pub(crate) fn columns(&self) -> impl Iterator<Item = (u16, &ColumnBinding)> + '_ {
        self.bindings
            .iter()
            .enumerate()
            .map(move |(i, b)| (self.start_col + i as u16, b))
    }
}

/// Physical writer behind a sheet
///
/// Coordinates are 0-based.
pub(crate) trait Backend {
    /// Cell type handed to the engine and to cell modifiers
    type Cell: CellHandle;

    /// Which backend this is
    fn kind(&self) -> DocumentKind;

    /// A blank cell carrying `style`
    fn new_cell(&self, row: u32, col: u16, style: Style) -> Self::Cell;

    /// Backend-native form of date values
    fn native_date(&self, value: Value) -> Value {
        data_type::native_date(value, self.kind())
    }

    /// Mark a column with an outline level
    fn set_column_outline(&mut self, col: u16, level: u8) -> Result<()>;

    /// Emit a row of cells
    fn write_row(&mut self, row: u32, cells: Vec<Self::Cell>) -> Result<()>;

    /// Group a row under the previous one
    fn mark_row_outline(&mut self, row: u32, level: u8) -> Result<()>;

    /// Table-level work once all rows are written
    fn finish(&mut self, layout: &SheetLayout<'_>) -> Result<()>;
}
