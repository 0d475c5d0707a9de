//! Random-access backend over an in-memory [`Workbook`]

use std::cell::RefCell;
use std::rc::Rc;

use log::debug;
use sheetbind_core::{CellRange, CellValue, Error as CoreError, Style, Workbook, Worksheet};

use super::{Backend, CellHandle, CellState, SheetLayout};
use crate::binding::ColumnWidth;
use crate::config::DocumentKind;
use crate::data_type::DataType;
use crate::error::Result;
use crate::value::Value;

/// A cell of the random-access backend
#[derive(Debug, Clone, PartialEq)]
pub struct GridCell {
    row: u32,
    col: u16,
    state: CellState,
}

impl CellHandle for GridCell {
    fn kind(&self) -> DocumentKind {
        DocumentKind::RandomAccess
    }

    fn row(&self) -> u32 {
        self.row + 1
    }

    fn column(&self) -> u32 {
        self.col as u32 + 1
    }

    fn value(&self) -> &CellValue {
        &self.state.value
    }

    fn set_value(&mut self, value: &Value) -> Result<()> {
        self.state.set_inferred(value, DocumentKind::RandomAccess)
    }

    fn set_value_explicit(&mut self, value: &Value, data_type: DataType) -> Result<()> {
        self.state.set_explicit(value, data_type, DocumentKind::RandomAccess)
    }

    fn data_type(&self) -> Option<DataType> {
        self.state.data_type
    }

    fn style(&self) -> &Style {
        &self.state.style
    }

    fn set_style(&mut self, style: Style) {
        self.state.style = style;
    }

    fn hyperlink(&self) -> Option<&str> {
        self.state.hyperlink.as_deref()
    }

    fn set_hyperlink(&mut self, url: Option<String>) {
        self.state.hyperlink = url;
    }
}

/// Renders into one worksheet of a shared workbook
pub(crate) struct GridBackend {
    book: Rc<RefCell<Workbook>>,
    index: usize,
}

impl GridBackend {
    pub(crate) fn new(book: Rc<RefCell<Workbook>>, index: usize) -> Self {
        Self { book, index }
    }

    fn with_sheet<T>(&self, f: impl FnOnce(&mut Worksheet) -> Result<T>) -> Result<T> {
        let mut book = self.book.borrow_mut();
        let count = book.sheet_count();
        let sheet = book
            .worksheet_mut(self.index)
            .ok_or(CoreError::SheetOutOfBounds(self.index, count))?;
        f(sheet)
    }
}

impl Backend for GridBackend {
    type Cell = GridCell;

    fn kind(&self) -> DocumentKind {
        DocumentKind::RandomAccess
    }

    fn new_cell(&self, row: u32, col: u16, style: Style) -> GridCell {
        GridCell {
            row,
            col,
            state: CellState::with_style(style),
        }
    }

    fn set_column_outline(&mut self, col: u16, level: u8) -> Result<()> {
        self.with_sheet(|sheet| Ok(sheet.set_column_outline_level(col, level)?))
    }

    fn write_row(&mut self, row: u32, cells: Vec<GridCell>) -> Result<()> {
        self.with_sheet(|sheet| {
            for cell in cells {
                sheet.set_cell_value_at(row, cell.col, cell.state.value)?;
                sheet.set_cell_style_at(row, cell.col, &cell.state.style)?;
                if let Some(url) = cell.state.hyperlink {
                    sheet.set_hyperlink_at(row, cell.col, url)?;
                }
            }
            Ok(())
        })
    }

    fn mark_row_outline(&mut self, row: u32, level: u8) -> Result<()> {
        self.with_sheet(|sheet| Ok(sheet.set_row_outline_level(row, level)?))
    }

    fn finish(&mut self, layout: &SheetLayout<'_>) -> Result<()> {
        self.with_sheet(|sheet| {
            let (max_row, max_col) = sheet
                .data_bounds()
                .unwrap_or((layout.header_row, layout.start_col));
            let filter = CellRange::from_indices(
                layout.header_row,
                layout.start_col,
                max_row.max(layout.header_row),
                max_col.max(layout.start_col),
            );
            debug!("sheet '{}': autofilter {}", sheet.name(), filter);
            sheet.set_auto_filter(filter);
            sheet.set_outline_summary(false, false);
            sheet.set_freeze_pane(layout.header_row + 1, layout.start_col);

            for (col, binding) in layout.columns() {
                if binding.wrap_text() {
                    for row in layout.header_row + 1..=layout.last_row {
                        let mut style = sheet.cell_style_at(row, col).cloned().unwrap_or_default();
                        style.alignment.wrap_text = true;
                        sheet.set_cell_style_at(row, col, &style)?;
                    }
                }
                match binding.column_width() {
                    Some(ColumnWidth::Auto) => sheet.set_column_auto_size(col, true)?,
                    Some(ColumnWidth::Fixed(width)) => sheet.set_column_width(col, width)?,
                    None => {}
                }
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::ColumnBinding;

    fn backend() -> GridBackend {
        let mut book = Workbook::empty();
        book.add_worksheet_with_name("Data").unwrap();
        GridBackend::new(Rc::new(RefCell::new(book)), 0)
    }

    #[test]
    fn test_cells_infer_and_force() {
        let b = backend();
        let mut cell = b.new_cell(1, 2, Style::new());
        assert_eq!((cell.row(), cell.column()), (2, 3));
        cell.set_value(&Value::from("=A1*2")).unwrap();
        assert_eq!(cell.value(), &CellValue::Formula("A1*2".into()));
        cell.set_value_explicit(&Value::from("42"), DataType::Numeric).unwrap();
        assert_eq!(cell.value(), &CellValue::Number(42.0));
        assert_eq!(cell.data_type(), Some(DataType::Numeric));
        cell.set_number_format("0.0");
        assert_eq!(cell.style().number_format.format_string(), "0.0");
    }

    #[test]
    fn test_write_and_finish() {
        let mut b = backend();
        let header = vec![b.new_cell(0, 0, Style::new().bold(true))];
        b.write_row(0, header).unwrap();
        let mut cell = b.new_cell(1, 0, Style::new());
        cell.set_value(&Value::from("text")).unwrap();
        cell.set_hyperlink(Some("https://example.com".into()));
        b.write_row(1, vec![cell]).unwrap();
        b.mark_row_outline(1, 1).unwrap();

        let bindings = vec![ColumnBinding::new("A", "a")
            .with_wrap_text(true)
            .with_column_width(ColumnWidth::Fixed(30.0))];
        b.finish(&SheetLayout {
            bindings: &bindings,
            start_col: 0,
            header_row: 0,
            last_row: 1,
        })
        .unwrap();

        let book = b.book.borrow();
        let sheet = book.worksheet(0).unwrap();
        assert_eq!(sheet.auto_filter().map(|r| r.to_string()), Some("A1:A2".to_string()));
        assert_eq!(sheet.freeze_pane().map(|p| (p.row, p.col)), Some((1, 0)));
        assert!(!sheet.summary_below());
        assert_eq!(sheet.row_outline_level(1), 1);
        assert_eq!(sheet.hyperlink_at(1, 0), Some("https://example.com"));
        assert!(sheet.cell_style_at(1, 0).unwrap().alignment.wrap_text);
        assert!(!sheet.cell_style_at(0, 0).unwrap().alignment.wrap_text);
        assert_eq!(sheet.column_width(0), 30.0);
    }
}
