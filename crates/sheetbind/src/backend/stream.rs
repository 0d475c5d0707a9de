//! Append-only backend over a shared [`StreamWriter`]

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, warn};
use sheetbind_core::{CellValue, Style};
use sheetbind_xlsx::{RowCell, StreamWriter};

use super::{Backend, CellHandle, CellState, SheetLayout};
use crate::binding::ColumnWidth;
use crate::config::DocumentKind;
use crate::data_type::DataType;
use crate::error::Result;
use crate::value::Value;

/// A cell of the streaming backend
///
/// Everything about the cell, style included, must be settled before its
/// row is appended.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamCell {
    row: u32,
    col: u16,
    state: CellState,
}

impl CellHandle for StreamCell {
    fn kind(&self) -> DocumentKind {
        DocumentKind::Streaming
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
        self.state.set_inferred(value, DocumentKind::Streaming)
    }

    fn set_value_explicit(&mut self, value: &Value, data_type: DataType) -> Result<()> {
        self.state.set_explicit(value, data_type, DocumentKind::Streaming)
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

/// Appends one sheet's rows to a shared stream writer
pub(crate) struct StreamBackend {
    writer: Rc<RefCell<StreamWriter>>,
    sheet: usize,
    grouping_warned: bool,
}

impl StreamBackend {
    pub(crate) fn new(writer: Rc<RefCell<StreamWriter>>, sheet: usize) -> Self {
        Self {
            writer,
            sheet,
            grouping_warned: false,
        }
    }
}

impl Backend for StreamBackend {
    type Cell = StreamCell;

    fn kind(&self) -> DocumentKind {
        DocumentKind::Streaming
    }

    fn new_cell(&self, row: u32, col: u16, style: Style) -> StreamCell {
        StreamCell {
            row,
            col,
            state: CellState::with_style(style),
        }
    }

    fn set_column_outline(&mut self, col: u16, level: u8) -> Result<()> {
        Ok(self
            .writer
            .borrow_mut()
            .set_column_outline_level(self.sheet, col, level)?)
    }

    fn write_row(&mut self, row: u32, cells: Vec<StreamCell>) -> Result<()> {
        let mut writer = self.writer.borrow_mut();
        let mut row_cells = Vec::with_capacity(cells.len());
        let mut links = Vec::new();
        for cell in cells {
            let style = writer.style_index(&cell.state.style);
            if let Some(url) = cell.state.hyperlink {
                links.push((cell.col, url));
            }
            row_cells.push(RowCell::new(cell.col, cell.state.value).with_style(style));
        }
        writer.write_row(self.sheet, row, &row_cells)?;
        // only rows the writer accepted may carry links
        for (col, url) in links {
            writer.add_hyperlink(self.sheet, row, col, url)?;
        }
        Ok(())
    }

    fn mark_row_outline(&mut self, row: u32, _level: u8) -> Result<()> {
        if !self.grouping_warned {
            warn!(
                "row grouping is not supported by the streaming backend; ignoring it from row {}",
                row + 1
            );
            self.grouping_warned = true;
        }
        Ok(())
    }

    fn finish(&mut self, layout: &SheetLayout<'_>) -> Result<()> {
        let mut writer = self.writer.borrow_mut();
        for (col, binding) in layout.columns() {
            match binding.column_width() {
                Some(ColumnWidth::Fixed(width)) => writer.set_column_width(self.sheet, col, width)?,
                Some(ColumnWidth::Auto) => {
                    debug!("auto column width is not available when streaming (column {})", col + 1)
                }
                None => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_cell_conversion() {
        let writer = Rc::new(RefCell::new(StreamWriter::new().unwrap()));
        let backend = StreamBackend::new(writer, 0);
        let mut cell = backend.new_cell(0, 0, Style::new());
        cell.set_value(&Value::from("=1+1")).unwrap();
        assert_eq!(cell.value(), &CellValue::string("=1+1"));
        cell.set_value_explicit(&Value::from("x"), DataType::Inline).unwrap();
        assert_eq!(cell.data_type(), Some(DataType::String));
        cell.set_value_explicit(&Value::from("=1+1"), DataType::Formula).unwrap();
        assert_eq!(cell.value(), &CellValue::Formula("1+1".into()));
    }

    #[test]
    fn test_rows_must_not_go_backwards() {
        let writer = Rc::new(RefCell::new(StreamWriter::new().unwrap()));
        writer.borrow_mut().add_sheet("S").unwrap();
        let mut backend = StreamBackend::new(writer, 0);
        let cell = backend.new_cell(3, 0, Style::new());
        backend.write_row(3, vec![cell]).unwrap();
        let cell = backend.new_cell(2, 0, Style::new());
        assert!(backend.write_row(2, vec![cell]).is_err());
        backend.mark_row_outline(4, 1).unwrap();
    }

    #[test]
    fn test_rejected_row_drops_its_links() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("links.xlsx");
        let writer = Rc::new(RefCell::new(StreamWriter::new().unwrap()));
        writer.borrow_mut().add_sheet("S").unwrap();
        let mut backend = StreamBackend::new(writer.clone(), 0);

        let mut kept = backend.new_cell(3, 0, Style::new());
        kept.set_value(&Value::from("kept")).unwrap();
        kept.set_hyperlink(Some("https://example.com/kept".into()));
        backend.write_row(3, vec![kept]).unwrap();

        let mut late = backend.new_cell(1, 1, Style::new());
        late.set_value(&Value::from("late")).unwrap();
        late.set_hyperlink(Some("https://example.com/late".into()));
        assert!(backend.write_row(1, vec![late]).is_err());

        writer.borrow_mut().finish(&path).unwrap();
        let book = sheetbind_xlsx::XlsxReader::read_file(&path).unwrap();
        let ws = book.worksheet(0).unwrap();
        assert_eq!(ws.hyperlink_at(3, 0), Some("https://example.com/kept"));
        assert_eq!(ws.hyperlink_at(1, 1), None);
    }
}
