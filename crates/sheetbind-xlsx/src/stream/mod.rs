//! Streaming XLSX writer
//!
//! Rows are serialized as soon as they are appended, into one temp file per
//! sheet. Nothing but column settings, hyperlinks and the style registry is
//! kept in memory. [`StreamWriter::finish`] assembles the package.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::debug;
use sheetbind_core::worksheet::DEFAULT_COLUMN_WIDTH;
use sheetbind_core::{CellValue, Column, Error as CoreError, Style, StylePool};
use sheetbind_core::{MAX_COLS, MAX_OUTLINE_LEVEL, MAX_ROWS, MAX_SHEET_NAME_LEN};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::error::{XlsxError, XlsxResult};
use crate::package::{write_package_parts, write_sheet_rels, SheetEntry};
use crate::styles::styles_xml;
use crate::xml;

/// One cell of an appended row
#[derive(Debug, Clone, PartialEq)]
pub struct RowCell {
    /// Column index (0-based)
    pub col: u16,
    /// Cell value
    pub value: CellValue,
    /// Index from [`StreamWriter::style_index`] (0 = default)
    pub style: u32,
}

impl RowCell {
    /// Create a cell with the default style
    pub fn new<V: Into<CellValue>>(col: u16, value: V) -> Self {
        Self {
            col,
            value: value.into(),
            style: 0,
        }
    }

    /// Set the style index
    pub fn with_style(mut self, style: u32) -> Self {
        self.style = style;
        self
    }
}

struct StreamSheet {
    name: String,
    path: PathBuf,
    data: BufWriter<File>,
    next_row: u32,
    columns: BTreeMap<u16, Column>,
    hyperlinks: Vec<(u32, u16, String)>,
}

/// Append-only XLSX writer backed by temp files
pub struct StreamWriter {
    temp_dir: Option<TempDir>,
    sheets: Vec<StreamSheet>,
    styles: StylePool,
    active_sheet: usize,
}

impl StreamWriter {
    /// Create a writer with its own temp directory
    pub fn new() -> XlsxResult<Self> {
        let temp_dir = tempfile::Builder::new().prefix("sheetbind-").tempdir()?;
        debug!("stream writer using {}", temp_dir.path().display());
        Ok(Self {
            temp_dir: Some(temp_dir),
            sheets: Vec::new(),
            styles: StylePool::new(),
            active_sheet: 0,
        })
    }

    fn temp_path(&self) -> XlsxResult<&Path> {
        self.temp_dir
            .as_ref()
            .map(TempDir::path)
            .ok_or(XlsxError::StreamClosed)
    }

    /// Whether [`finish`](Self::finish) already ran
    pub fn is_finished(&self) -> bool {
        self.temp_dir.is_none()
    }

    /// Add a sheet and return its index
    pub fn add_sheet(&mut self, name: &str) -> XlsxResult<usize> {
        self.validate_sheet_name(name)?;

        let index = self.sheets.len();
        let path = self.temp_path()?.join(format!("sheet{}.xml.part", index + 1));
        let data = BufWriter::new(File::create(&path)?);
        self.sheets.push(StreamSheet {
            name: name.to_string(),
            path,
            data,
            next_row: 0,
            columns: BTreeMap::new(),
            hyperlinks: Vec::new(),
        });
        Ok(index)
    }

    fn validate_sheet_name(&self, name: &str) -> XlsxResult<()> {
        if name.is_empty() || name.chars().count() > MAX_SHEET_NAME_LEN {
            return Err(CoreError::InvalidSheetName(name.to_string()).into());
        }
        if name
            .chars()
            .any(|c| matches!(c, '*' | ':' | '/' | '\\' | '?' | '[' | ']'))
        {
            return Err(CoreError::InvalidSheetName(name.to_string()).into());
        }
        let lower = name.to_lowercase();
        if self.sheets.iter().any(|s| s.name.to_lowercase() == lower) {
            return Err(CoreError::DuplicateSheetName(name.to_string()).into());
        }
        Ok(())
    }

    /// Number of sheets
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Name of a sheet
    pub fn sheet_name(&self, sheet: usize) -> Option<&str> {
        self.sheets.get(sheet).map(|s| s.name.as_str())
    }

    /// Next row (0-based) that may be appended to a sheet
    pub fn next_row(&self, sheet: usize) -> Option<u32> {
        self.sheets.get(sheet).map(|s| s.next_row)
    }

    /// Index of the sheet shown when the file is opened
    pub fn active_sheet(&self) -> usize {
        self.active_sheet
    }

    /// Select the sheet shown when the file is opened
    pub fn set_active_sheet(&mut self, sheet: usize) -> XlsxResult<()> {
        if sheet >= self.sheets.len() {
            return Err(CoreError::SheetOutOfBounds(sheet, self.sheets.len()).into());
        }
        self.active_sheet = sheet;
        Ok(())
    }

    /// Register a style and return the index to put on [`RowCell::style`]
    pub fn style_index(&mut self, style: &Style) -> u32 {
        self.styles.get_or_insert(style.clone())
    }

    /// Registered style by index
    pub fn style(&self, index: u32) -> Option<&Style> {
        self.styles.get(index)
    }

    fn sheet_mut(&mut self, sheet: usize) -> XlsxResult<&mut StreamSheet> {
        if self.temp_dir.is_none() {
            return Err(XlsxError::StreamClosed);
        }
        self.sheets
            .get_mut(sheet)
            .ok_or(XlsxError::UnknownSheet(sheet))
    }

    /// Append a row. Rows must be strictly increasing per sheet; skipped rows stay empty.
    pub fn write_row(&mut self, sheet: usize, row: u32, cells: &[RowCell]) -> XlsxResult<()> {
        if row >= MAX_ROWS {
            return Err(CoreError::RowOutOfBounds(row, MAX_ROWS - 1).into());
        }
        if let Some(cell) = cells.iter().find(|c| c.col >= MAX_COLS) {
            return Err(CoreError::ColumnOutOfBounds(cell.col as u32, MAX_COLS - 1).into());
        }

        let target = self.sheet_mut(sheet)?;
        if row < target.next_row {
            return Err(XlsxError::RowOrder {
                sheet: target.name.clone(),
                row,
                next: target.next_row,
            });
        }

        let mut sorted: Vec<&RowCell> = cells.iter().collect();
        sorted.sort_by_key(|c| c.col);

        let mut content = String::new();
        xml::push_row_open(&mut content, row, 0);
        for cell in sorted {
            xml::push_cell(&mut content, row, cell.col, &cell.value, cell.style);
        }
        content.push_str("\n        </row>");

        target.data.write_all(content.as_bytes())?;
        target.next_row = row + 1;
        Ok(())
    }

    fn column_mut(&mut self, sheet: usize, col: u16) -> XlsxResult<&mut Column> {
        if col >= MAX_COLS {
            return Err(CoreError::ColumnOutOfBounds(col as u32, MAX_COLS - 1).into());
        }
        Ok(self
            .sheet_mut(sheet)?
            .columns
            .entry(col)
            .or_insert_with(|| Column::new(col)))
    }

    /// Set a column's outline level (written when the file is assembled)
    pub fn set_column_outline_level(&mut self, sheet: usize, col: u16, level: u8) -> XlsxResult<()> {
        if level > MAX_OUTLINE_LEVEL {
            return Err(CoreError::InvalidOutlineLevel(level, MAX_OUTLINE_LEVEL).into());
        }
        self.column_mut(sheet, col)?.outline_level = level;
        Ok(())
    }

    /// Set a fixed column width
    pub fn set_column_width(&mut self, sheet: usize, col: u16, width: f64) -> XlsxResult<()> {
        if !width.is_finite() || width <= 0.0 {
            return Err(CoreError::InvalidColumnWidth(width).into());
        }
        self.column_mut(sheet, col)?.width = Some(width);
        Ok(())
    }

    /// Attach an external hyperlink to a cell
    pub fn add_hyperlink<S: Into<String>>(
        &mut self,
        sheet: usize,
        row: u32,
        col: u16,
        url: S,
    ) -> XlsxResult<()> {
        self.sheet_mut(sheet)?.hyperlinks.push((row, col, url.into()));
        Ok(())
    }

    /// Assemble the package, copy it to `path` and remove the temp files
    ///
    /// The writer is closed afterwards, even on failure.
    pub fn finish<P: AsRef<Path>>(&mut self, path: P) -> XlsxResult<()> {
        let temp_dir = self.temp_dir.take().ok_or(XlsxError::StreamClosed)?;
        let staged = temp_dir.path().join("workbook.xlsx");

        self.assemble(&staged)?;
        fs::copy(&staged, path.as_ref())?;
        debug!(
            "stream writer finished {} sheet(s) into {}",
            self.sheets.len(),
            path.as_ref().display()
        );

        self.sheets.clear();
        temp_dir.close()?;
        Ok(())
    }

    fn assemble(&mut self, staged: &Path) -> XlsxResult<()> {
        if self.sheets.is_empty() {
            return Err(XlsxError::InvalidFormat("workbook has no sheets".into()));
        }
        for sheet in &mut self.sheets {
            sheet.data.flush()?;
        }

        let mut zip = ZipWriter::new(BufWriter::new(File::create(staged)?));

        let entries: Vec<SheetEntry<'_>> = self
            .sheets
            .iter()
            .map(|s| SheetEntry { name: &s.name })
            .collect();
        write_package_parts(&mut zip, &entries, self.active_sheet, None)?;

        zip.start_file("xl/styles.xml", SimpleFileOptions::default())?;
        zip.write_all(styles_xml(self.styles.as_slice()).as_bytes())?;

        for (i, sheet) in self.sheets.iter().enumerate() {
            zip.start_file(
                format!("xl/worksheets/sheet{}.xml", i + 1),
                SimpleFileOptions::default(),
            )?;

            let mut head = String::from(xml::WORKSHEET_OPEN);
            xml::push_sheet_views(&mut head, i == self.active_sheet, None);
            let outline_col = sheet
                .columns
                .values()
                .map(|c| c.outline_level)
                .max()
                .unwrap_or(0);
            xml::push_sheet_format(&mut head, 0, outline_col);
            xml::push_cols(&mut head, sheet.columns.values(), |c| {
                c.width.unwrap_or(DEFAULT_COLUMN_WIDTH)
            });
            head.push_str("\n    <sheetData>");
            zip.write_all(head.as_bytes())?;

            let mut rows = BufReader::new(File::open(&sheet.path)?);
            io::copy(&mut rows, &mut zip)?;

            let mut tail = String::from("\n    </sheetData>");
            xml::push_hyperlinks(
                &mut tail,
                sheet.hyperlinks.iter().map(|(r, c, url)| (*r, *c, url.as_str())),
            );
            tail.push_str("\n</worksheet>");
            zip.write_all(tail.as_bytes())?;

            if !sheet.hyperlinks.is_empty() {
                let rels = xml::hyperlink_rels(sheet.hyperlinks.iter().map(|(_, _, u)| u.as_str()));
                write_sheet_rels(&mut zip, i, &rels)?;
            }
        }

        let mut out = zip.finish()?;
        out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::XlsxReader;

    #[test]
    fn test_rows_must_increase() {
        let mut writer = StreamWriter::new().unwrap();
        let sheet = writer.add_sheet("Data").unwrap();
        writer.write_row(sheet, 2, &[RowCell::new(0, "a")]).unwrap();
        assert_eq!(writer.next_row(sheet), Some(3));

        let err = writer.write_row(sheet, 2, &[RowCell::new(0, "b")]).unwrap_err();
        assert!(matches!(err, XlsxError::RowOrder { row: 2, next: 3, .. }));
    }

    #[test]
    fn test_duplicate_and_invalid_sheet_names() {
        let mut writer = StreamWriter::new().unwrap();
        writer.add_sheet("Data").unwrap();
        assert!(writer.add_sheet("data").is_err());
        assert!(writer.add_sheet("a/b").is_err());
        assert!(matches!(writer.write_row(5, 0, &[]), Err(XlsxError::UnknownSheet(5))));
    }

    #[test]
    fn test_finish_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");

        let mut writer = StreamWriter::new().unwrap();
        let bold = writer.style_index(&Style::new().bold(true));
        let first = writer.add_sheet("First").unwrap();
        let second = writer.add_sheet("Second").unwrap();
        writer
            .write_row(first, 1, &[RowCell::new(1, "Name").with_style(bold), RowCell::new(2, 3.5)])
            .unwrap();
        writer.write_row(second, 0, &[RowCell::new(0, true)]).unwrap();
        writer.set_column_outline_level(first, 1, 1).unwrap();
        writer.add_hyperlink(first, 1, 1, "https://example.com").unwrap();
        writer.set_active_sheet(second).unwrap();
        writer.finish(&path).unwrap();

        assert!(writer.is_finished());
        assert!(matches!(writer.finish(&path), Err(XlsxError::StreamClosed)));
        assert!(matches!(
            writer.write_row(first, 9, &[]),
            Err(XlsxError::StreamClosed)
        ));

        let wb = XlsxReader::read_file(&path).unwrap();
        assert_eq!(wb.sheet_count(), 2);
        assert_eq!(wb.active_sheet(), 1);
        let ws = wb.worksheet(0).unwrap();
        assert_eq!(ws.get_value_at(1, 1), CellValue::string("Name"));
        assert_eq!(ws.get_value_at(1, 2), CellValue::Number(3.5));
        assert!(ws.cell_style_at(1, 1).unwrap().font.bold);
        assert_eq!(ws.column_outline_level(1), 1);
        assert_eq!(ws.hyperlink_at(1, 1), Some("https://example.com"));
        assert_eq!(
            wb.worksheet(1).unwrap().get_value_at(0, 0),
            CellValue::Boolean(true)
        );
    }
}
