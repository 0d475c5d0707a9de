//! Reading rendered (or hand-made) spreadsheets back into rows
//!
//! An [`Importer`] names the headers it needs; [`Importer::iterate_sheet_rows`]
//! maps them to columns, fails with every missing header at once, and then
//! calls [`Importer::on_row`] for each data row. Rows and columns are 1-based.
//!
//! Blank cells: empty, `"-"` and whitespace-only text read as absent; the
//! boolean getter also reads `0` and `"0"` as false.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDateTime;
use log::debug;
use sheetbind_core::date::serial_to_datetime;
use sheetbind_core::{CellValue, Workbook, Worksheet};
use sheetbind_xlsx::XlsxReader;

use crate::data_type::STREAM_DATE_FORMAT;
use crate::error::{Error, Result};

/// Header name → column (1-based)
pub type HeaderMapping = BTreeMap<String, u32>;

/// Read an .xlsx file for import
pub fn open_workbook<P: AsRef<Path>>(path: P) -> Result<Workbook> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }
    debug!("importing {}", path.display());
    Ok(XlsxReader::read_file(path)?)
}

fn is_blank(value: &CellValue) -> bool {
    match value {
        CellValue::Empty => true,
        CellValue::String(s) => s == "-" || s.trim().is_empty(),
        _ => false,
    }
}

fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Typed, 1-based access to the cells of a worksheet
#[derive(Debug, Clone, Copy)]
pub struct ImportSheet<'a> {
    sheet: &'a Worksheet,
}

impl<'a> ImportSheet<'a> {
    /// Wrap a worksheet
    pub fn new(sheet: &'a Worksheet) -> Self {
        Self { sheet }
    }

    /// The wrapped worksheet
    pub fn worksheet(&self) -> &'a Worksheet {
        self.sheet
    }

    /// Raw value; out-of-range positions are empty
    pub fn value(&self, column: u32, row: u32) -> CellValue {
        match (column.checked_sub(1), row.checked_sub(1)) {
            (Some(col), Some(row)) => match u16::try_from(col) {
                Ok(col) => self.sheet.get_value_at(row, col),
                Err(_) => CellValue::Empty,
            },
            _ => CellValue::Empty,
        }
    }

    /// Text of the cell; numbers print without a trailing `.0`
    pub fn string_value(&self, column: u32, row: u32) -> Option<String> {
        let value = self.value(column, row);
        if is_blank(&value) {
            None
        } else {
            Some(value.to_string())
        }
    }

    /// Date of the cell, from a serial number or `YYYY-MM-DD hh:mm:ss` text
    pub fn date_value(&self, column: u32, row: u32) -> Result<Option<NaiveDateTime>> {
        let value = self.value(column, row);
        if is_blank(&value) {
            return Ok(None);
        }
        let serial = match &value {
            CellValue::Number(n) => Some(*n),
            CellValue::String(s) => {
                if let Ok(date) = NaiveDateTime::parse_from_str(s.trim(), STREAM_DATE_FORMAT) {
                    return Ok(Some(date));
                }
                parse_number(s)
            }
            _ => None,
        };
        serial
            .and_then(serial_to_datetime)
            .map(Some)
            .ok_or_else(|| Error::invalid_cell(format!("'{}' at column {}, row {}", value, column, row), "date"))
    }

    /// Number of the cell; numeric text is parsed
    pub fn numeric_value(&self, column: u32, row: u32) -> Option<f64> {
        match self.value(column, row) {
            CellValue::Number(n) => Some(n),
            CellValue::String(s) => parse_number(&s),
            _ => None,
        }
    }

    /// Boolean reading of the cell
    pub fn bool_value(&self, column: u32, row: u32) -> bool {
        match self.value(column, row) {
            CellValue::Boolean(b) => b,
            CellValue::Number(n) => n != 0.0,
            CellValue::String(s) => !(s == "-" || s == "0" || s.trim().is_empty()),
            CellValue::Empty => false,
            _ => true,
        }
    }
}

/// Row-by-row reader of a sheet with a known header row
///
/// Implement [`headers`](Self::headers) and [`on_row`](Self::on_row); the
/// layout hooks default to headers in row 1 and data from row 2, column 1.
pub trait Importer {
    /// Header row (1-based)
    fn header_row(&self) -> u32 {
        1
    }

    /// Column that decides how far the data goes (1-based)
    fn first_data_column(&self) -> u32 {
        1
    }

    /// First data row (1-based)
    fn first_data_row(&self) -> u32 {
        self.header_row() + 1
    }

    /// Headers that must be present
    fn headers(&self) -> Vec<String>;

    /// Handle one data row
    fn on_row(&mut self, sheet: &ImportSheet<'_>, row: u32, mapping: &HeaderMapping) -> Result<()> {
        let _ = (sheet, row, mapping);
        Err(Error::HookNotImplemented("on_row"))
    }

    /// Column of the header cell whose text is exactly `name`
    fn find_column_by_name(&self, sheet: &ImportSheet<'_>, name: &str) -> Option<u32> {
        let row = self.header_row().checked_sub(1)?;
        sheet
            .worksheet()
            .iter_row(row)
            .find(|(_, cell)| cell.value.as_string() == Some(name))
            .map(|(col, _)| col as u32 + 1)
    }

    /// Columns of the headers that were found
    fn header_mapping(&self, sheet: &ImportSheet<'_>) -> HeaderMapping {
        self.headers()
            .into_iter()
            .filter_map(|h| self.find_column_by_name(sheet, &h).map(|col| (h, col)))
            .collect()
    }

    /// Fail unless every header was found
    fn check_mapping(&self, mapping: &HeaderMapping) -> Result<()> {
        let required = self.headers();
        let missing: Vec<String> = required
            .iter()
            .filter(|h| !mapping.contains_key(*h))
            .cloned()
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::MissingHeaders {
                row: self.header_row(),
                required,
                missing,
            })
        }
    }

    /// Last row with a value in the first data column, 0 if none
    fn highest_data_row(&self, sheet: &ImportSheet<'_>) -> u32 {
        self.first_data_column()
            .checked_sub(1)
            .and_then(|col| u16::try_from(col).ok())
            .and_then(|col| sheet.worksheet().max_row_in_column(col))
            .map_or(0, |row| row + 1)
    }

    /// Check the headers, then call `on_row` for every data row;
    /// returns the number of rows handled
    fn iterate_sheet_rows(&mut self, sheet: &ImportSheet<'_>) -> Result<usize> {
        let mapping = self.header_mapping(sheet);
        self.check_mapping(&mapping)?;

        let first = self.first_data_row();
        let last = self.highest_data_row(sheet);
        let mut count = 0;
        for row in first..=last {
            self.on_row(sheet, row, &mapping)?;
            count += 1;
        }
        debug!("imported {} row(s) from '{}'", count, sheet.worksheet().name());
        Ok(count)
    }
}
