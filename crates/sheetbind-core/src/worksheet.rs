//! Worksheet type

use std::collections::BTreeMap;

use crate::cell::{CellData, CellRange, CellStorage, CellValue};
use crate::column::{estimate_width, Column};
use crate::error::{Error, Result};
use crate::row::Row;
use crate::style::{Style, StylePool};
use crate::{MAX_COLS, MAX_OUTLINE_LEVEL, MAX_ROWS};

/// Default column width (in characters) for columns without a custom width
pub const DEFAULT_COLUMN_WIDTH: f64 = 8.43;

/// A worksheet (single sheet in a workbook)
#[derive(Debug)]
pub struct Worksheet {
    name: String,
    cells: CellStorage,
    styles: StylePool,
    rows: BTreeMap<u32, Row>,
    columns: BTreeMap<u16, Column>,
    hyperlinks: BTreeMap<(u32, u16), String>,
    auto_filter: Option<CellRange>,
    freeze_pane: Option<FreezePane>,
    summary_below: bool,
    summary_right: bool,
}

impl Worksheet {
    /// Create a new worksheet with the given name
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            cells: CellStorage::new(),
            styles: StylePool::new(),
            rows: BTreeMap::new(),
            columns: BTreeMap::new(),
            hyperlinks: BTreeMap::new(),
            auto_filter: None,
            freeze_pane: None,
            summary_below: true,
            summary_right: true,
        }
    }

    /// Get the sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the sheet name
    pub fn set_name<S: Into<String>>(&mut self, name: S) {
        self.name = name.into();
    }

    // === Cell Access ===

    /// Get a cell value, `Empty` when unset
    pub fn get_value_at(&self, row: u32, col: u16) -> CellValue {
        self.cells
            .get(row, col)
            .map(|c| c.value.clone())
            .unwrap_or_default()
    }

    /// Style index of a cell (0 = default)
    pub fn cell_style_index_at(&self, row: u32, col: u16) -> u32 {
        self.cells.get(row, col).map_or(0, |c| c.style_index)
    }

    /// Resolved style of a cell
    pub fn cell_style_at(&self, row: u32, col: u16) -> Option<&Style> {
        self.styles.get(self.cell_style_index_at(row, col))
    }

    /// The sheet's style pool
    pub fn style_pool(&self) -> &StylePool {
        &self.styles
    }

    // === Cell Modification ===

    /// Set a cell value by row and column indices
    pub fn set_cell_value_at<V: Into<CellValue>>(
        &mut self,
        row: u32,
        col: u16,
        value: V,
    ) -> Result<()> {
        self.validate_cell_position(row, col)?;
        self.cells.set_value(row, col, value.into());
        Ok(())
    }

    /// Set a cell style by row and column indices
    pub fn set_cell_style_at(&mut self, row: u32, col: u16, style: &Style) -> Result<()> {
        self.validate_cell_position(row, col)?;
        let style_index = self.styles.get_or_insert(style.clone());
        self.cells.set_style(row, col, style_index);
        Ok(())
    }

    /// Attach a hyperlink to a cell
    pub fn set_hyperlink_at<S: Into<String>>(&mut self, row: u32, col: u16, url: S) -> Result<()> {
        self.validate_cell_position(row, col)?;
        self.hyperlinks.insert((row, col), url.into());
        Ok(())
    }

    /// Hyperlink of a cell
    pub fn hyperlink_at(&self, row: u32, col: u16) -> Option<&str> {
        self.hyperlinks.get(&(row, col)).map(String::as_str)
    }

    /// All hyperlinks in row-major order
    pub fn hyperlinks(&self) -> impl Iterator<Item = (u32, u16, &str)> {
        self.hyperlinks
            .iter()
            .map(|(&(row, col), url)| (row, col, url.as_str()))
    }

    // === Rows and Columns ===

    /// Row metadata, if the row has any
    pub fn row(&self, row: u32) -> Option<&Row> {
        self.rows.get(&row)
    }

    /// Rows with custom settings
    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.values()
    }

    /// Outline level of a row
    pub fn row_outline_level(&self, row: u32) -> u8 {
        self.rows.get(&row).map_or(0, |r| r.outline_level)
    }

    /// Set the outline (grouping) level of a row
    pub fn set_row_outline_level(&mut self, row: u32, level: u8) -> Result<()> {
        if row >= MAX_ROWS {
            return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
        }
        check_outline_level(level)?;
        self.rows
            .entry(row)
            .or_insert_with(|| Row::new(row))
            .outline_level = level;
        Ok(())
    }

    /// Column metadata, if the column has any
    pub fn column(&self, col: u16) -> Option<&Column> {
        self.columns.get(&col)
    }

    /// Columns with custom settings
    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.values()
    }

    fn column_mut(&mut self, col: u16) -> Result<&mut Column> {
        if col >= MAX_COLS {
            return Err(Error::ColumnOutOfBounds(col as u32, MAX_COLS - 1));
        }
        Ok(self
            .columns
            .entry(col)
            .or_insert_with(|| Column::new(col)))
    }

    /// Outline level of a column
    pub fn column_outline_level(&self, col: u16) -> u8 {
        self.columns.get(&col).map_or(0, |c| c.outline_level)
    }

    /// Set the outline (grouping) level of a column
    pub fn set_column_outline_level(&mut self, col: u16, level: u8) -> Result<()> {
        check_outline_level(level)?;
        self.column_mut(col)?.outline_level = level;
        Ok(())
    }

    /// Get column width
    pub fn column_width(&self, col: u16) -> f64 {
        self.columns
            .get(&col)
            .and_then(|c| c.width)
            .unwrap_or(DEFAULT_COLUMN_WIDTH)
    }

    /// Set a fixed column width; turns off auto-sizing
    pub fn set_column_width(&mut self, col: u16, width: f64) -> Result<()> {
        if !width.is_finite() || width <= 0.0 {
            return Err(Error::InvalidColumnWidth(width));
        }
        let column = self.column_mut(col)?;
        column.width = Some(width);
        column.best_fit = false;
        Ok(())
    }

    /// Mark a column as auto-sized
    pub fn set_column_auto_size(&mut self, col: u16, auto: bool) -> Result<()> {
        let column = self.column_mut(col)?;
        column.best_fit = auto;
        if auto {
            column.width = None;
        }
        Ok(())
    }

    /// Width a writer should emit for a column
    ///
    /// Auto-sized columns get an estimate from the longest displayed value.
    pub fn effective_column_width(&self, col: u16) -> Option<f64> {
        let column = self.columns.get(&col)?;
        if let Some(width) = column.width {
            return Some(width);
        }
        if !column.best_fit {
            return None;
        }
        let longest = self
            .cells
            .iter()
            .filter(|(_, c, _)| *c == col)
            .map(|(_, _, data)| data.value.to_string().chars().count())
            .max()
            .unwrap_or(0);
        Some(estimate_width(longest).max(DEFAULT_COLUMN_WIDTH))
    }

    // === Sheet-level settings ===

    /// Auto-filter range
    pub fn auto_filter(&self) -> Option<&CellRange> {
        self.auto_filter.as_ref()
    }

    /// Set the auto-filter range
    pub fn set_auto_filter(&mut self, range: CellRange) {
        self.auto_filter = Some(range);
    }

    /// Get freeze pane settings
    pub fn freeze_pane(&self) -> Option<&FreezePane> {
        self.freeze_pane.as_ref()
    }

    /// Freeze everything above `row` and left of `col` (both 0-based)
    pub fn set_freeze_pane(&mut self, row: u32, col: u16) {
        if row == 0 && col == 0 {
            self.freeze_pane = None;
        } else {
            self.freeze_pane = Some(FreezePane { row, col });
        }
    }

    /// Whether outline summary rows sit below their detail rows
    pub fn summary_below(&self) -> bool {
        self.summary_below
    }

    /// Whether outline summary columns sit right of their detail columns
    pub fn summary_right(&self) -> bool {
        self.summary_right
    }

    /// Set outline summary placement
    pub fn set_outline_summary(&mut self, below: bool, right: bool) {
        self.summary_below = below;
        self.summary_right = right;
    }

    // === Inspection ===

    /// Highest row index holding a value in `col`
    pub fn max_row_in_column(&self, col: u16) -> Option<u32> {
        self.cells
            .iter()
            .filter(|(_, c, data)| *c == col && !data.value.is_empty())
            .map(|(r, _, _)| r)
            .max()
    }

    /// Highest row and column holding a value
    pub fn data_bounds(&self) -> Option<(u32, u16)> {
        self.cells.data_bounds()
    }

    /// Number of stored cells
    pub fn cell_count(&self) -> usize {
        self.cells.cell_count()
    }

    /// Check if the sheet holds no cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterate the cells of one row
    pub fn iter_row(&self, row: u32) -> impl Iterator<Item = (u16, &CellData)> {
        self.cells.iter_row(row)
    }

    /// Indices of rows holding cells or row metadata, ascending
    pub fn used_row_indices(&self) -> Vec<u32> {
        let mut indices: Vec<u32> = self
            .cells
            .row_indices()
            .chain(self.rows.keys().copied())
            .collect();
        indices.sort_unstable();
        indices.dedup();
        indices
    }

    fn validate_cell_position(&self, row: u32, col: u16) -> Result<()> {
        if row >= MAX_ROWS {
            return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
        }
        if col >= MAX_COLS {
            return Err(Error::ColumnOutOfBounds(col as u32, MAX_COLS - 1));
        }
        Ok(())
    }
}

fn check_outline_level(level: u8) -> Result<()> {
    if level > MAX_OUTLINE_LEVEL {
        return Err(Error::InvalidOutlineLevel(level, MAX_OUTLINE_LEVEL));
    }
    Ok(())
}

/// Freeze pane settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreezePane {
    /// First unfrozen row
    pub row: u32,
    /// First unfrozen column
    pub col: u16,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Color;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_values_and_styles() {
        let mut ws = Worksheet::new("Data");
        ws.set_cell_value_at(0, 0, "Name").unwrap();
        ws.set_cell_value_at(1, 0, 42.0).unwrap();

        let bold = Style::new().bold(true);
        ws.set_cell_style_at(0, 0, &bold).unwrap();
        ws.set_cell_style_at(0, 1, &bold).unwrap();

        assert_eq!(ws.get_value_at(0, 0), CellValue::string("Name"));
        assert_eq!(ws.get_value_at(5, 5), CellValue::Empty);
        assert_eq!(ws.cell_style_index_at(0, 0), ws.cell_style_index_at(0, 1));
        assert_eq!(ws.cell_style_at(0, 0), Some(&bold));
        assert_eq!(ws.style_pool().len(), 2);
    }

    #[test]
    fn test_bounds_checks() {
        let mut ws = Worksheet::new("Data");
        assert!(ws.set_cell_value_at(MAX_ROWS, 0, 1.0).is_err());
        assert!(ws.set_cell_value_at(0, MAX_COLS, 1.0).is_err());
        assert!(ws.set_row_outline_level(1, 8).is_err());
        assert!(ws.set_column_width(0, 0.0).is_err());
        assert!(ws.set_column_width(0, f64::NAN).is_err());
    }

    #[test]
    fn test_outline_levels() {
        let mut ws = Worksheet::new("Data");
        ws.set_row_outline_level(3, 1).unwrap();
        ws.set_column_outline_level(2, 1).unwrap();
        assert_eq!(ws.row_outline_level(3), 1);
        assert_eq!(ws.row_outline_level(4), 0);
        assert_eq!(ws.column_outline_level(2), 1);
        assert_eq!(ws.used_row_indices(), vec![3]);
    }

    #[test]
    fn test_column_widths() {
        let mut ws = Worksheet::new("Data");
        ws.set_cell_value_at(0, 1, "A rather long heading").unwrap();
        ws.set_column_width(0, 20.0).unwrap();
        ws.set_column_auto_size(1, true).unwrap();

        assert_eq!(ws.column_width(0), 20.0);
        assert_eq!(ws.effective_column_width(0), Some(20.0));
        assert_eq!(ws.effective_column_width(1), Some(estimate_width(21)));
        assert_eq!(ws.effective_column_width(2), None);
        assert_eq!(ws.column_width(2), DEFAULT_COLUMN_WIDTH);
    }

    #[test]
    fn test_max_row_in_column() {
        let mut ws = Worksheet::new("Data");
        ws.set_cell_value_at(0, 0, "h").unwrap();
        ws.set_cell_value_at(4, 0, "x").unwrap();
        ws.set_cell_value_at(9, 1, "y").unwrap();
        ws.set_cell_style_at(12, 0, &Style::new().fill_color(Color::rgb(1, 2, 3)))
            .unwrap();
        assert_eq!(ws.max_row_in_column(0), Some(4));
        assert_eq!(ws.max_row_in_column(3), None);
        assert_eq!(ws.data_bounds(), Some((9, 1)));
    }

    #[test]
    fn test_sheet_settings() {
        let mut ws = Worksheet::new("Data");
        assert!(ws.summary_below() && ws.summary_right());
        ws.set_outline_summary(false, false);
        assert!(!ws.summary_below() && !ws.summary_right());

        ws.set_freeze_pane(1, 0);
        assert_eq!(ws.freeze_pane(), Some(&FreezePane { row: 1, col: 0 }));
        ws.set_freeze_pane(0, 0);
        assert_eq!(ws.freeze_pane(), None);

        ws.set_auto_filter(CellRange::from_indices(0, 0, 3, 2));
        assert_eq!(ws.auto_filter().map(|r| r.to_string()), Some("A1:C4".into()));

        ws.set_hyperlink_at(1, 0, "https://example.com").unwrap();
        assert_eq!(ws.hyperlink_at(1, 0), Some("https://example.com"));
        assert_eq!(ws.hyperlinks().count(), 1);
    }
}
