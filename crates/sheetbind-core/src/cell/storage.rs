//! Sparse cell storage
//!
//! Only non-empty cells are stored, using a row-based BTreeMap structure so
//! iteration is row-major, which is the order the XLSX writer needs.

use std::collections::BTreeMap;

use super::CellValue;

/// Complete data for a single cell
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellData {
    /// The cell's value
    pub value: CellValue,
    /// Index into the worksheet's style pool (0 = default style)
    pub style_index: u32,
}

impl CellData {
    /// Create a new cell with a value and default style
    pub fn new(value: CellValue) -> Self {
        Self {
            value,
            style_index: 0,
        }
    }

    /// Check if this cell is effectively empty (no value and default style)
    pub fn is_empty(&self) -> bool {
        self.value.is_empty() && self.style_index == 0
    }
}

/// Sparse row-based storage for worksheet cells
///
/// Structure: `BTreeMap<row_index, BTreeMap<col_index, CellData>>`
#[derive(Debug, Default)]
pub struct CellStorage {
    rows: BTreeMap<u32, BTreeMap<u16, CellData>>,
}

impl CellStorage {
    /// Create empty storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a cell
    pub fn get(&self, row: u32, col: u16) -> Option<&CellData> {
        self.rows.get(&row).and_then(|r| r.get(&col))
    }

    /// Get a cell, creating an empty one if needed
    pub fn get_or_create(&mut self, row: u32, col: u16) -> &mut CellData {
        self.rows.entry(row).or_default().entry(col).or_default()
    }

    /// Set a cell's value, keeping its style
    pub fn set_value(&mut self, row: u32, col: u16, value: CellValue) {
        self.get_or_create(row, col).value = value;
        self.prune(row, col);
    }

    /// Set a cell's style index, keeping its value
    pub fn set_style(&mut self, row: u32, col: u16, style_index: u32) {
        self.get_or_create(row, col).style_index = style_index;
        self.prune(row, col);
    }

    fn prune(&mut self, row: u32, col: u16) {
        if let Some(cells) = self.rows.get_mut(&row) {
            if cells.get(&col).map_or(false, CellData::is_empty) {
                cells.remove(&col);
            }
            if cells.is_empty() {
                self.rows.remove(&row);
            }
        }
    }

    /// Number of stored cells
    pub fn cell_count(&self) -> usize {
        self.rows.values().map(BTreeMap::len).sum()
    }

    /// Check if no cells are stored
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Highest row and column holding a value (styled-only cells are ignored)
    pub fn data_bounds(&self) -> Option<(u32, u16)> {
        let mut bounds: Option<(u32, u16)> = None;
        for (&row, cells) in &self.rows {
            for (&col, cell) in cells {
                if cell.value.is_empty() {
                    continue;
                }
                bounds = Some(match bounds {
                    Some((r, c)) => (r.max(row), c.max(col)),
                    None => (row, col),
                });
            }
        }
        bounds
    }

    /// Iterate all cells in row-major order as `(row, col, data)`
    pub fn iter(&self) -> impl Iterator<Item = (u32, u16, &CellData)> {
        self.rows.iter().flat_map(|(&row, cells)| {
            cells.iter().map(move |(&col, data)| (row, col, data))
        })
    }

    /// Iterate the cells of one row
    pub fn iter_row(&self, row: u32) -> impl Iterator<Item = (u16, &CellData)> {
        self.rows
            .get(&row)
            .into_iter()
            .flat_map(|cells| cells.iter().map(|(&col, data)| (col, data)))
    }

    /// Indices of rows that hold at least one cell
    pub fn row_indices(&self) -> impl Iterator<Item = u32> + '_ {
        self.rows.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let mut storage = CellStorage::new();
        storage.set_value(2, 1, CellValue::Number(5.0));
        assert_eq!(storage.get(2, 1).map(|c| &c.value), Some(&CellValue::Number(5.0)));
        assert!(storage.get(0, 0).is_none());
        assert_eq!(storage.cell_count(), 1);
    }

    #[test]
    fn test_empty_cells_are_pruned() {
        let mut storage = CellStorage::new();
        storage.set_value(0, 0, CellValue::string("x"));
        storage.set_value(0, 0, CellValue::Empty);
        assert!(storage.is_empty());
    }

    #[test]
    fn test_styled_cell_is_kept_but_not_data() {
        let mut storage = CellStorage::new();
        storage.set_style(5, 5, 3);
        storage.set_value(1, 2, CellValue::Boolean(true));
        assert_eq!(storage.cell_count(), 2);
        assert_eq!(storage.data_bounds(), Some((1, 2)));
    }

    #[test]
    fn test_ordered_iteration() {
        let mut storage = CellStorage::new();
        storage.set_value(1, 0, CellValue::Number(3.0));
        storage.set_value(0, 1, CellValue::Number(2.0));
        storage.set_value(0, 0, CellValue::Number(1.0));
        let cols: Vec<_> = storage.iter_row(0).map(|(c, _)| c).collect();
        assert_eq!(cols, vec![0, 1]);
        assert_eq!(storage.row_indices().collect::<Vec<_>>(), vec![0, 1]);
    }
}
