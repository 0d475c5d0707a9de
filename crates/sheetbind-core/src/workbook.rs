//! Workbook type - the main document structure

use crate::error::{Error, Result};
use crate::worksheet::Worksheet;
use crate::MAX_SHEET_NAME_LEN;

const INVALID_SHEET_CHARS: &[char] = &['*', ':', '/', '\\', '?', '[', ']'];

/// Make an arbitrary title usable as a sheet name
///
/// Characters Excel rejects are replaced by `_` and the result is cut to
/// [`MAX_SHEET_NAME_LEN`] characters.
///
/// ```
/// use sheetbind_core::sanitize_sheet_name;
///
/// assert_eq!(sanitize_sheet_name("Q1/Q2 [draft]"), "Q1_Q2 _draft_");
/// ```
pub fn sanitize_sheet_name(title: &str) -> String {
    title
        .chars()
        .map(|c| if INVALID_SHEET_CHARS.contains(&c) { '_' } else { c })
        .take(MAX_SHEET_NAME_LEN)
        .collect()
}

/// Descriptive document metadata
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentProperties {
    /// Document title
    pub title: Option<String>,
    /// Author
    pub creator: Option<String>,
    /// Company
    pub company: Option<String>,
}

impl DocumentProperties {
    /// Check if no property is set
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.creator.is_none() && self.company.is_none()
    }
}

/// A workbook (spreadsheet document)
#[derive(Debug)]
pub struct Workbook {
    worksheets: Vec<Worksheet>,
    active_sheet: usize,
    properties: DocumentProperties,
}

impl Workbook {
    /// Create a new workbook with one worksheet named "Sheet1"
    pub fn new() -> Self {
        let mut wb = Self::empty();
        wb.worksheets.push(Worksheet::new("Sheet1"));
        wb
    }

    /// Create an empty workbook with no worksheets
    pub fn empty() -> Self {
        Self {
            worksheets: Vec::new(),
            active_sheet: 0,
            properties: DocumentProperties::default(),
        }
    }

    /// Get the number of worksheets
    pub fn sheet_count(&self) -> usize {
        self.worksheets.len()
    }

    /// Check if the workbook has no worksheets
    pub fn is_empty(&self) -> bool {
        self.worksheets.is_empty()
    }

    /// Get a worksheet by index
    pub fn worksheet(&self, index: usize) -> Option<&Worksheet> {
        self.worksheets.get(index)
    }

    /// Get a mutable worksheet by index
    pub fn worksheet_mut(&mut self, index: usize) -> Option<&mut Worksheet> {
        self.worksheets.get_mut(index)
    }

    /// Get a worksheet by name (case-insensitive)
    pub fn worksheet_by_name(&self, name: &str) -> Option<&Worksheet> {
        self.sheet_index(name).and_then(|i| self.worksheets.get(i))
    }

    /// Index of the sheet with the given name (case-insensitive)
    pub fn sheet_index(&self, name: &str) -> Option<usize> {
        let name = name.to_lowercase();
        self.worksheets
            .iter()
            .position(|ws| ws.name().to_lowercase() == name)
    }

    /// Iterate over worksheets
    pub fn worksheets(&self) -> impl Iterator<Item = &Worksheet> {
        self.worksheets.iter()
    }

    /// Add a new worksheet with a generated name
    pub fn add_worksheet(&mut self) -> Result<usize> {
        let name = self.generate_sheet_name();
        self.add_worksheet_with_name(&name)
    }

    /// Add a new worksheet with specified name
    pub fn add_worksheet_with_name(&mut self, name: &str) -> Result<usize> {
        self.validate_sheet_name(name)?;
        let index = self.worksheets.len();
        self.worksheets.push(Worksheet::new(name));
        Ok(index)
    }

    /// Get the active sheet index
    pub fn active_sheet(&self) -> usize {
        self.active_sheet
    }

    /// Set the active sheet index
    pub fn set_active_sheet(&mut self, index: usize) -> Result<()> {
        if index >= self.worksheets.len() {
            return Err(Error::SheetOutOfBounds(index, self.worksheets.len()));
        }
        self.active_sheet = index;
        Ok(())
    }

    /// Document metadata
    pub fn properties(&self) -> &DocumentProperties {
        &self.properties
    }

    /// Mutable document metadata
    pub fn properties_mut(&mut self) -> &mut DocumentProperties {
        &mut self.properties
    }

    fn validate_sheet_name(&self, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(Error::InvalidSheetName("Sheet name cannot be empty".into()));
        }
        if name.chars().count() > MAX_SHEET_NAME_LEN {
            return Err(Error::InvalidSheetName(format!(
                "Sheet name too long (max {} characters)",
                MAX_SHEET_NAME_LEN
            )));
        }
        if let Some(c) = name.chars().find(|c| INVALID_SHEET_CHARS.contains(c)) {
            return Err(Error::InvalidSheetName(format!(
                "Sheet name cannot contain '{}'",
                c
            )));
        }
        if self.sheet_index(name).is_some() {
            return Err(Error::DuplicateSheetName(name.into()));
        }
        Ok(())
    }

    fn generate_sheet_name(&self) -> String {
        let mut n = self.worksheets.len() + 1;
        loop {
            let name = format!("Sheet{}", n);
            if self.sheet_index(&name).is_none() {
                return name;
            }
            n += 1;
        }
    }
}

impl Default for Workbook {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_workbook() {
        let wb = Workbook::new();
        assert_eq!(wb.sheet_count(), 1);
        assert_eq!(wb.worksheet(0).unwrap().name(), "Sheet1");
        assert!(Workbook::empty().is_empty());
    }

    #[test]
    fn test_add_worksheets() {
        let mut wb = Workbook::new();
        assert_eq!(wb.add_worksheet().unwrap(), 1);
        assert_eq!(wb.worksheet(1).unwrap().name(), "Sheet2");
        assert_eq!(wb.add_worksheet_with_name("Data").unwrap(), 2);
        assert!(wb.worksheet_by_name("data").is_some());
        assert!(wb.worksheet_by_name("Missing").is_none());
    }

    #[test]
    fn test_invalid_sheet_names() {
        let mut wb = Workbook::new();
        assert!(matches!(
            wb.add_worksheet_with_name("SHEET1"),
            Err(Error::DuplicateSheetName(_))
        ));
        assert!(wb.add_worksheet_with_name("").is_err());
        assert!(wb.add_worksheet_with_name("Sheet/1").is_err());
        assert!(wb.add_worksheet_with_name(&"A".repeat(MAX_SHEET_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn test_active_sheet() {
        let mut wb = Workbook::new();
        wb.add_worksheet_with_name("Second").unwrap();
        wb.set_active_sheet(1).unwrap();
        assert_eq!(wb.active_sheet(), 1);
        assert!(matches!(wb.set_active_sheet(2), Err(Error::SheetOutOfBounds(2, 2))));
    }

    #[test]
    fn test_sanitize_sheet_name() {
        assert_eq!(sanitize_sheet_name("Test:::::"), "Test_____");
        assert_eq!(sanitize_sheet_name("a*b/c\\d?e[f]"), "a_b_c_d_e_f_");
        assert_eq!(sanitize_sheet_name("Plain"), "Plain");

        let long = "abcdefghijklmnopqrstuvwxyz0123456789ABCD";
        assert_eq!(sanitize_sheet_name(long), &long[..31]);
    }

    #[test]
    fn test_properties() {
        let mut wb = Workbook::new();
        assert!(wb.properties().is_empty());
        wb.properties_mut().title = Some("Report".into());
        assert_eq!(wb.properties().title.as_deref(), Some("Report"));
    }
}
