//! Document and sheet configuration

/// Which backend a document renders into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DocumentKind {
    /// Whole workbook kept in memory; supports restyling, grouping,
    /// autofilter, frozen panes and auto-sized columns
    #[default]
    RandomAccess,
    /// Rows appended to temp files as they are rendered
    Streaming,
}

/// Styling defaults a sheet starts with
#[derive(Debug, Clone, PartialEq)]
pub struct SheetDefaults {
    /// Font family of header and data cells
    pub font_family: String,
    /// Header fill (`RRGGBB`)
    pub header_background_color: String,
    /// Header font color (`RRGGBB`)
    pub header_font_color: String,
    /// Header font size in points
    pub header_font_size: f64,
    /// Data font color, when not set per binding
    pub data_font_color: Option<String>,
    /// Data fill, when not set per binding
    pub data_background_color: Option<String>,
    /// Data font size in points
    pub data_font_size: f64,
}

impl Default for SheetDefaults {
    fn default() -> Self {
        Self {
            font_family: "Arial".to_string(),
            header_background_color: "B8CCE4".to_string(),
            header_font_color: "000000".to_string(),
            header_font_size: 8.0,
            data_font_color: None,
            data_background_color: None,
            data_font_size: 8.0,
        }
    }
}

impl SheetDefaults {
    /// Set the font family
    pub fn with_font_family<S: Into<String>>(mut self, family: S) -> Self {
        self.font_family = family.into();
        self
    }

    /// Set the header fill
    pub fn with_header_background_color<S: Into<String>>(mut self, color: S) -> Self {
        self.header_background_color = color.into();
        self
    }

    /// Set the header font color
    pub fn with_header_font_color<S: Into<String>>(mut self, color: S) -> Self {
        self.header_font_color = color.into();
        self
    }

    /// Set the header font size
    pub fn with_header_font_size(mut self, size: f64) -> Self {
        self.header_font_size = size;
        self
    }

    /// Set the default data font color
    pub fn with_data_font_color<S: Into<String>>(mut self, color: S) -> Self {
        self.data_font_color = Some(color.into());
        self
    }

    /// Set the default data fill
    pub fn with_data_background_color<S: Into<String>>(mut self, color: S) -> Self {
        self.data_background_color = Some(color.into());
        self
    }

    /// Set the data font size
    pub fn with_data_font_size(mut self, size: f64) -> Self {
        self.data_font_size = size;
        self
    }
}
