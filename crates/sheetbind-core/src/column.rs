//! Column types

/// Column metadata
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Column {
    /// Column index (0-based)
    pub index: u16,
    /// Custom width in characters (None = default)
    pub width: Option<f64>,
    /// Column is hidden
    pub hidden: bool,
    /// Outline/grouping level (0-7)
    pub outline_level: u8,
    /// Best fit (auto-sized)
    pub best_fit: bool,
}

impl Column {
    /// Create a new column with default settings
    pub fn new(index: u16) -> Self {
        Self {
            index,
            ..Default::default()
        }
    }

    /// Check if this column has any custom settings
    pub fn has_custom_settings(&self) -> bool {
        self.width.is_some() || self.hidden || self.outline_level > 0 || self.best_fit
    }
}

/// Estimate a column width (in characters) wide enough for `chars` characters
///
/// Capped at 255, the widest column Excel accepts.
pub fn estimate_width(chars: usize) -> f64 {
    (chars as f64 * 1.1 + 1.5).min(255.0)
}
