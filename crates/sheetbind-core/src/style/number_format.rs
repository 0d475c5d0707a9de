//! Number format types

/// Number format for cell display
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum NumberFormat {
    /// General format (default)
    #[default]
    General,

    /// Built-in format by ID
    BuiltIn(u32),

    /// Custom format string
    Custom(String),
}

impl NumberFormat {
    /// First id available to custom formats in styles.xml
    pub const FIRST_CUSTOM_ID: u32 = 164;

    /// Create a number format from a format string
    ///
    /// `"General"` maps to [`NumberFormat::General`].
    pub fn from_string<S: Into<String>>(format: S) -> Self {
        let format = format.into();
        if format.eq_ignore_ascii_case("general") {
            NumberFormat::General
        } else {
            NumberFormat::Custom(format)
        }
    }

    /// The format code as written in a file
    pub fn format_string(&self) -> &str {
        match self {
            NumberFormat::General => "General",
            NumberFormat::BuiltIn(id) => builtin_code(*id).unwrap_or("General"),
            NumberFormat::Custom(code) => code,
        }
    }
}

fn builtin_code(id: u32) -> Option<&'static str> {
    Some(match id {
        0 => "General",
        1 => "0",
        2 => "0.00",
        3 => "#,##0",
        4 => "#,##0.00",
        9 => "0%",
        10 => "0.00%",
        14 => "mm-dd-yy",
        22 => "m/d/yy h:mm",
        49 => "@",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_string() {
        assert_eq!(NumberFormat::General.format_string(), "General");
        assert_eq!(NumberFormat::BuiltIn(3).format_string(), "#,##0");
        assert_eq!(NumberFormat::from_string("m/d/yyyy").format_string(), "m/d/yyyy");
        assert_eq!(NumberFormat::from_string("general"), NumberFormat::General);
    }
}
