//! Color representation

/// Color representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    /// Automatic/default color
    #[default]
    Auto,

    /// RGB color
    Rgb { r: u8, g: u8, b: u8 },
}

impl Color {
    /// Create an RGB color
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color::Rgb { r, g, b }
    }

    /// Create from a hex string ("#FF0000", "FF0000", or ARGB "FFFF0000")
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        let hex = match hex.len() {
            6 => hex,
            8 => &hex[2..],
            _ => return None,
        };
        if !hex.is_ascii() {
            return None;
        }

        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Color::Rgb { r, g, b })
    }

    /// Convert to hex string (without # prefix)
    pub fn to_hex(&self) -> String {
        let (r, g, b) = self.to_rgb();
        format!("{:02X}{:02X}{:02X}", r, g, b)
    }

    /// Convert to ARGB hex string (8 characters, used by XLSX)
    pub fn to_argb_hex(&self) -> String {
        format!("FF{}", self.to_hex())
    }

    /// Convert to RGB tuple
    pub fn to_rgb(&self) -> (u8, u8, u8) {
        match self {
            Color::Auto => (0, 0, 0),
            Color::Rgb { r, g, b } => (*r, *g, *b),
        }
    }

    /// Check if color is automatic/default
    pub fn is_auto(&self) -> bool {
        matches!(self, Color::Auto)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex() {
        assert_eq!(Color::from_hex("B8CCE4"), Some(Color::rgb(0xB8, 0xCC, 0xE4)));
        assert_eq!(Color::from_hex("#000000"), Some(Color::rgb(0, 0, 0)));
        assert_eq!(Color::from_hex("FFFAFAFA"), Some(Color::rgb(0xFA, 0xFA, 0xFA)));
        assert_eq!(Color::from_hex("red"), None);
        assert_eq!(Color::from_hex("GGGGGG"), None);
    }

    #[test]
    fn test_hex_output() {
        let c = Color::rgb(255, 0, 16);
        assert_eq!(c.to_hex(), "FF0010");
        assert_eq!(c.to_argb_hex(), "FFFF0010");
        assert!(Color::Auto.is_auto());
    }
}
