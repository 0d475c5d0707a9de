//! Number format codes and the cell modifiers that apply them
//!
//! The two backends do not share a format dialect, so every canonical code
//! maps to one string per backend.

use std::rc::Rc;

use crate::backend::CellHandle;
use crate::binding::{CellModifier, ColumnBinding};
use crate::config::DocumentKind;
use crate::error::Result;
use crate::value::{ExtraData, Record};

const CURRENCY_RANDOM_ACCESS: &str =
    r#"_("$"* #,##0.00_);_("$"* \(#,##0.00\);_("$"* "-"??_);_(@_)"#;
const CURRENCY_STREAMING: &str = r#"_("$"* #,##0.00_),_("$"* \(#,##0.00\),_("$"* "-"??_),_(@_)"#;

/// Canonical number format
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FormatCode {
    /// `m/d/yyyy`
    Date,
    /// `m/d/yyyy h:mm`
    DateTime,
    /// `m/d/yyyy h:mm:ss`
    DateTimeSeconds,
    /// `#,##0`
    Integer,
    /// `#,##0.00`
    Float,
    /// US dollar accounting format
    Currency,
    /// Caller-supplied codes
    Custom {
        /// Code for the random-access backend
        random_access: String,
        /// Code for the streaming backend
        streaming: String,
    },
}

impl FormatCode {
    /// Custom code used unchanged on both backends
    pub fn custom<S: Into<String>>(code: S) -> Self {
        let code = code.into();
        FormatCode::Custom {
            random_access: code.clone(),
            streaming: code,
        }
    }

    /// The native format string for a backend
    pub fn code_for(&self, kind: DocumentKind) -> &str {
        match (self, kind) {
            (FormatCode::Date, _) => "m/d/yyyy",
            (FormatCode::DateTime, _) => "m/d/yyyy h:mm",
            (FormatCode::DateTimeSeconds, _) => "m/d/yyyy h:mm:ss",
            (FormatCode::Integer, _) => "#,##0",
            (FormatCode::Float, _) => "#,##0.00",
            (FormatCode::Currency, DocumentKind::RandomAccess) => CURRENCY_RANDOM_ACCESS,
            (FormatCode::Currency, DocumentKind::Streaming) => CURRENCY_STREAMING,
            (FormatCode::Custom { random_access, .. }, DocumentKind::RandomAccess) => random_access.as_str(),
            (FormatCode::Custom { streaming, .. }, DocumentKind::Streaming) => streaming.as_str(),
        }
    }
}

/// Modifier setting `code` as the cell's number format, keeping the rest of
/// its style
pub fn format_modifier(code: FormatCode) -> CellModifier {
    Rc::new(
        move |_: &ColumnBinding, cell: &mut dyn CellHandle, _: &dyn Record, _: &ExtraData| -> Result<()> {
            let native = code.code_for(cell.kind()).to_string();
            cell.set_number_format(&native);
            Ok(())
        },
    )
}

/// `m/d/yyyy`
pub fn date_modifier() -> CellModifier {
    format_modifier(FormatCode::Date)
}

/// `m/d/yyyy h:mm`, optionally with seconds
pub fn date_time_modifier(with_seconds: bool) -> CellModifier {
    format_modifier(if with_seconds {
        FormatCode::DateTimeSeconds
    } else {
        FormatCode::DateTime
    })
}

/// `#,##0`
pub fn int_modifier() -> CellModifier {
    format_modifier(FormatCode::Integer)
}

/// `#,##0.00`
pub fn float_modifier() -> CellModifier {
    format_modifier(FormatCode::Float)
}

/// Dollar accounting format
pub fn currency_modifier() -> CellModifier {
    format_modifier(FormatCode::Currency)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_per_backend() {
        assert_eq!(FormatCode::Date.code_for(DocumentKind::Streaming), "m/d/yyyy");
        assert_eq!(
            FormatCode::DateTimeSeconds.code_for(DocumentKind::RandomAccess),
            "m/d/yyyy h:mm:ss"
        );
        let ra = FormatCode::Currency.code_for(DocumentKind::RandomAccess);
        let st = FormatCode::Currency.code_for(DocumentKind::Streaming);
        assert_eq!(ra.replace(';', ","), st);
        assert_ne!(ra, st);

        let custom = FormatCode::Custom {
            random_access: "0.0%".into(),
            streaming: "0%".into(),
        };
        assert_eq!(custom.code_for(DocumentKind::RandomAccess), "0.0%");
        assert_eq!(custom.code_for(DocumentKind::Streaming), "0%");
        assert_eq!(FormatCode::custom("0.000").code_for(DocumentKind::Streaming), "0.000");
    }

    #[test]
    fn test_modifier_sets_backend_code() {
        use crate::backend::stream::StreamBackend;
        use crate::backend::Backend;
        use sheetbind_core::Style;
        use sheetbind_xlsx::StreamWriter;
        use std::cell::RefCell;

        let writer = Rc::new(RefCell::new(StreamWriter::new().unwrap()));
        let backend = StreamBackend::new(writer, 0);
        let mut cell = backend.new_cell(1, 0, Style::new());
        let binding = ColumnBinding::new("Paid", "paid");
        let modifier = currency_modifier();
        modifier(&binding, &mut cell, &crate::value::Value::Null, &ExtraData::new()).unwrap();
        assert_eq!(
            cell.style().number_format.format_string(),
            FormatCode::Currency.code_for(DocumentKind::Streaming)
        );
    }
}
