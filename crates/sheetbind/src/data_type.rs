//! Cell data types and value-to-cell conversion

use std::fmt;

use chrono::{NaiveDateTime, NaiveTime};
use log::warn;
use sheetbind_core::date::datetime_to_serial;
use sheetbind_core::CellValue;

use crate::config::DocumentKind;
use crate::error::{Error, Result};
use crate::value::Value;

/// Format of dates written by the streaming backend
pub const STREAM_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Explicit cell type, overriding inference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// `str`: formula result string
    String2,
    /// `s`: string
    String,
    /// `f`: formula
    Formula,
    /// `n`: number
    Numeric,
    /// `b`: boolean
    Bool,
    /// `null`: empty cell
    Null,
    /// `inlineStr`: inline rich string
    Inline,
    /// `e`: error literal
    Error,
}

impl DataType {
    /// Canonical type code
    pub fn code(&self) -> &'static str {
        match self {
            DataType::String2 => "str",
            DataType::String => "s",
            DataType::Formula => "f",
            DataType::Numeric => "n",
            DataType::Bool => "b",
            DataType::Null => "null",
            DataType::Inline => "inlineStr",
            DataType::Error => "e",
        }
    }

    /// Look up a type code; unknown codes mean [`DataType::String`]
    pub fn from_code(code: &str) -> Self {
        match code {
            "str" => DataType::String2,
            "f" => DataType::Formula,
            "n" => DataType::Numeric,
            "b" => DataType::Bool,
            "null" => DataType::Null,
            "inlineStr" => DataType::Inline,
            "e" => DataType::Error,
            _ => DataType::String,
        }
    }

    /// The type a backend actually supports for this one
    ///
    /// The streaming backend has a single string type and no distinct
    /// null type.
    pub fn native(self, kind: DocumentKind) -> DataType {
        match (kind, self) {
            (DocumentKind::Streaming, DataType::String2 | DataType::Inline) => DataType::String,
            _ => self,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

fn reject_composite(value: &Value, target: &str) -> Result<()> {
    match value {
        Value::List(_) | Value::Map(_) | Value::Style(_) => {
            Err(Error::invalid_cell(value.type_name(), target))
        }
        _ => Ok(()),
    }
}

// NaN and the infinities have no cell form; they are written as their text
fn finite_number(n: f64) -> CellValue {
    if n.is_finite() {
        CellValue::Number(n)
    } else {
        warn!("non-finite number {} written as text", n);
        CellValue::String(n.to_string())
    }
}

fn date_text(dt: NaiveDateTime) -> String {
    dt.format(STREAM_DATE_FORMAT).to_string()
}

// Serial number, or `None` for dates the 1900 date system cannot hold
fn excel_serial(dt: NaiveDateTime) -> Option<f64> {
    match datetime_to_serial(dt) {
        Ok(serial) => Some(serial),
        Err(err) => {
            warn!("{}; writing the date as text", err);
            None
        }
    }
}

fn date_number(dt: NaiveDateTime) -> CellValue {
    excel_serial(dt)
        .map(CellValue::Number)
        .unwrap_or_else(|| CellValue::String(date_text(dt)))
}

/// Backend-native form of dates: serial numbers for the random-access
/// backend, formatted text for the streaming one
///
/// Dates before 1900 have no serial number and become text on both.
pub(crate) fn native_date(value: Value, kind: DocumentKind) -> Value {
    let dt = match value {
        Value::Date(d) => d.and_time(NaiveTime::MIN),
        Value::DateTime(dt) => dt,
        other => return other,
    };
    match kind {
        DocumentKind::RandomAccess => excel_serial(dt)
            .map(Value::Float)
            .unwrap_or_else(|| Value::String(date_text(dt))),
        DocumentKind::Streaming => Value::String(date_text(dt)),
    }
}

/// Default conversion, inferring the cell type from the value
pub(crate) fn infer(value: &Value, kind: DocumentKind) -> Result<CellValue> {
    reject_composite(value, "cell")?;
    Ok(match value {
        Value::Null => CellValue::Empty,
        Value::Bool(b) => CellValue::Boolean(*b),
        Value::Int(n) => CellValue::Number(*n as f64),
        Value::Float(n) => finite_number(*n),
        Value::String(s) if s.is_empty() => CellValue::Empty,
        Value::String(s) if kind == DocumentKind::RandomAccess && s.len() > 1 && s.starts_with('=') => {
            CellValue::formula(s)
        }
        Value::String(s) => CellValue::String(s.clone()),
        Value::Date(_) | Value::DateTime(_) => return infer(&native_date(value.clone(), kind), kind),
        Value::List(_) | Value::Map(_) | Value::Style(_) => CellValue::Empty,
    })
}

/// Conversion to an explicit cell type
pub(crate) fn convert(value: &Value, data_type: DataType) -> Result<CellValue> {
    reject_composite(value, data_type.code())?;
    if value.is_null() {
        return Ok(CellValue::Empty);
    }

    Ok(match data_type {
        DataType::String | DataType::String2 | DataType::Inline => {
            CellValue::String(value.to_display_string())
        }
        DataType::Numeric => match value {
            Value::Bool(b) => CellValue::Number(if *b { 1.0 } else { 0.0 }),
            Value::Int(n) => CellValue::Number(*n as f64),
            Value::Float(n) => finite_number(*n),
            Value::Date(d) => date_number(d.and_time(NaiveTime::MIN)),
            Value::DateTime(dt) => date_number(*dt),
            Value::String(s) if s.trim().is_empty() => CellValue::Empty,
            Value::String(s) => match s.trim().parse::<f64>() {
                Ok(n) => finite_number(n),
                Err(_) => return Err(Error::invalid_cell(format!("'{}'", s), "number")),
            },
            _ => CellValue::Empty,
        },
        DataType::Bool => CellValue::Boolean(value.is_truthy()),
        DataType::Null => CellValue::Empty,
        DataType::Formula => {
            let text = value.to_display_string();
            if text.is_empty() || text == "=" {
                CellValue::Empty
            } else {
                CellValue::formula(text)
            }
        }
        DataType::Error => CellValue::Error(value.to_display_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_codes() {
        for ty in [
            DataType::String2,
            DataType::String,
            DataType::Formula,
            DataType::Numeric,
            DataType::Bool,
            DataType::Null,
            DataType::Inline,
            DataType::Error,
        ] {
            assert_eq!(DataType::from_code(ty.code()), ty);
        }
        assert_eq!(DataType::from_code("whatever"), DataType::String);
    }

    #[test]
    fn test_native_streaming_types() {
        assert_eq!(DataType::Inline.native(DocumentKind::Streaming), DataType::String);
        assert_eq!(DataType::String2.native(DocumentKind::Streaming), DataType::String);
        assert_eq!(DataType::Inline.native(DocumentKind::RandomAccess), DataType::Inline);
        assert_eq!(DataType::Numeric.native(DocumentKind::Streaming), DataType::Numeric);
    }

    #[test]
    fn test_forced_numeric() {
        assert_eq!(convert(&Value::from("42"), DataType::Numeric).unwrap(), CellValue::Number(42.0));
        assert_eq!(convert(&Value::from(" 1.5 "), DataType::Numeric).unwrap(), CellValue::Number(1.5));
        assert_eq!(convert(&Value::Bool(true), DataType::Numeric).unwrap(), CellValue::Number(1.0));
        assert_eq!(convert(&Value::from(""), DataType::Numeric).unwrap(), CellValue::Empty);
        assert!(matches!(
            convert(&Value::from("abc"), DataType::Numeric),
            Err(Error::InvalidCellValue { .. })
        ));
    }

    #[test]
    fn test_forced_other_types() {
        assert_eq!(convert(&Value::Int(7), DataType::String).unwrap(), CellValue::string("7"));
        assert_eq!(convert(&Value::from("0"), DataType::Bool).unwrap(), CellValue::Boolean(false));
        assert_eq!(
            convert(&Value::from("=A1+1"), DataType::Formula).unwrap(),
            CellValue::Formula("A1+1".into())
        );
        assert_eq!(
            convert(&Value::from("#N/A"), DataType::Error).unwrap(),
            CellValue::Error("#N/A".into())
        );
        assert_eq!(convert(&Value::from("x"), DataType::Null).unwrap(), CellValue::Empty);
        assert!(convert(&Value::from(vec![1]), DataType::String).is_err());
    }

    #[test]
    fn test_inference() {
        let ra = DocumentKind::RandomAccess;
        let st = DocumentKind::Streaming;
        assert_eq!(infer(&Value::from("=SUM(A1:A2)"), ra).unwrap(), CellValue::Formula("SUM(A1:A2)".into()));
        assert_eq!(infer(&Value::from("=SUM(A1:A2)"), st).unwrap(), CellValue::string("=SUM(A1:A2)"));
        assert_eq!(infer(&Value::from("="), ra).unwrap(), CellValue::string("="));
        assert_eq!(infer(&Value::Int(3), ra).unwrap(), CellValue::Number(3.0));
        assert_eq!(infer(&Value::from(""), ra).unwrap(), CellValue::Empty);
        assert!(infer(&Value::Map(Default::default()), ra).is_err());
        assert_eq!(infer(&Value::Float(f64::NAN), ra).unwrap(), CellValue::string("NaN"));
        assert_eq!(infer(&Value::Float(f64::NEG_INFINITY), st).unwrap(), CellValue::string("-inf"));
        assert_eq!(convert(&Value::from("inf"), DataType::Numeric).unwrap(), CellValue::string("inf"));
    }

    #[test]
    fn test_native_dates() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(
            native_date(Value::Date(date), DocumentKind::RandomAccess),
            Value::Float(45306.0)
        );
        assert_eq!(
            native_date(Value::Date(date), DocumentKind::Streaming),
            Value::from("2024-01-15 00:00:00")
        );
        assert_eq!(
            native_date(Value::Int(1), DocumentKind::Streaming),
            Value::Int(1)
        );
    }

    #[test]
    fn test_dates_before_1900_become_text() {
        let early = NaiveDate::from_ymd_opt(1899, 6, 1).unwrap();
        assert_eq!(
            native_date(Value::Date(early), DocumentKind::RandomAccess),
            Value::from("1899-06-01 00:00:00")
        );
        assert_eq!(
            convert(&Value::Date(early), DataType::Numeric).unwrap(),
            CellValue::string("1899-06-01 00:00:00")
        );
    }
}
