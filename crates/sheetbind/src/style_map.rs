//! Style maps: nested key/value descriptions of a cell style
//!
//! ```text
//! font:         name, size, bold, italic, underline, color
//! fill:         color (or startColor), fillType ("none" clears the fill)
//! alignment:    horizontal, vertical, wrap (or wrapText)
//! numberFormat: formatCode
//! ```
//!
//! Colors are `"RRGGBB"` strings or `{rgb: "RRGGBB"}` maps.

use std::collections::BTreeMap;

use log::warn;
use sheetbind_core::{
    Color, FillStyle, HorizontalAlignment, NumberFormat, Style, VerticalAlignment,
};

use crate::error::{Error, Result};
use crate::value::Value;

/// Parse `RRGGBB` (optionally `#`-prefixed or ARGB)
pub(crate) fn parse_color(text: &str) -> Result<Color> {
    Color::from_hex(text).ok_or_else(|| Error::config(format!("invalid color '{}'", text)))
}

pub(crate) fn color_value(value: &Value) -> Result<Color> {
    match value {
        Value::String(s) => parse_color(s),
        Value::Map(map) => match map.get("rgb").or_else(|| map.get("argb")) {
            Some(Value::String(s)) => parse_color(s),
            _ => Err(Error::config("color map needs an 'rgb' entry")),
        },
        other => Err(Error::config(format!("invalid color value of type {}", other.type_name()))),
    }
}

fn number(value: &Value, key: &str) -> Result<f64> {
    let parsed = match value {
        Value::String(s) => s.trim().parse().ok(),
        other => other.as_f64(),
    };
    parsed.ok_or_else(|| Error::config(format!("'{}' must be a number", key)))
}

fn text<'a>(value: &'a Value, key: &str) -> Result<&'a str> {
    value
        .as_str()
        .ok_or_else(|| Error::config(format!("'{}' must be a string", key)))
}

fn section<'a>(value: &'a Value, key: &str) -> Result<&'a BTreeMap<String, Value>> {
    match value {
        Value::Map(map) => Ok(map),
        _ => Err(Error::config(format!("'{}' must be a map", key))),
    }
}

/// Merge a style map onto `base`
pub(crate) fn apply_style_map(mut style: Style, map: &BTreeMap<String, Value>) -> Result<Style> {
    for (key, value) in map {
        match key.as_str() {
            "font" => {
                for (k, v) in section(value, key)? {
                    match k.as_str() {
                        "name" => style.font.name = text(v, k)?.to_string(),
                        "size" => style.font.size = number(v, k)?,
                        "bold" => style.font.bold = v.is_truthy(),
                        "italic" => style.font.italic = v.is_truthy(),
                        "underline" => style.font.underline = v.is_truthy(),
                        "color" => style.font.color = color_value(v)?,
                        _ => warn!("ignoring unknown style key font.{}", k),
                    }
                }
            }
            "fill" => {
                for (k, v) in section(value, key)? {
                    match k.as_str() {
                        "color" | "startColor" => style.fill = FillStyle::solid(color_value(v)?),
                        "fillType" => {
                            if text(v, k)? == "none" {
                                style.fill = FillStyle::None;
                            }
                        }
                        _ => warn!("ignoring unknown style key fill.{}", k),
                    }
                }
            }
            "alignment" => {
                for (k, v) in section(value, key)? {
                    match k.as_str() {
                        "horizontal" => {
                            style.alignment.horizontal = HorizontalAlignment::parse(text(v, k)?)
                                .ok_or_else(|| Error::config(format!("invalid horizontal alignment {}", v)))?;
                        }
                        "vertical" => {
                            style.alignment.vertical = VerticalAlignment::parse(text(v, k)?)
                                .ok_or_else(|| Error::config(format!("invalid vertical alignment {}", v)))?;
                        }
                        "wrap" | "wrapText" => style.alignment.wrap_text = v.is_truthy(),
                        _ => warn!("ignoring unknown style key alignment.{}", k),
                    }
                }
            }
            "numberFormat" => {
                for (k, v) in section(value, key)? {
                    match k.as_str() {
                        "formatCode" => style.number_format = NumberFormat::from_string(text(v, k)?),
                        _ => warn!("ignoring unknown style key numberFormat.{}", k),
                    }
                }
            }
            _ => warn!("ignoring unknown style key {}", key),
        }
    }
    Ok(style)
}
