//! Property path parsing and lookup
//!
//! Grammar: a path is a sequence of segments. `name` or `.name` reads a
//! property, `[key]` reads an element (list index or map key). The first
//! segment may omit the dot: `name`, `[0]`, `a.b`, `a[1].c`, `[x][y]`.

use crate::error::{Error, Result};
use crate::value::{Record, Value};

/// One step of a property path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// `name` or `.name`
    Property(String),
    /// `[key]`
    Element(String),
}

/// Parse a property path into its segments
pub fn parse_path(path: &str) -> Result<Vec<Segment>> {
    if path.is_empty() {
        return Err(Error::invalid_path(path, "empty path"));
    }

    let mut segments = Vec::new();
    let mut rest = path;
    let mut first = true;

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix('[') {
            let end = after
                .find(']')
                .ok_or_else(|| Error::invalid_path(path, "unclosed '['"))?;
            let key = &after[..end];
            if key.is_empty() {
                return Err(Error::invalid_path(path, "empty '[]'"));
            }
            segments.push(Segment::Element(key.to_string()));
            rest = &after[end + 1..];
        } else {
            let body = match rest.strip_prefix('.') {
                Some(body) => body,
                None if first => rest,
                None => return Err(Error::invalid_path(path, "expected '.' or '['")),
            };
            let end = body.find(['.', '[', ']']).unwrap_or(body.len());
            if end == 0 {
                return Err(Error::invalid_path(path, "empty segment"));
            }
            if body[end..].starts_with(']') {
                return Err(Error::invalid_path(path, "stray ']'"));
            }
            segments.push(Segment::Property(body[..end].to_string()));
            rest = &body[end..];
        }
        first = false;
    }

    Ok(segments)
}

fn step(record: &dyn Record, segment: &Segment) -> Option<Value> {
    match segment {
        Segment::Property(name) => record.property(name),
        Segment::Element(key) => record.element(key),
    }
}

/// Walk `segments` from `root`
///
/// `None` is a miss: a segment that does not exist, or a `Null` reached
/// before the last segment.
pub fn lookup(root: &dyn Record, segments: &[Segment]) -> Option<Value> {
    let (first, rest) = segments.split_first()?;
    let mut current = step(root, first)?;
    for segment in rest {
        if current.is_null() {
            return None;
        }
        current = step(&current, segment)?;
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn prop(s: &str) -> Segment {
        Segment::Property(s.into())
    }

    fn elem(s: &str) -> Segment {
        Segment::Element(s.into())
    }

    #[test]
    fn test_parse_forms() {
        assert_eq!(parse_path("name").unwrap(), vec![prop("name")]);
        assert_eq!(parse_path(".name").unwrap(), vec![prop("name")]);
        assert_eq!(parse_path("[0]").unwrap(), vec![elem("0")]);
        assert_eq!(parse_path("a.b").unwrap(), vec![prop("a"), prop("b")]);
        assert_eq!(
            parse_path("a[1].c").unwrap(),
            vec![prop("a"), elem("1"), prop("c")]
        );
        assert_eq!(parse_path("[x][y]").unwrap(), vec![elem("x"), elem("y")]);
    }

    #[test]
    fn test_parse_errors() {
        for bad in ["", "a..b", ".", "a.", "a[", "a[]", "a]", "a]b", "[0]x"] {
            assert!(
                matches!(parse_path(bad), Err(Error::InvalidPath { .. })),
                "{:?} should not parse",
                bad
            );
        }
    }

    #[test]
    fn test_lookup_nested() {
        let mut inner = BTreeMap::new();
        inner.insert("c".to_string(), Value::Int(3));
        let item = Value::from(vec![Value::Null, Value::Map(inner)]);

        let found = lookup(&item, &parse_path("[1].c").unwrap());
        assert_eq!(found, Some(Value::Int(3)));
        assert_eq!(lookup(&item, &parse_path("[1].d").unwrap()), None);
        assert_eq!(lookup(&item, &parse_path("[0].c").unwrap()), None);
        assert_eq!(lookup(&item, &parse_path("[0]").unwrap()), Some(Value::Null));
        assert_eq!(lookup(&item, &parse_path("[7]").unwrap()), None);
    }
}
