//! Resolution of [`PathExpr`]s against data items

use log::trace;

use crate::binding::{ColumnBinding, PathExpr};
use crate::error::Result;
use crate::path::{lookup, parse_path};
use crate::value::{ExtraData, Record, Value};

/// Resolves binding expressions to values
///
/// Misses (unknown property, index out of range, absent extra-data key)
/// yield the default. Only malformed path syntax and callback errors fail.
pub struct ValuePathResolver;

impl ValuePathResolver {
    /// Resolve an optional expression; `None` yields `default`
    pub fn resolve(
        item: &dyn Record,
        binding: &ColumnBinding,
        spec: Option<&PathExpr>,
        default: Value,
        extra: &ExtraData,
    ) -> Result<Value> {
        match spec {
            None => Ok(default),
            Some(PathExpr::Literal(value)) => Ok(value.clone()),
            Some(PathExpr::Fn(f)) => f(binding, item, extra),
            Some(PathExpr::Path(path)) => Self::resolve_path(item, path, default, extra),
        }
    }

    /// Resolve a path string
    ///
    /// ```
    /// use sheetbind::{ExtraData, Value, ValuePathResolver};
    ///
    /// let item = vec!["a", "b"];
    /// let extra = ExtraData::new();
    /// let get = |path| ValuePathResolver::resolve_path(&item, path, Value::Null, &extra).unwrap();
    ///
    /// assert_eq!(get("[1]"), Value::from("b"));
    /// assert_eq!(get("[5]"), Value::Null);
    /// assert_eq!(get("$[1]"), Value::from("[1]"));
    /// ```
    pub fn resolve_path(
        item: &dyn Record,
        path: &str,
        default: Value,
        extra: &ExtraData,
    ) -> Result<Value> {
        if let Some(literal) = path.strip_prefix('$') {
            return Ok(Value::String(literal.to_string()));
        }

        if let Some(side) = path.strip_prefix('!') {
            let split = side.find(['.', '[']).unwrap_or(side.len());
            let (key, rest) = side.split_at(split);
            let Some(root) = extra.get(key) else {
                trace!("extra data key '{}' not present", key);
                return Ok(default);
            };
            if rest.is_empty() {
                return Ok(root.clone());
            }
            let segments = parse_path(rest)?;
            return Ok(lookup(root, &segments).unwrap_or(default));
        }

        let segments = parse_path(path)?;
        Ok(lookup(item, &segments).unwrap_or(default))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::collections::BTreeMap;

    fn extra_with(key: &str, value: Value) -> ExtraData {
        let mut extra = ExtraData::new();
        extra.insert(key.to_string(), value);
        extra
    }

    #[test]
    fn test_none_yields_default() {
        let binding = ColumnBinding::unbound("x");
        let got = ValuePathResolver::resolve(
            &Value::Null,
            &binding,
            None,
            Value::from("d"),
            &ExtraData::new(),
        )
        .unwrap();
        assert_eq!(got, Value::from("d"));
    }

    #[test]
    fn test_literal_returned_unchanged() {
        let mut map = BTreeMap::new();
        map.insert("font".to_string(), Value::from("bold"));
        let spec = PathExpr::Literal(Value::Map(map.clone()));
        let binding = ColumnBinding::unbound("x");
        let got = ValuePathResolver::resolve(
            &Value::Null,
            &binding,
            Some(&spec),
            Value::Null,
            &ExtraData::new(),
        )
        .unwrap();
        assert_eq!(got, Value::Map(map));
    }

    #[test]
    fn test_callback_receives_arguments() {
        let spec = PathExpr::from_fn(|binding, item, extra| {
            Value::from(format!(
                "{}:{}:{}",
                binding.label(),
                item.element("0").unwrap_or_default(),
                extra.len()
            ))
        });
        let binding = ColumnBinding::new("L", spec.clone());
        let got = ValuePathResolver::resolve(
            &vec![9],
            &binding,
            Some(&spec),
            Value::Null,
            &extra_with("k", Value::Int(1)),
        )
        .unwrap();
        assert_eq!(got, Value::from("L:9:1"));
    }

    #[test]
    fn test_callback_errors_propagate() {
        let spec = PathExpr::try_from_fn(|_, _, _| Err(Error::Configuration("boom".into())));
        let binding = ColumnBinding::unbound("x");
        let got = ValuePathResolver::resolve(
            &Value::Null,
            &binding,
            Some(&spec),
            Value::Null,
            &ExtraData::new(),
        );
        assert!(matches!(got, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_extra_data_lookup() {
        let mut inner = BTreeMap::new();
        inner.insert("x".to_string(), Value::Int(5));
        let extra = extra_with("id", Value::Map(inner));
        let item = Value::Null;

        let get = |path| ValuePathResolver::resolve_path(&item, path, Value::from(""), &extra).unwrap();
        assert_eq!(get("!id.x"), Value::Int(5));
        assert_eq!(get("!id.y"), Value::from(""));
        assert_eq!(get("!missing.x"), Value::from(""));
        assert!(matches!(get("!id"), Value::Map(_)));
    }

    #[test]
    fn test_extra_data_index() {
        let extra = extra_with("tags", Value::from(vec!["a", "b"]));
        let got = ValuePathResolver::resolve_path(&Value::Null, "!tags[1]", Value::Null, &extra)
            .unwrap();
        assert_eq!(got, Value::from("b"));
    }

    #[test]
    fn test_malformed_path_fails() {
        let got = ValuePathResolver::resolve_path(&Value::Null, "a..b", Value::Null, &ExtraData::new());
        assert!(matches!(got, Err(Error::InvalidPath { .. })));
    }
}
