//! Dynamic values bound to cells, and the [`Record`] capability used to
//! read named fields off data items

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use sheetbind_core::Style;

/// Per-item side-channel data, computed once per row and visible to every
/// binding through `!key` paths and callbacks
pub type ExtraData = BTreeMap<String, Value>;

/// A value read off a data item, a literal, or produced by a callback
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// No value
    #[default]
    Null,
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Floating point number
    Float(f64),
    /// Text
    String(String),
    /// Calendar date
    Date(NaiveDate),
    /// Date and time
    DateTime(NaiveDateTime),
    /// Sequence of values
    List(Vec<Value>),
    /// String-keyed map of values
    Map(BTreeMap<String, Value>),
    /// A ready-made cell style
    Style(Box<Style>),
}

impl Value {
    /// Check for [`Value::Null`]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Loose truthiness: null, `false`, zero, `""`, `"0"` and empty
    /// collections are false, everything else is true
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(n) => *n != 0.0,
            Value::String(s) => !s.is_empty() && s != "0",
            Value::List(items) => !items.is_empty(),
            Value::Map(map) => !map.is_empty(),
            Value::Date(_) | Value::DateTime(_) | Value::Style(_) => true,
        }
    }

    /// Borrow the text of a [`Value::String`]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view of ints and floats
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Name of the value kind, for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Date(_) => "date",
            Value::DateTime(_) => "datetime",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Style(_) => "style",
        }
    }

    /// Textual form used for labels, string cells and HTML decoding
    pub fn to_display_string(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null | Value::Style(_) => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::String(s) => f.write_str(s),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            Value::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
            Value::Map(map) => {
                for (i, (key, item)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}={}", key, item)?;
                }
                Ok(())
            }
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident as $target:ty),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v as $target)
                }
            }
        )*
    };
}

value_from! {
    i8 => Int as i64,
    i16 => Int as i64,
    i32 => Int as i64,
    i64 => Int as i64,
    u8 => Int as i64,
    u16 => Int as i64,
    u32 => Int as i64,
    f32 => Float as f64,
    f64 => Float as f64,
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::DateTime(dt)
    }
}

impl From<Style> for Value {
    fn from(style: Style) -> Self {
        Value::Style(Box::new(style))
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl<V: Into<Value>> From<BTreeMap<String, V>> for Value {
    fn from(map: BTreeMap<String, V>) -> Self {
        Value::Map(map.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

/// Read access to the fields of a data item
///
/// `property` answers `name` / `.name` path segments, `element` answers
/// `[key]` segments. Returning `None` means "not there"; the resolver turns
/// that into the binding's default.
///
/// ```
/// use sheetbind::{Record, Value};
///
/// struct Guest {
///     name: String,
///     age: u32,
/// }
///
/// impl Record for Guest {
///     fn property(&self, name: &str) -> Option<Value> {
///         match name {
///             "name" => Some(self.name.clone().into()),
///             "age" => Some(self.age.into()),
///             _ => None,
///         }
///     }
/// }
///
/// let guest = Guest { name: "Ada".into(), age: 36 };
/// assert_eq!(guest.property("age"), Some(Value::Int(36)));
/// ```
pub trait Record {
    /// Named field
    fn property(&self, name: &str) -> Option<Value>;

    /// Indexed or keyed element
    fn element(&self, key: &str) -> Option<Value> {
        self.property(key)
    }
}

impl Record for Value {
    fn property(&self, name: &str) -> Option<Value> {
        match self {
            Value::Map(map) => map.get(name).cloned(),
            Value::List(items) => name.parse::<usize>().ok().and_then(|i| items.get(i).cloned()),
            _ => None,
        }
    }
}

impl<V: Clone + Into<Value>> Record for [V] {
    fn property(&self, name: &str) -> Option<Value> {
        let index = name.parse::<usize>().ok()?;
        self.get(index).cloned().map(Into::into)
    }
}

impl<V: Clone + Into<Value>> Record for Vec<V> {
    fn property(&self, name: &str) -> Option<Value> {
        self.as_slice().property(name)
    }
}

impl<V: Clone + Into<Value>> Record for BTreeMap<String, V> {
    fn property(&self, name: &str) -> Option<Value> {
        self.get(name).cloned().map(Into::into)
    }
}

impl<V: Clone + Into<Value>, S: std::hash::BuildHasher> Record for HashMap<String, V, S> {
    fn property(&self, name: &str) -> Option<Value> {
        self.get(name).cloned().map(Into::into)
    }
}

impl<R: Record + ?Sized> Record for Box<R> {
    fn property(&self, name: &str) -> Option<Value> {
        (**self).property(name)
    }

    fn element(&self, key: &str) -> Option<Value> {
        (**self).element(key)
    }
}

#[cfg(feature = "serde")]
mod json {
    use super::{Record, Value};

    impl From<serde_json::Value> for Value {
        fn from(v: serde_json::Value) -> Self {
            match v {
                serde_json::Value::Null => Value::Null,
                serde_json::Value::Bool(b) => Value::Bool(b),
                serde_json::Value::Number(n) => match n.as_i64() {
                    Some(i) => Value::Int(i),
                    None => n.as_f64().map_or(Value::Null, Value::Float),
                },
                serde_json::Value::String(s) => Value::String(s),
                serde_json::Value::Array(items) => {
                    Value::List(items.into_iter().map(Into::into).collect())
                }
                serde_json::Value::Object(map) => {
                    Value::Map(map.into_iter().map(|(k, v)| (k, v.into())).collect())
                }
            }
        }
    }

    impl Record for serde_json::Value {
        fn property(&self, name: &str) -> Option<Value> {
            match self {
                serde_json::Value::Object(map) => map.get(name).cloned().map(Into::into),
                serde_json::Value::Array(items) => name
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| items.get(i))
                    .cloned()
                    .map(Into::into),
                _ => None,
            }
        }
    }
}
