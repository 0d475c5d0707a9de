//! Ready-made value formatters

use std::rc::Rc;

use crate::binding::Formatter;
use crate::translate::Translator;
use crate::value::Value;

/// Truthy values become `yes`, everything else `no`
///
/// ```
/// use sheetbind::{yes_no_formatter, Value};
///
/// let f = yes_no_formatter("Yes", "No");
/// assert_eq!(f(Value::Int(1)), Value::from("Yes"));
/// assert_eq!(f(Value::from("")), Value::from("No"));
/// ```
pub fn yes_no_formatter<Y: Into<String>, N: Into<String>>(yes: Y, no: N) -> Formatter {
    let yes = yes.into();
    let no = no.into();
    Rc::new(move |value: Value| {
        Value::String(if value.is_truthy() { yes.clone() } else { no.clone() })
    })
}

/// Translate the value's text in `domain`
pub fn translation_formatter<S: Into<String>>(translator: Rc<dyn Translator>, domain: S) -> Formatter {
    let domain = domain.into();
    Rc::new(move |value: Value| {
        Value::String(translator.translate(&value.to_display_string(), &domain))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::MessageCatalog;

    #[test]
    fn test_yes_no() {
        let f = yes_no_formatter("ja", "nein");
        assert_eq!(f(Value::Bool(true)), Value::from("ja"));
        assert_eq!(f(Value::Bool(false)), Value::from("nein"));
        assert_eq!(f(Value::Null), Value::from("nein"));
        assert_eq!(f(Value::from("0")), Value::from("nein"));
        assert_eq!(f(Value::from("x")), Value::from("ja"));
    }

    #[test]
    fn test_translation() {
        let catalog = MessageCatalog::new().with("states", "open", "Offen");
        let f = translation_formatter(Rc::new(catalog), "states");
        assert_eq!(f(Value::from("open")), Value::from("Offen"));
        assert_eq!(f(Value::from("closed")), Value::from("closed"));
    }
}
