//! Label translation hook

use std::collections::HashMap;

/// Domain used when a binding does not name one
pub const DEFAULT_DOMAIN: &str = "messages";

/// Translation lookup supplied by the host application
pub trait Translator {
    /// Translate `key` within `domain`
    fn translate(&self, key: &str, domain: &str) -> String;
}

/// How a header label is translated
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LabelDomain {
    /// Use the label as written
    Disabled,
    /// Translate in [`DEFAULT_DOMAIN`]
    #[default]
    Default,
    /// Translate in the named domain
    Domain(String),
}

impl From<&str> for LabelDomain {
    fn from(domain: &str) -> Self {
        LabelDomain::Domain(domain.to_string())
    }
}

/// In-memory [`Translator`]; missing keys translate to themselves
///
/// ```
/// use sheetbind::{MessageCatalog, Translator};
///
/// let mut catalog = MessageCatalog::new();
/// catalog.insert("messages", "name", "Name");
/// assert_eq!(catalog.translate("name", "messages"), "Name");
/// assert_eq!(catalog.translate("age", "messages"), "age");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MessageCatalog {
    domains: HashMap<String, HashMap<String, String>>,
}

impl MessageCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a translation
    pub fn insert<D, K, T>(&mut self, domain: D, key: K, text: T)
    where
        D: Into<String>,
        K: Into<String>,
        T: Into<String>,
    {
        self.domains
            .entry(domain.into())
            .or_default()
            .insert(key.into(), text.into());
    }

    /// Builder form of [`insert`](Self::insert)
    pub fn with<D, K, T>(mut self, domain: D, key: K, text: T) -> Self
    where
        D: Into<String>,
        K: Into<String>,
        T: Into<String>,
    {
        self.insert(domain, key, text);
        self
    }
}

impl Translator for MessageCatalog {
    fn translate(&self, key: &str, domain: &str) -> String {
        self.domains
            .get(domain)
            .and_then(|d| d.get(key))
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}

/// Translate a label according to its domain setting
pub fn translate_label(translator: Option<&dyn Translator>, key: &str, domain: &LabelDomain) -> String {
    match (translator, domain) {
        (None, _) | (_, LabelDomain::Disabled) => key.to_string(),
        (Some(t), LabelDomain::Default) => t.translate(key, DEFAULT_DOMAIN),
        (Some(t), LabelDomain::Domain(d)) => t.translate(key, d),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> MessageCatalog {
        MessageCatalog::new()
            .with("messages", "label.name", "Name")
            .with("admin", "label.name", "Full name")
    }

    #[test]
    fn test_domains() {
        let catalog = catalog();
        let t: Option<&dyn Translator> = Some(&catalog);
        assert_eq!(translate_label(t, "label.name", &LabelDomain::Default), "Name");
        assert_eq!(translate_label(t, "label.name", &"admin".into()), "Full name");
        assert_eq!(translate_label(t, "label.name", &LabelDomain::Disabled), "label.name");
        assert_eq!(translate_label(None, "label.name", &LabelDomain::Default), "label.name");
    }

    #[test]
    fn test_missing_key_is_identity() {
        assert_eq!(catalog().translate("other", "messages"), "other");
        assert_eq!(catalog().translate("label.name", "nowhere"), "label.name");
    }
}
