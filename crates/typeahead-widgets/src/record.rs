#![forbid(unsafe_code)]

//! Field access for candidate records.
//!
//! The controller treats records as opaque apart from two things: a
//! descriptor field (display text and equality) and the fields the default
//! search scans. [`Record`] is the only view it needs.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};

/// A candidate record with named text fields.
///
/// Missing fields are not errors: callers fall back to the empty string, so a
/// malformed record simply never matches and displays as blank.
pub trait Record {
    /// Text value of the named field, if present.
    fn field(&self, name: &str) -> Option<Cow<'_, str>>;
}

impl Record for HashMap<String, String> {
    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        self.get(name).map(|v| Cow::Borrowed(v.as_str()))
    }
}

impl Record for BTreeMap<String, String> {
    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        self.get(name).map(|v| Cow::Borrowed(v.as_str()))
    }
}

impl<R: Record + ?Sized> Record for &R {
    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        (**self).field(name)
    }
}

impl<R: Record + ?Sized> Record for std::sync::Arc<R> {
    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        (**self).field(name)
    }
}

/// JSON objects are records; strings are used as-is, numbers and booleans are
/// rendered with their JSON text, everything else counts as missing.
#[cfg(feature = "serde")]
impl Record for serde_json::Value {
    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        match self.get(name)? {
            serde_json::Value::String(s) => Some(Cow::Borrowed(s.as_str())),
            serde_json::Value::Number(n) => Some(Cow::Owned(n.to_string())),
            serde_json::Value::Bool(b) => Some(Cow::Owned(b.to_string())),
            _ => None,
        }
    }
}

/// Field text with the empty-string fallback.
pub fn field_text<'a, R: Record + ?Sized>(record: &'a R, name: &str) -> Cow<'a, str> {
    record.field(name).unwrap_or(Cow::Borrowed(""))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fruit(name: &str) -> BTreeMap<String, String> {
        BTreeMap::from([("name".to_string(), name.to_string())])
    }

    #[test]
    fn map_records_expose_fields() {
        let apple = fruit("Apple");
        assert_eq!(apple.field("name").as_deref(), Some("Apple"));
        assert_eq!(apple.field("color"), None);
    }

    #[test]
    fn missing_field_falls_back_to_empty() {
        let apple = fruit("Apple");
        assert_eq!(field_text(&apple, "color"), "");
        assert_eq!(field_text(&apple, "name"), "Apple");
    }

    #[test]
    fn references_and_arcs_delegate() {
        let apple = std::sync::Arc::new(fruit("Apple"));
        assert_eq!(field_text(&apple, "name"), "Apple");
        let by_ref: &BTreeMap<String, String> = &apple;
        assert_eq!(field_text(&by_ref, "name"), "Apple");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_values_are_records() {
        let v = serde_json::json!({"name": "Kiwi", "calories": 42, "ripe": true, "tags": ["x"]});
        assert_eq!(field_text(&v, "name"), "Kiwi");
        assert_eq!(field_text(&v, "calories"), "42");
        assert_eq!(field_text(&v, "ripe"), "true");
        assert_eq!(field_text(&v, "tags"), "");
        assert_eq!(field_text(&serde_json::json!("bare"), "name"), "");
    }
}
