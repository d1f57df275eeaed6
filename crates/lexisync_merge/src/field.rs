//! Field values of syncable entries.

use lexisync_spantext::decode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Named field values of one entry, sense, example or picture.
pub type Fields<F = FieldValue> = BTreeMap<String, F>;

/// The value of one field in document-store shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    /// A single plain value (part of speech, a flag, a date).
    Scalar(String),
    /// Plain text per writing-system tag.
    MultiText(BTreeMap<String, String>),
    /// Span text per writing-system tag.
    RichText(BTreeMap<String, String>),
    /// An ordered list of keys (semantic domains, option-list values).
    List(Vec<String>),
}

impl FieldValue {
    /// Creates a scalar value.
    pub fn scalar(value: impl Into<String>) -> Self {
        FieldValue::Scalar(value.into())
    }

    /// Creates a single-alternative rich text value.
    pub fn rich(ws: impl Into<String>, span_text: impl Into<String>) -> Self {
        FieldValue::RichText(BTreeMap::from([(ws.into(), span_text.into())]))
    }

    /// Creates a single-alternative plain multi-text value.
    pub fn multi(ws: impl Into<String>, text: impl Into<String>) -> Self {
        FieldValue::MultiText(BTreeMap::from([(ws.into(), text.into())]))
    }

    /// Returns true if both values mean the same thing.
    ///
    /// Rich text alternatives are compared by their decoded runs, so
    /// attribute order or escaping differences are not changes.
    pub fn same_as(&self, other: &FieldValue) -> bool {
        match (self, other) {
            (FieldValue::RichText(a), FieldValue::RichText(b)) => {
                a.len() == b.len()
                    && a.iter().all(|(ws, text)| {
                        b.get(ws)
                            .is_some_and(|other| text == other || decode(text) == decode(other))
                    })
            }
            _ => self == other,
        }
    }
}

/// Compares two optional values with [`FieldValue::same_as`].
pub fn same_value(a: Option<&FieldValue>, b: Option<&FieldValue>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.same_as(b),
        (None, None) => true,
        _ => false,
    }
}

/// Compares two field sets value by value.
pub fn same_fields(a: &Fields, b: &Fields) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .all(|(name, value)| same_value(Some(value), b.get(name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rich_text_ignores_attribute_order() {
        let a = FieldValue::rich("en", r#"a<span lang="fr" class="styleName_Bold">b</span>"#);
        let b = FieldValue::rich("en", r#"a<span class="styleName_Bold" lang="fr">b</span>"#);
        assert_ne!(a, b);
        assert!(a.same_as(&b));
    }

    #[test]
    fn rich_text_detects_content_change() {
        let a = FieldValue::rich("en", "gloss");
        let b = FieldValue::rich("en", "gloss - changed");
        assert!(!a.same_as(&b));
        assert!(!a.same_as(&FieldValue::rich("fr", "gloss")));
    }

    #[test]
    fn kinds_never_match() {
        assert!(!FieldValue::multi("en", "x").same_as(&FieldValue::rich("en", "x")));
        assert!(same_value(None, None));
        assert!(!same_value(Some(&FieldValue::scalar("n")), None));
    }

    #[test]
    fn serialized_shape() {
        let json = serde_json::to_string(&FieldValue::scalar("noun")).unwrap();
        assert_eq!(json, r#"{"type":"scalar","value":"noun"}"#);
    }
}
