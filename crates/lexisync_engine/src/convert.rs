//! Conversion between the desktop model's entry shape and the document
//! store's entry shape.
//!
//! Only rich text differs: the model holds native [`RichText`] per
//! writing system, the store holds span text. Everything else is copied.

use crate::error::SyncResult;
use lexisync_merge::{Entry, FieldValue};
use lexisync_spantext::{
    decode, encode, from_native, RichText, SpanTextError, SpanTextResult, WritingSystems, WsId,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A field value in desktop-model shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ModelField {
    /// A single plain value.
    Scalar(String),
    /// Plain text per writing-system tag.
    MultiString(BTreeMap<String, String>),
    /// Native rich text per writing-system tag.
    Rich(BTreeMap<String, RichText>),
    /// An ordered list of keys.
    List(Vec<String>),
}

/// An entry in desktop-model shape.
pub type ModelEntry = Entry<ModelField>;

/// Converts a model entry into store shape.
///
/// Each rich text alternative is rendered with its own writing system as
/// the baseline, so runs in any other writing system keep a `lang` tag.
pub fn to_store(entry: &ModelEntry, writing_systems: &dyn WritingSystems) -> SyncResult<Entry> {
    Ok(entry.try_map_fields(|field| field_to_store(field, writing_systems))?)
}

/// Converts a store entry into model shape.
///
/// Each rich text alternative is encoded with its own writing system as
/// the default, so runs without a language land in that alternative.
pub fn to_model(entry: &Entry, writing_systems: &dyn WritingSystems) -> SyncResult<ModelEntry> {
    Ok(entry.try_map_fields(|value| field_to_model(value, writing_systems))?)
}

fn field_to_store(
    field: &ModelField,
    writing_systems: &dyn WritingSystems,
) -> SpanTextResult<FieldValue> {
    Ok(match field {
        ModelField::Scalar(value) => FieldValue::Scalar(value.clone()),
        ModelField::MultiString(map) => FieldValue::MultiText(map.clone()),
        ModelField::List(items) => FieldValue::List(items.clone()),
        ModelField::Rich(alternatives) => FieldValue::RichText(
            alternatives
                .iter()
                .map(|(tag, text)| {
                    let default_ws = alternative_ws(tag, writing_systems)?;
                    Ok((tag.clone(), from_native(text, default_ws, writing_systems)?))
                })
                .collect::<SpanTextResult<_>>()?,
        ),
    })
}

fn field_to_model(
    value: &FieldValue,
    writing_systems: &dyn WritingSystems,
) -> SpanTextResult<ModelField> {
    Ok(match value {
        FieldValue::Scalar(value) => ModelField::Scalar(value.clone()),
        FieldValue::MultiText(map) => ModelField::MultiString(map.clone()),
        FieldValue::List(items) => ModelField::List(items.clone()),
        FieldValue::RichText(alternatives) => ModelField::Rich(
            alternatives
                .iter()
                .map(|(tag, span_text)| {
                    let default_ws = alternative_ws(tag, writing_systems)?;
                    let native = encode(&decode(span_text), default_ws, writing_systems)?;
                    Ok((tag.clone(), native))
                })
                .collect::<SpanTextResult<_>>()?,
        ),
    })
}

fn alternative_ws(tag: &str, writing_systems: &dyn WritingSystems) -> SpanTextResult<WsId> {
    writing_systems
        .ws_id(tag)
        .ok_or_else(|| SpanTextError::unknown_language(tag))
}
