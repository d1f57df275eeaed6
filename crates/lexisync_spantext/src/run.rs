//! The Run type: one stretch of text with uniform attributes.

use crate::props::{IntProperty, PropertyId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// A stretch of text sharing one language, style and property set.
///
/// A sequence of runs reconstructs one rich-text value. Property maps are
/// ordered by id so that two runs with the same attributes compare equal
/// regardless of the order the properties were recorded in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    /// Text content.
    pub content: String,
    /// Language tag, when the run is in a language other than the default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Named style.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_name: Option<String>,
    /// Embedded object reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_guid: Option<Uuid>,
    /// Integer properties by id.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub int_properties: BTreeMap<PropertyId, IntProperty>,
    /// String properties by id.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub string_properties: BTreeMap<PropertyId, String>,
}

impl Run {
    /// Creates a run with only content set.
    pub fn plain(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    /// Sets the language tag.
    pub fn with_language(mut self, tag: impl Into<String>) -> Self {
        self.language = Some(tag.into());
        self
    }

    /// Sets the named style.
    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style_name = Some(style.into());
        self
    }

    /// Sets the embedded object GUID.
    pub fn with_guid(mut self, guid: Uuid) -> Self {
        self.object_guid = Some(guid);
        self
    }

    /// Records an integer property.
    pub fn with_int_property(mut self, id: PropertyId, value: i32, variation: i32) -> Self {
        self.int_properties
            .insert(id, IntProperty::new(value, variation));
        self
    }

    /// Records a string property.
    pub fn with_string_property(mut self, id: PropertyId, value: impl Into<String>) -> Self {
        self.string_properties.insert(id, value.into());
        self
    }

    /// Returns true if this run carries any attribute besides its content.
    ///
    /// A `<span>` with no language, style, GUID or property decodes to an
    /// untagged run.
    pub fn is_tagged(&self) -> bool {
        self.language.is_some()
            || self.style_name.is_some()
            || self.object_guid.is_some()
            || !self.int_properties.is_empty()
            || !self.string_properties.is_empty()
    }

    /// Returns true if this run and `other` share every attribute.
    pub fn same_attributes(&self, other: &Run) -> bool {
        self.language == other.language
            && self.style_name == other.style_name
            && self.object_guid == other.object_guid
            && self.int_properties == other.int_properties
            && self.string_properties == other.string_properties
    }
}

/// Concatenates the content of a run sequence.
pub fn plain_text(runs: &[Run]) -> String {
    runs.iter().map(|run| run.content.as_str()).collect()
}
