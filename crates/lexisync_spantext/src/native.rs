//! Native rich-text representation.
//!
//! This is the desktop model's view of formatted text: runs whose
//! attributes are typed properties keyed by numeric id, with the language
//! carried as a writing-system id in the `WS` integer property.

use crate::props::{IntProperty, PropertyId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Native writing-system handle.
pub type WsId = i32;

/// Property set of one native run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextProps {
    /// Integer properties by id.
    pub int_props: BTreeMap<PropertyId, IntProperty>,
    /// String properties by id.
    pub string_props: BTreeMap<PropertyId, String>,
    /// Embedded object reference.
    pub object_guid: Option<Uuid>,
}

impl TextProps {
    /// Returns the writing system of the run, if set.
    pub fn ws(&self) -> Option<WsId> {
        self.int_props.get(&PropertyId::WS).map(|prop| prop.value)
    }

    /// Returns the named style of the run, if set.
    pub fn named_style(&self) -> Option<&str> {
        self.string_props
            .get(&PropertyId::NAMED_STYLE)
            .map(String::as_str)
    }
}

/// One run of native rich text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeRun {
    /// Text of the run.
    pub text: String,
    /// Properties of the run.
    pub props: TextProps,
}

/// An immutable native rich-text value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichText {
    runs: Vec<NativeRun>,
}

impl RichText {
    /// Creates single-run text in one writing system.
    pub fn in_ws(text: impl Into<String>, ws: WsId) -> Self {
        let mut builder = RichTextBuilder::new();
        builder.set_int_prop(PropertyId::WS, IntProperty::DEFAULT_VARIATION, ws);
        builder.append(&text.into());
        builder.build()
    }

    /// Returns the runs.
    pub fn runs(&self) -> &[NativeRun] {
        &self.runs
    }

    /// Returns the number of runs.
    pub fn run_count(&self) -> usize {
        self.runs.len()
    }

    /// Returns true if there is no text.
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Returns the concatenated text of all runs.
    pub fn text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }
}

/// Incremental builder for [`RichText`].
///
/// Properties set on the builder apply to text appended afterwards. Text
/// appended with the same properties as the previous run extends that run.
#[derive(Debug, Default)]
pub struct RichTextBuilder {
    runs: Vec<NativeRun>,
    props: TextProps,
}

impl RichTextBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears all pending properties.
    pub fn clear_props(&mut self) {
        self.props = TextProps::default();
    }

    /// Sets an integer property for subsequent text.
    pub fn set_int_prop(&mut self, id: PropertyId, variation: i32, value: i32) {
        self.props
            .int_props
            .insert(id, IntProperty::new(value, variation));
    }

    /// Sets or, with `None`, removes a string property for subsequent text.
    pub fn set_str_prop(&mut self, id: PropertyId, value: Option<&str>) {
        match value {
            Some(value) => {
                self.props.string_props.insert(id, value.to_string());
            }
            None => {
                self.props.string_props.remove(&id);
            }
        }
    }

    /// Sets or clears the embedded object reference for subsequent text.
    pub fn set_object_guid(&mut self, guid: Option<Uuid>) {
        self.props.object_guid = guid;
    }

    /// Appends text with the pending properties. Empty text is ignored.
    pub fn append(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        match self.runs.last_mut() {
            Some(last) if last.props == self.props => last.text.push_str(text),
            _ => self.runs.push(NativeRun {
                text: text.to_string(),
                props: self.props.clone(),
            }),
        }
    }

    /// Finishes the text.
    pub fn build(self) -> RichText {
        RichText { runs: self.runs }
    }
}

/// Resolves between language tags and native writing-system ids.
pub trait WritingSystems {
    /// Returns the id registered for `tag`.
    fn ws_id(&self, tag: &str) -> Option<WsId>;

    /// Returns the tag registered for `id`.
    fn ws_tag(&self, id: WsId) -> Option<&str>;
}

/// An in-memory writing-system table.
#[derive(Debug, Clone, Default)]
pub struct WritingSystemRegistry {
    by_tag: BTreeMap<String, WsId>,
    by_id: BTreeMap<WsId, String>,
}

impl WritingSystemRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding `tags`, numbered from 1 in order.
    pub fn with_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut registry = Self::new();
        for tag in tags {
            registry.register(tag);
        }
        registry
    }

    /// Registers `tag`, returning its id. Registering a known tag returns
    /// the existing id.
    pub fn register(&mut self, tag: impl Into<String>) -> WsId {
        let tag = tag.into();
        if let Some(id) = self.by_tag.get(&tag) {
            return *id;
        }
        let id = self.by_id.keys().next_back().map_or(1, |last| last + 1);
        self.by_tag.insert(tag.clone(), id);
        self.by_id.insert(id, tag);
        id
    }

    /// Returns the number of registered writing systems.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

impl WritingSystems for WritingSystemRegistry {
    fn ws_id(&self, tag: &str) -> Option<WsId> {
        self.by_tag.get(tag).copied()
    }

    fn ws_tag(&self, id: WsId) -> Option<&str> {
        self.by_id.get(&id).map(String::as_str)
    }
}
