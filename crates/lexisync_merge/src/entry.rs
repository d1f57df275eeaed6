//! Syncable entry model.
//!
//! An [`Entry`] and its children are generic over the field value type so
//! the same shape can hold document-store values ([`FieldValue`]) or the
//! desktop model's native values. Conversion between the two goes through
//! [`Entry::try_map_fields`].

use crate::field::{same_fields, FieldValue, Fields};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// A lexicon entry, the unit of merge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "F: Deserialize<'de>"))]
pub struct Entry<F = FieldValue> {
    /// Identity shared by both stores.
    pub guid: Uuid,
    /// Document-store deletion flag.
    #[serde(default)]
    pub is_deleted: bool,
    /// Document-store modification time.
    pub date_modified: DateTime<Utc>,
    /// Desktop-model "author info modified" time.
    pub source_modified: DateTime<Utc>,
    /// Entry-level fields.
    #[serde(default)]
    pub fields: Fields<F>,
    /// Ordered senses.
    #[serde(default)]
    pub senses: Vec<Sense<F>>,
}

/// A sense of an entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "F: Deserialize<'de>"))]
pub struct Sense<F = FieldValue> {
    /// Identity of the sense.
    pub guid: Uuid,
    /// Sense-level fields (gloss, definition, part of speech, ...).
    #[serde(default)]
    pub fields: Fields<F>,
    /// Ordered example sentences.
    #[serde(default)]
    pub examples: Vec<Example<F>>,
    /// Ordered pictures.
    #[serde(default)]
    pub pictures: Vec<Picture<F>>,
}

/// An example sentence of a sense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "F: Deserialize<'de>"))]
pub struct Example<F = FieldValue> {
    /// Identity of the example.
    pub guid: Uuid,
    /// Example fields (sentence, translation, reference).
    #[serde(default)]
    pub fields: Fields<F>,
}

/// A picture attached to a sense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "F: Deserialize<'de>"))]
pub struct Picture<F = FieldValue> {
    /// Identity of the picture.
    pub guid: Uuid,
    /// Picture fields (file name, caption).
    #[serde(default)]
    pub fields: Fields<F>,
}

impl<F> Entry<F> {
    /// Creates an empty live entry with both timestamps set to `modified`.
    pub fn new(guid: Uuid, modified: DateTime<Utc>) -> Self {
        Self {
            guid,
            is_deleted: false,
            date_modified: modified,
            source_modified: modified,
            fields: BTreeMap::new(),
            senses: Vec::new(),
        }
    }

    /// Sets a field.
    pub fn with_field(mut self, name: impl Into<String>, value: F) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    /// Appends a sense.
    pub fn with_sense(mut self, sense: Sense<F>) -> Self {
        self.senses.push(sense);
        self
    }

    /// Sets the deletion flag.
    pub fn deleted(mut self) -> Self {
        self.is_deleted = true;
        self
    }

    /// Returns the sense with `guid`, if any.
    pub fn sense(&self, guid: Uuid) -> Option<&Sense<F>> {
        self.senses.iter().find(|sense| sense.guid == guid)
    }

    /// The later of the two modification times.
    pub fn last_modified(&self) -> DateTime<Utc> {
        self.date_modified.max(self.source_modified)
    }

    /// Converts every field value, keeping identities, flags and timestamps.
    pub fn try_map_fields<G, E>(&self, mut f: impl FnMut(&F) -> Result<G, E>) -> Result<Entry<G>, E> {
        Ok(Entry {
            guid: self.guid,
            is_deleted: self.is_deleted,
            date_modified: self.date_modified,
            source_modified: self.source_modified,
            fields: map_fields(&self.fields, &mut f)?,
            senses: self
                .senses
                .iter()
                .map(|sense| sense.try_map_fields(&mut f))
                .collect::<Result<_, _>>()?,
        })
    }
}

impl<F> Sense<F> {
    /// Creates an empty sense.
    pub fn new(guid: Uuid) -> Self {
        Self {
            guid,
            fields: BTreeMap::new(),
            examples: Vec::new(),
            pictures: Vec::new(),
        }
    }

    /// Sets a field.
    pub fn with_field(mut self, name: impl Into<String>, value: F) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    /// Appends an example.
    pub fn with_example(mut self, example: Example<F>) -> Self {
        self.examples.push(example);
        self
    }

    /// Appends a picture.
    pub fn with_picture(mut self, picture: Picture<F>) -> Self {
        self.pictures.push(picture);
        self
    }

    fn try_map_fields<G, E>(&self, f: &mut impl FnMut(&F) -> Result<G, E>) -> Result<Sense<G>, E> {
        Ok(Sense {
            guid: self.guid,
            fields: map_fields(&self.fields, f)?,
            examples: self
                .examples
                .iter()
                .map(|example| {
                    Ok(Example {
                        guid: example.guid,
                        fields: map_fields(&example.fields, f)?,
                    })
                })
                .collect::<Result<_, E>>()?,
            pictures: self
                .pictures
                .iter()
                .map(|picture| {
                    Ok(Picture {
                        guid: picture.guid,
                        fields: map_fields(&picture.fields, f)?,
                    })
                })
                .collect::<Result<_, E>>()?,
        })
    }
}

impl<F> Example<F> {
    /// Creates an empty example.
    pub fn new(guid: Uuid) -> Self {
        Self {
            guid,
            fields: BTreeMap::new(),
        }
    }

    /// Sets a field.
    pub fn with_field(mut self, name: impl Into<String>, value: F) -> Self {
        self.fields.insert(name.into(), value);
        self
    }
}

impl<F> Picture<F> {
    /// Creates an empty picture.
    pub fn new(guid: Uuid) -> Self {
        Self {
            guid,
            fields: BTreeMap::new(),
        }
    }

    /// Sets a field.
    pub fn with_field(mut self, name: impl Into<String>, value: F) -> Self {
        self.fields.insert(name.into(), value);
        self
    }
}

fn map_fields<F, G, E>(
    fields: &Fields<F>,
    f: &mut impl FnMut(&F) -> Result<G, E>,
) -> Result<Fields<G>, E> {
    fields
        .iter()
        .map(|(name, value)| Ok((name.clone(), f(value)?)))
        .collect()
}

impl Entry {
    /// Returns true if fields and senses match, ignoring the deletion
    /// flag and timestamps.
    pub fn content_same(&self, other: &Entry) -> bool {
        same_fields(&self.fields, &other.fields)
            && self.senses.len() == other.senses.len()
            && self
                .senses
                .iter()
                .zip(&other.senses)
                .all(|(a, b)| a.same_as(b))
    }
}

impl Sense {
    /// Returns true if both senses have the same identity and content.
    pub fn same_as(&self, other: &Sense) -> bool {
        self.guid == other.guid
            && same_fields(&self.fields, &other.fields)
            && self.examples.len() == other.examples.len()
            && self
                .examples
                .iter()
                .zip(&other.examples)
                .all(|(a, b)| a.same_as(b))
            && self.pictures.len() == other.pictures.len()
            && self
                .pictures
                .iter()
                .zip(&other.pictures)
                .all(|(a, b)| a.same_as(b))
    }
}

impl Example {
    /// Returns true if both examples have the same identity and fields.
    pub fn same_as(&self, other: &Example) -> bool {
        self.guid == other.guid && same_fields(&self.fields, &other.fields)
    }
}

impl Picture {
    /// Returns true if both pictures have the same identity and fields.
    pub fn same_as(&self, other: &Picture) -> bool {
        self.guid == other.guid && same_fields(&self.fields, &other.fields)
    }
}
