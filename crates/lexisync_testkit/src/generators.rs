//! Property-based test generators using proptest.
//!
//! Run sequences produced here stay inside the lossless subset of the
//! codec: a tagged language always differs from the default writing
//! system, and no content spells a `<br>` tag or `<span>` markup. Decoding
//! unescapes before it scans, so escaped tags in content would be read
//! back as markup.

use crate::fixtures::{DEFAULT_WS, OTHER_WS};
use chrono::{DateTime, TimeZone, Utc};
use lexisync_engine::{ModelEntry, ModelField};
use lexisync_merge::{Entry, FieldValue, Sense};
use lexisync_spantext::{encode, IntProperty, PropertyId, Run, WritingSystems};
use proptest::prelude::*;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Strategy for run content: letters, digits, spaces, markup characters
/// and a few non-ASCII letters. The letters never spell `span`.
pub fn content_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-r0-9 &<>αβγé]{1,12}").expect("Invalid regex")
}

/// Strategy for style names and string property values.
pub fn token_value_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z0-9]{1,6}( [a-z0-9]{1,6})?").expect("Invalid regex")
}

/// Strategy for non-nil GUIDs.
pub fn guid_strategy() -> impl Strategy<Value = Uuid> {
    any::<u128>().prop_map(|n| Uuid::from_u128(n | 1))
}

/// Strategy for a language tag other than the default.
pub fn other_language_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(OTHER_WS.to_vec()).prop_map(String::from)
}

fn int_properties_strategy() -> impl Strategy<Value = BTreeMap<PropertyId, IntProperty>> {
    prop::collection::btree_map(
        prop::sample::select(vec![
            PropertyId::SUPERSCRIPT,
            PropertyId::ALIGN,
            PropertyId::FIRST_INDENT,
        ]),
        (-1000i32..1000, 0i32..3).prop_map(|(value, variation)| IntProperty::new(value, variation)),
        0..3,
    )
}

fn string_properties_strategy() -> impl Strategy<Value = BTreeMap<PropertyId, String>> {
    prop::collection::btree_map(
        prop::sample::select(vec![
            PropertyId::FONT_FAMILY,
            PropertyId::CHAR_STYLE,
            PropertyId::PARA_STYLE,
            PropertyId::OBJ_DATA,
        ]),
        token_value_strategy(),
        0..3,
    )
}

/// Strategy for a single run in a language other than the default.
pub fn run_strategy() -> impl Strategy<Value = Run> {
    (
        content_strategy(),
        prop::option::of(other_language_strategy()),
        prop::option::of(token_value_strategy()),
        prop::option::of(guid_strategy()),
        int_properties_strategy(),
        string_properties_strategy(),
    )
        .prop_map(
            |(content, language, style_name, object_guid, int_properties, string_properties)| Run {
                content,
                language,
                style_name,
                object_guid,
                int_properties,
                string_properties,
            },
        )
}

/// Strategy for a non-empty run sequence. Any run, the first included,
/// may carry a language other than the default.
pub fn runs_strategy() -> impl Strategy<Value = Vec<Run>> {
    prop::collection::vec(run_strategy(), 1..6)
}

/// Merges adjacent runs with identical attributes, as native rich text
/// does when they are appended.
pub fn coalesce(runs: &[Run]) -> Vec<Run> {
    let mut out: Vec<Run> = Vec::with_capacity(runs.len());
    for run in runs {
        match out.last_mut() {
            Some(last) if last.same_attributes(run) => last.content.push_str(&run.content),
            _ => out.push(run.clone()),
        }
    }
    out
}

/// Strategy for plain text containing at least one of `<`, `>` or `&`.
///
/// The alphabet cannot spell `span` or `br`, so the text never holds
/// markup that decoding would turn back into tags.
pub fn markup_text_strategy() -> impl Strategy<Value = String> {
    (
        prop::string::string_regex("[a-e ]{0,8}").expect("Invalid regex"),
        prop::sample::select(vec!['<', '>', '&']),
        prop::string::string_regex("[a-e <>&;]{0,8}").expect("Invalid regex"),
    )
        .prop_map(|(before, special, after)| format!("{before}{special}{after}"))
}

/// Returns a fixed time `secs` seconds after an arbitrary epoch.
pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0)
        .single()
        .unwrap_or_default()
}

/// Strategy for store-shaped entries with multi-text fields and senses.
pub fn entries_strategy() -> impl Strategy<Value = Vec<Entry>> {
    prop::collection::vec(
        (
            prop::collection::btree_map("[a-z]{1,6}", "[a-zA-Z ]{0,12}", 0..4),
            0..3usize,
            0i64..10_000,
        ),
        0..6,
    )
    .prop_map(|specs| {
        specs
            .into_iter()
            .map(|(fields, senses, secs)| {
                let mut entry = Entry::new(Uuid::new_v4(), at(secs));
                for (name, text) in fields {
                    entry = entry.with_field(name, FieldValue::multi(DEFAULT_WS, text));
                }
                for n in 0..senses {
                    entry = entry.with_sense(Sense::new(Uuid::new_v4()).with_field(
                        "gloss",
                        FieldValue::multi(DEFAULT_WS, n.to_string()),
                    ));
                }
                entry
            })
            .collect()
    })
}

/// Strategy for model-shaped entries whose definitions are native rich
/// text built from [`runs_strategy`].
///
/// `writing_systems` must know [`DEFAULT_WS`] and every tag in
/// [`OTHER_WS`].
pub fn model_entries_strategy<W>(writing_systems: W) -> impl Strategy<Value = Vec<ModelEntry>>
where
    W: WritingSystems + Clone + std::fmt::Debug + 'static,
{
    prop::collection::vec(
        (
            "[a-z]{1,8}",
            prop::collection::vec(runs_strategy(), 0..3),
        ),
        0..5,
    )
    .prop_map(move |specs| {
        let default_ws = writing_systems.ws_id(DEFAULT_WS).unwrap_or_default();
        specs
            .into_iter()
            .map(|(lexeme, definitions)| {
                let mut entry: ModelEntry = Entry::new(Uuid::new_v4(), Utc::now()).with_field(
                    "lexeme",
                    ModelField::MultiString(BTreeMap::from([(DEFAULT_WS.to_string(), lexeme)])),
                );
                for runs in definitions {
                    let Ok(native) = encode(&runs, default_ws, &writing_systems) else {
                        continue;
                    };
                    entry = entry.with_sense(Sense::new(Uuid::new_v4()).with_field(
                        "definition",
                        ModelField::Rich(BTreeMap::from([(DEFAULT_WS.to_string(), native)])),
                    ));
                }
                entry
            })
            .collect()
    })
}
