//! Benchmark inputs.

#![deny(unsafe_code)]
#![warn(missing_docs)]

use chrono::{Duration, Utc};
use lexisync_merge::{Entry, FieldValue, Sense};
use lexisync_spantext::WritingSystemRegistry;
use uuid::Uuid;

/// Writing systems used by every benchmark.
pub fn registry() -> WritingSystemRegistry {
    WritingSystemRegistry::with_tags(["en", "fr", "grc", "seh"])
}

/// Builds span text with `spans` tagged regions between plain text.
pub fn span_text(spans: usize) -> String {
    let mut out = String::from("a large ");
    for i in 0..spans {
        match i % 3 {
            0 => out.push_str(r#"<span lang="fr">ours brun</span>"#),
            1 => out.push_str(
                r#"<span lang="grc" class="styleName_Emphasized_SPACE_Text propi_4_ktptSuperscript_1_0">σπιθαμή</span>"#,
            ),
            _ => out.push_str(
                r#"<span class="guid_01234567-1234-4321-89ab-0123456789ab props_1_ktptFontFamily_Times_SPACE_New_SPACE_Roman">&lt;ref&gt;</span>"#,
            ),
        }
        out.push_str(" and ");
    }
    out.push_str("the end");
    out
}

/// Builds `count` store entries, each with `senses` senses.
pub fn entries(count: usize, senses: usize) -> Vec<Entry> {
    let base = Utc::now() - Duration::days(1);
    (0..count)
        .map(|i| {
            let mut entry = Entry::new(Uuid::new_v4(), base)
                .with_field("lexeme", FieldValue::multi("seh", format!("word{i}")))
                .with_field("note", FieldValue::rich("en", span_text(2)));
            for s in 0..senses {
                entry = entry.with_sense(
                    Sense::new(Uuid::new_v4())
                        .with_field("gloss", FieldValue::multi("en", format!("gloss {i}.{s}"))),
                );
            }
            entry
        })
        .collect()
}

/// Returns a copy of `entries` with every `stride`-th lexeme changed.
pub fn edit_every(entries: &[Entry], stride: usize, text: &str) -> Vec<Entry> {
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            if i % stride.max(1) == 0 {
                entry
                    .clone()
                    .with_field("lexeme", FieldValue::multi("seh", text))
            } else {
                entry.clone()
            }
        })
        .collect()
}
