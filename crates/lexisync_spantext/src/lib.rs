//! # LexiSync Span Text
//!
//! Lossless conversion between the desktop model's multi-property rich
//! text and the flat, web-editable "span text" stored in the document
//! store.
//!
//! ## Wire format
//!
//! Span text is plain text interleaved with non-nested `<span>` regions:
//!
//! ```text
//! foo<span lang="grc" class="styleName_Bold propi_4_ktptSuperscript_1_0">σπιθ</span>bar
//! ```
//!
//! - `lang` carries the run's language tag
//! - `class` carries space-separated tokens: `styleName_<name>`,
//!   `guid_<uuid>`, `propi_<id>_<name>_<value>_<variation>` and
//!   `props_<id>_<name>_<value>`
//! - spaces inside token values are written as `_SPACE_`
//! - object-data values are hex-escaped, 4 digits per UTF-16 code unit
//! - only `&`, `<` and `>` are escaped
//!
//! ## Conversions
//!
//! - [`decode`]: span text to [`Run`]s (never fails)
//! - [`encode`]: runs to native [`RichText`]
//! - [`from_native`]: native rich text back to span text
//!
//! `decode(from_native(encode(runs, ws), ws))` reproduces `runs` exactly
//! when both sides use the same default writing system, except that
//! `<br/>` and `<br />` tags are dropped on decode and escaped literal
//! `<span>` markup in content is read back as a span.
//!
//! ## Usage
//!
//! ```
//! use lexisync_spantext::{decode, encode, from_native, WritingSystemRegistry};
//!
//! let ws = WritingSystemRegistry::with_tags(["en", "fr"]);
//! let runs = decode(r#"foo<span lang="fr">portée</span>baz"#);
//! assert_eq!(runs.len(), 3);
//!
//! let native = encode(&runs, 1, &ws).unwrap();
//! let span_text = from_native(&native, 1, &ws).unwrap();
//! assert_eq!(span_text, r#"foo<span lang="fr">portée</span>baz"#);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod decoder;
mod encoder;
mod error;
mod escape;
mod native;
mod props;
mod run;
mod tokenizer;

pub use decoder::{decode, span_count, span_guids, span_languages, span_styles, span_texts};
pub use encoder::{encode, from_native};
pub use error::{SpanTextError, SpanTextResult};
pub use escape::{escape, hex_decode, hex_encode, strip_breaks, unescape, SPACE_TOKEN};
pub use native::{
    NativeRun, RichText, RichTextBuilder, TextProps, WritingSystemRegistry, WritingSystems, WsId,
};
pub use props::{int_property_name, string_property_name, IntProperty, PropertyId};
pub use run::{plain_text, Run};
pub use tokenizer::{tokenize, SpanAttributes, Token, Tokenizer};

/// Decodes span text, then renders it again through native rich text.
///
/// The result is the canonical spelling of `source`: attributes in
/// `lang`, `class` order, class tokens sorted, adjacent identical runs
/// merged and `<br>` tags removed.
///
/// # Errors
///
/// Fails if a language tag in `source` is unknown to `writing_systems`.
pub fn normalize(
    source: &str,
    default_ws: WsId,
    writing_systems: &dyn WritingSystems,
) -> SpanTextResult<String> {
    let native = encode(&decode(source), default_ws, writing_systems)?;
    from_native(&native, default_ws, writing_systems)
}
