//! Span text to Run decoding.

use crate::escape::{decode_spaces, hex_decode, strip_breaks, unescape};
use crate::props::{IntProperty, PropertyId};
use crate::run::Run;
use crate::tokenizer::{SpanAttributes, Token, Tokenizer};
use uuid::Uuid;

const STYLE_PREFIX: &str = "styleName_";
const GUID_PREFIX: &str = "guid_";
const INT_PROP_PREFIX: &str = "propi_";
const STRING_PROP_PREFIX: &str = "props_";

/// Decode span text into a sequence of runs.
///
/// The input is HTML-unescaped (`&lt;`, `&gt;`, `&amp;` only), stripped of
/// `<br/>` and `<br />` tags, then scanned for span regions. Text outside
/// any span becomes an untagged run; each span becomes one run carrying
/// the span's language, style, GUID and properties.
///
/// Decoding never fails. Malformed span syntax is kept as plain text, and
/// class tokens that do not match a known pattern are ignored one by one.
pub fn decode(source: &str) -> Vec<Run> {
    decode_segments(source)
        .into_iter()
        .map(|segment| segment.run)
        .collect()
}

/// Returns the number of well-formed span regions in `source`.
pub fn span_count(source: &str) -> usize {
    let text = normalize(source);
    Tokenizer::new(&text)
        .filter(|token| matches!(token, Token::SpanOpen(_)))
        .count()
}

/// Returns the content of every span region, in order.
pub fn span_texts(source: &str) -> Vec<String> {
    span_runs(source).map(|run| run.content).collect()
}

/// Returns the language of every span region that has one, in order.
pub fn span_languages(source: &str) -> Vec<String> {
    span_runs(source).filter_map(|run| run.language).collect()
}

/// Returns the named style of every span region that has one, in order.
pub fn span_styles(source: &str) -> Vec<String> {
    span_runs(source).filter_map(|run| run.style_name).collect()
}

/// Returns the object GUID of every span region that has one, in order.
pub fn span_guids(source: &str) -> Vec<Uuid> {
    span_runs(source).filter_map(|run| run.object_guid).collect()
}

struct Segment {
    run: Run,
    from_span: bool,
}

fn span_runs(source: &str) -> impl Iterator<Item = Run> {
    decode_segments(source)
        .into_iter()
        .filter(|segment| segment.from_span)
        .map(|segment| segment.run)
}

fn normalize(source: &str) -> String {
    strip_breaks(&unescape(source))
}

fn decode_segments(source: &str) -> Vec<Segment> {
    let text = normalize(source);
    let mut segments = Vec::new();
    let mut open: Option<Run> = None;

    for token in Tokenizer::new(&text) {
        match token {
            Token::Text(content) => match open.as_mut() {
                Some(run) => run.content.push_str(content),
                None => segments.push(Segment {
                    run: Run::plain(content),
                    from_span: false,
                }),
            },
            Token::SpanOpen(attrs) => open = Some(run_from_attributes(attrs)),
            Token::SpanClose => {
                if let Some(run) = open.take() {
                    segments.push(Segment {
                        run,
                        from_span: true,
                    });
                }
            }
        }
    }

    segments
}

fn run_from_attributes(attrs: SpanAttributes<'_>) -> Run {
    let mut run = Run {
        language: attrs
            .lang
            .map(str::trim)
            .filter(|lang| !lang.is_empty())
            .map(str::to_string),
        ..Run::default()
    };

    for token in attrs.class.unwrap_or_default().split_whitespace() {
        apply_class_token(&mut run, token);
    }
    run
}

fn apply_class_token(run: &mut Run, token: &str) {
    if let Some(name) = token.strip_prefix(STYLE_PREFIX) {
        if !name.is_empty() {
            run.style_name = Some(decode_spaces(name));
        }
    } else if let Some(guid) = token.strip_prefix(GUID_PREFIX) {
        if let Ok(guid) = Uuid::parse_str(guid) {
            run.object_guid = Some(guid);
        }
    } else if let Some(rest) = token.strip_prefix(INT_PROP_PREFIX) {
        if let Some((id, value, variation)) = parse_int_property(rest) {
            run.int_properties
                .insert(id, IntProperty::new(value, variation));
        }
    } else if let Some(rest) = token.strip_prefix(STRING_PROP_PREFIX) {
        if let Some((id, value)) = parse_string_property(rest) {
            run.string_properties.insert(id, value);
        }
    }
}

/// Parses `<id>_<name>_<value>_<variation>`.
fn parse_int_property(rest: &str) -> Option<(PropertyId, i32, i32)> {
    let mut parts = rest.split('_');
    let id = parts.next()?.parse::<u32>().ok()?;
    let name = parts.next()?;
    let value = parts.next()?.parse::<i32>().ok()?;
    let variation = parts.next()?;
    if name.is_empty() || parts.next().is_some() || variation.starts_with(['-', '+']) {
        return None;
    }
    let variation = variation.parse::<i32>().ok()?;
    Some((PropertyId(id), value, variation))
}

/// Parses `<id>_<name>_<value>`; the value may itself contain underscores.
fn parse_string_property(rest: &str) -> Option<(PropertyId, String)> {
    let mut parts = rest.splitn(3, '_');
    let id = PropertyId(parts.next()?.parse::<u32>().ok()?);
    let name = parts.next()?;
    let raw = parts.next()?;
    if name.is_empty() || raw.is_empty() {
        return None;
    }

    let value = if id == PropertyId::OBJ_DATA {
        hex_decode(raw).ok()?
    } else {
        decode_spaces(raw)
    };
    Some((id, value))
}
