//! Escaping rules of the span-text wire format.

use crate::error::{SpanTextError, SpanTextResult};

/// Literal token standing for a space inside class tokens.
pub const SPACE_TOKEN: &str = "_SPACE_";

const BREAK_TAGS: [&str; 2] = ["<br/>", "<br />"];

/// Escapes the three HTML metacharacters `&`, `<` and `>`.
///
/// Nothing else is touched; non-ASCII text passes through unchanged.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Reverses [`escape`] in a single left-to-right pass.
///
/// A single pass keeps `&amp;lt;` as the literal text `&lt;` instead of
/// collapsing it to `<`. Any other entity-like text is left alone.
pub fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        if let Some(tail) = rest.strip_prefix("&lt;") {
            out.push('<');
            rest = tail;
        } else if let Some(tail) = rest.strip_prefix("&gt;") {
            out.push('>');
            rest = tail;
        } else if let Some(tail) = rest.strip_prefix("&amp;") {
            out.push('&');
            rest = tail;
        } else {
            out.push('&');
            rest = &rest[1..];
        }
    }
    out.push_str(rest);
    out
}

/// Removes `<br/>` and `<br />` tags without replacement.
pub fn strip_breaks(text: &str) -> String {
    let mut out = text.to_string();
    for tag in BREAK_TAGS {
        if out.contains(tag) {
            out = out.replace(tag, "");
        }
    }
    out
}

/// Replaces spaces with [`SPACE_TOKEN`].
pub fn encode_spaces(text: &str) -> String {
    text.replace(' ', SPACE_TOKEN)
}

/// Replaces [`SPACE_TOKEN`] with spaces.
pub fn decode_spaces(text: &str) -> String {
    text.replace(SPACE_TOKEN, " ")
}

/// Hex-encodes text as four uppercase digits per UTF-16 code unit.
pub fn hex_encode(text: &str) -> String {
    text.encode_utf16().map(|unit| format!("{unit:04X}")).collect()
}

/// Decodes text produced by [`hex_encode`]. Either digit case is accepted.
///
/// # Errors
///
/// Fails if the input is not a whole number of 4-digit groups, contains a
/// non-hex digit, or spells an unpaired UTF-16 surrogate.
pub fn hex_decode(hex: &str) -> SpanTextResult<String> {
    if !hex.is_ascii() || hex.len() % 4 != 0 {
        return Err(SpanTextError::invalid_hex(format!(
            "expected groups of 4 hex digits, got {} bytes",
            hex.len()
        )));
    }

    let units = hex
        .as_bytes()
        .chunks(4)
        .map(|chunk| {
            let group = std::str::from_utf8(chunk).unwrap_or_default();
            u16::from_str_radix(group, 16)
                .map_err(|_| SpanTextError::invalid_hex(format!("bad hex group {group:?}")))
        })
        .collect::<SpanTextResult<Vec<u16>>>()?;

    String::from_utf16(&units).map_err(|_| SpanTextError::invalid_hex("unpaired surrogate"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_only_touches_metacharacters() {
        assert_eq!(
            escape("strings with <angle brackets> & σπιθαμή"),
            "strings with &lt;angle brackets&gt; &amp; σπιθαμή"
        );
    }

    #[test]
    fn unescape_is_single_pass() {
        assert_eq!(unescape("&amp;lt;"), "&lt;");
        assert_eq!(unescape("a &lt;b&gt; &amp; c"), "a <b> & c");
    }

    #[test]
    fn unescape_leaves_other_entities() {
        assert_eq!(unescape("&quot;x&quot; & y &"), "&quot;x&quot; & y &");
    }

    #[test]
    fn strip_breaks_removes_both_forms() {
        let input = "strings with <br/> or <br /> should have them stripped";
        let stripped = strip_breaks(input);
        assert_eq!(stripped, "strings with  or  should have them stripped");
        assert_eq!(input.len() - stripped.len(), "<br/>".len() + "<br />".len());
    }

    #[test]
    fn spaces_round_trip() {
        let encoded = encode_spaces("Default Paragraph Style");
        assert_eq!(encoded, "Default_SPACE_Paragraph_SPACE_Style");
        assert_eq!(decode_spaces(&encoded), "Default Paragraph Style");
    }

    #[test]
    fn hex_handles_control_characters() {
        let payload = "\u{0007}\u{0001}x";
        let hex = hex_encode(payload);
        assert_eq!(hex, "000700010078");
        assert_eq!(hex_decode(&hex).unwrap(), payload);
        assert_eq!(hex_decode("00ff").unwrap(), hex_decode("00FF").unwrap());
    }

    #[test]
    fn hex_decode_rejects_bad_input() {
        assert!(hex_decode("123").is_err());
        assert!(hex_decode("12G4").is_err());
        assert!(hex_decode("D800").is_err());
    }
}
