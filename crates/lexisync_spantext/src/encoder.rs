//! Conversion between runs and native rich text, and native rich text back
//! to span text.

use crate::error::{SpanTextError, SpanTextResult};
use crate::escape::{encode_spaces, escape, hex_encode};
use crate::native::{RichText, RichTextBuilder, TextProps, WritingSystems, WsId};
use crate::props::{int_property_name, string_property_name, IntProperty, PropertyId};
use crate::run::Run;
use std::fmt::Write;

/// Build native rich text from a run sequence.
///
/// Each run starts from a clean property set: the named style is set (or
/// cleared), the language tag is resolved to a writing-system id (runs
/// without a language use `default_ws`), and the recorded properties are
/// re-applied before the content is appended. Recorded properties are
/// applied after the language, so an explicit `WS` property wins.
///
/// # Errors
///
/// Returns [`SpanTextError::UnknownLanguage`] if a run's language tag is
/// not known to `writing_systems`.
pub fn encode(
    runs: &[Run],
    default_ws: WsId,
    writing_systems: &dyn WritingSystems,
) -> SpanTextResult<RichText> {
    let mut builder = RichTextBuilder::new();

    for run in runs {
        builder.clear_props();
        builder.set_str_prop(PropertyId::NAMED_STYLE, run.style_name.as_deref());

        let ws = match &run.language {
            Some(tag) => writing_systems
                .ws_id(tag)
                .ok_or_else(|| SpanTextError::unknown_language(tag.as_str()))?,
            None => default_ws,
        };
        builder.set_int_prop(PropertyId::WS, IntProperty::DEFAULT_VARIATION, ws);
        builder.set_object_guid(run.object_guid);

        for (id, prop) in &run.int_properties {
            builder.set_int_prop(*id, prop.variation, prop.value);
        }
        for (id, value) in &run.string_properties {
            builder.set_str_prop(*id, Some(value));
        }

        builder.append(&run.content);
    }

    Ok(builder.build())
}

/// Serialize native rich text as span text.
///
/// `default_ws` is the baseline, the writing system that runs without a
/// `lang` attribute decode into. A run is wrapped in a `<span>` when its
/// writing system differs from the baseline or when it has a style, an
/// object GUID or any other property; otherwise its escaped text is
/// emitted as is. Attributes are written `lang` first,
/// then `class`, with class tokens in a fixed order: GUID, style, integer
/// properties by id, string properties by id.
///
/// # Errors
///
/// Returns [`SpanTextError::UnknownWritingSystem`] if a run that needs a
/// `lang` attribute uses a writing system unknown to `writing_systems`.
pub fn from_native(
    text: &RichText,
    default_ws: WsId,
    writing_systems: &dyn WritingSystems,
) -> SpanTextResult<String> {
    let mut out = String::new();

    for run in text.runs() {
        let lang = match run.props.ws() {
            Some(ws) if ws != default_ws => Some(
                writing_systems
                    .ws_tag(ws)
                    .ok_or(SpanTextError::UnknownWritingSystem { id: ws })?,
            ),
            _ => None,
        };
        let class = class_tokens(&run.props);
        let content = escape(&run.text);

        if lang.is_none() && class.is_empty() {
            out.push_str(&content);
            continue;
        }

        out.push_str("<span");
        if let Some(tag) = lang {
            let _ = write!(out, " lang=\"{}\"", escape(tag));
        }
        if !class.is_empty() {
            let _ = write!(out, " class=\"{}\"", escape(&class.join(" ")));
        }
        out.push('>');
        out.push_str(&content);
        out.push_str("</span>");
    }

    Ok(out)
}

fn class_tokens(props: &TextProps) -> Vec<String> {
    let mut tokens = Vec::new();

    if let Some(guid) = props.object_guid {
        tokens.push(format!("guid_{guid}"));
    }
    if let Some(style) = props.named_style() {
        tokens.push(format!("styleName_{}", encode_spaces(style)));
    }
    for (id, prop) in &props.int_props {
        if *id == PropertyId::WS {
            continue;
        }
        tokens.push(format!(
            "propi_{id}_{}_{}_{}",
            int_property_name(*id),
            prop.value,
            prop.variation
        ));
    }
    for (id, value) in &props.string_props {
        if *id == PropertyId::NAMED_STYLE {
            continue;
        }
        let value = if *id == PropertyId::OBJ_DATA {
            hex_encode(value)
        } else {
            encode_spaces(value)
        };
        tokens.push(format!("props_{id}_{}_{value}", string_property_name(*id)));
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::decode;
    use crate::native::WritingSystemRegistry;
    use uuid::Uuid;

    fn registry() -> WritingSystemRegistry {
        WritingSystemRegistry::with_tags(["en", "fr", "grc"])
    }

    #[test]
    fn encode_resolves_languages() {
        let ws = registry();
        let runs = vec![
            Run::plain("foo"),
            Run::plain("σπιθαμή").with_language("grc"),
        ];
        let text = encode(&runs, 1, &ws).unwrap();
        assert_eq!(text.run_count(), 2);
        assert_eq!(text.runs()[0].props.ws(), Some(1));
        assert_eq!(text.runs()[1].props.ws(), Some(3));
    }

    #[test]
    fn encode_unknown_language_fails() {
        let runs = vec![Run::plain("x").with_language("xx")];
        assert_eq!(
            encode(&runs, 1, &registry()),
            Err(SpanTextError::unknown_language("xx"))
        );
    }

    #[test]
    fn from_native_writes_properties_in_fixed_order() {
        let ws = registry();
        let mut builder = RichTextBuilder::new();
        builder.set_int_prop(PropertyId::WS, 0, 1);
        builder.append("Some English text");

        builder.clear_props();
        builder.set_int_prop(PropertyId::WS, 0, 2);
        builder.set_str_prop(PropertyId::PARA_STYLE, Some("Default Paragraph Style"));
        builder.set_str_prop(PropertyId::CHAR_STYLE, Some("Default Character Style"));
        builder.set_int_prop(PropertyId::ALIGN, 0, 2);
        builder.append("du texte français");

        builder.clear_props();
        builder.set_int_prop(PropertyId::WS, 0, 3);
        builder.set_int_prop(PropertyId::FIRST_INDENT, IntProperty::MILLI_POINT, 12000);
        builder.set_int_prop(PropertyId::ALIGN, 0, 2);
        builder.set_str_prop(PropertyId::CHAR_STYLE, Some("Default Character Style"));
        builder.set_str_prop(PropertyId::PARA_STYLE, Some("Some Other Style"));
        builder.append("Ελληνικά");

        let span_text = from_native(&builder.build(), 1, &ws).unwrap();
        assert_eq!(
            span_text,
            "Some English text\
             <span lang=\"fr\" class=\"propi_17_ktptAlign_2_0 \
             props_2_ktptCharStyle_Default_SPACE_Character_SPACE_Style \
             props_3_ktptParaStyle_Default_SPACE_Paragraph_SPACE_Style\">du texte français</span>\
             <span lang=\"grc\" class=\"propi_17_ktptAlign_2_0 propi_18_ktptFirstIndent_12000_1 \
             props_2_ktptCharStyle_Default_SPACE_Character_SPACE_Style \
             props_3_ktptParaStyle_Some_SPACE_Other_SPACE_Style\">Ελληνικά</span>"
        );
    }

    #[test]
    fn from_native_escapes_content() {
        let text = RichText::in_ws("a < b && c > d", 1);
        assert_eq!(
            from_native(&text, 1, &registry()).unwrap(),
            "a &lt; b &amp;&amp; c &gt; d"
        );
    }

    #[test]
    fn guid_and_style_share_a_span() {
        let ws = registry();
        let guid = Uuid::parse_str("01234567-1234-4321-89ab-0123456789ab").unwrap();
        let runs = vec![
            Run::plain("foo"),
            Run::plain("bar").with_guid(guid).with_style("Bold"),
        ];
        let span_text = from_native(&encode(&runs, 1, &ws).unwrap(), 1, &ws).unwrap();
        assert_eq!(
            span_text,
            "foo<span class=\"guid_01234567-1234-4321-89ab-0123456789ab styleName_Bold\">bar</span>"
        );
        assert_eq!(decode(&span_text), runs);
    }

    #[test]
    fn object_data_round_trips_through_hex() {
        let ws = registry();
        let runs = vec![Run::plain("pic").with_string_property(PropertyId::OBJ_DATA, "\u{8}A B")];
        let span_text = from_native(&encode(&runs, 1, &ws).unwrap(), 1, &ws).unwrap();
        assert!(span_text.contains("props_6_ktptObjData_0008004100200042"));
        assert_eq!(decode(&span_text), runs);
    }

    #[test]
    fn unknown_ws_in_native_text_fails() {
        let mut builder = RichTextBuilder::new();
        builder.set_int_prop(PropertyId::WS, 0, 1);
        builder.append("a");
        builder.set_int_prop(PropertyId::WS, 0, 99);
        builder.append("b");
        assert_eq!(
            from_native(&builder.build(), 1, &registry()),
            Err(SpanTextError::UnknownWritingSystem { id: 99 })
        );
    }

    #[test]
    fn leading_run_in_another_language_keeps_its_tag() {
        let ws = registry();
        let runs = vec![
            Run::plain("ours").with_language("fr"),
            Run::plain(" bear"),
        ];
        let span_text = from_native(&encode(&runs, 1, &ws).unwrap(), 1, &ws).unwrap();
        assert_eq!(span_text, "<span lang=\"fr\">ours</span> bear");
        assert_eq!(decode(&span_text), runs);
    }

    #[test]
    fn baseline_is_the_given_writing_system() {
        let ws = registry();
        let text = RichText::in_ws("ours", 2);
        assert_eq!(from_native(&text, 2, &ws).unwrap(), "ours");
        assert_eq!(
            from_native(&text, 1, &ws).unwrap(),
            "<span lang=\"fr\">ours</span>"
        );
    }
}
