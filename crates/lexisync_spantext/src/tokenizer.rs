//! Span-text scanner.
//!
//! Splits already-unescaped span text into a flat token stream. Only
//! complete, well-formed `<span ...>...</span>` regions produce span tokens;
//! anything else (an unterminated span, broken attribute quoting, a
//! self-closing span) stays inside the surrounding plain text.

use std::collections::VecDeque;

const SPAN_OPEN: &str = "<span";
const SPAN_CLOSE: &str = "</span";

/// Attributes of a span opening tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpanAttributes<'a> {
    /// Raw `lang` attribute value.
    pub lang: Option<&'a str>,
    /// Raw `class` attribute value.
    pub class: Option<&'a str>,
}

/// A span-text token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// Text, either outside any span or as span content.
    Text(&'a str),
    /// Start of a span region.
    SpanOpen(SpanAttributes<'a>),
    /// End of a span region.
    SpanClose,
}

/// Single-pass scanner over span text.
///
/// Spans do not nest: a span's content runs to the first valid closing tag.
pub struct Tokenizer<'a> {
    src: &'a str,
    pos: usize,
    pending: VecDeque<Token<'a>>,
}

struct ParsedSpan<'a> {
    attrs: SpanAttributes<'a>,
    content: &'a str,
    end: usize,
}

impl<'a> Tokenizer<'a> {
    /// Creates a scanner over `src`.
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            pending: VecDeque::new(),
        }
    }

    /// Returns the next token, or `None` at end of input.
    pub fn next_token(&mut self) -> Option<Token<'a>> {
        if let Some(token) = self.pending.pop_front() {
            return Some(token);
        }
        if self.pos >= self.src.len() {
            return None;
        }

        let plain_start = self.pos;
        let mut search = self.pos;
        while let Some(offset) = self.src[search..].find(SPAN_OPEN) {
            let open_at = search + offset;
            if let Some(span) = parse_span(self.src, open_at) {
                self.pos = span.end;
                self.pending.push_back(Token::SpanOpen(span.attrs));
                if !span.content.is_empty() {
                    self.pending.push_back(Token::Text(span.content));
                }
                self.pending.push_back(Token::SpanClose);
                if open_at > plain_start {
                    return Some(Token::Text(&self.src[plain_start..open_at]));
                }
                return self.pending.pop_front();
            }
            search = open_at + SPAN_OPEN.len();
        }

        self.pos = self.src.len();
        Some(Token::Text(&self.src[plain_start..]))
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

/// Collects every token of `src`.
pub fn tokenize(src: &str) -> Vec<Token<'_>> {
    Tokenizer::new(src).collect()
}

fn parse_span(src: &str, open_at: usize) -> Option<ParsedSpan<'_>> {
    let mut pos = open_at + SPAN_OPEN.len();
    let bytes = src.as_bytes();

    // "<spanish>" is not a span.
    match bytes.get(pos) {
        Some(b'>') => {}
        Some(b) if b.is_ascii_whitespace() => {}
        _ => return None,
    }

    let mut attrs = SpanAttributes::default();
    loop {
        pos = skip_whitespace(bytes, pos);
        match bytes.get(pos)? {
            b'>' => {
                pos += 1;
                break;
            }
            b'/' => return None,
            _ => {}
        }

        let name_start = pos;
        while bytes
            .get(pos)
            .is_some_and(|b| b.is_ascii_alphanumeric() || *b == b'-' || *b == b':')
        {
            pos += 1;
        }
        if pos == name_start {
            return None;
        }
        let name = &src[name_start..pos];

        pos = skip_whitespace(bytes, pos);
        if bytes.get(pos)? != &b'=' {
            return None;
        }
        pos = skip_whitespace(bytes, pos + 1);

        let quote = *bytes.get(pos)?;
        if quote != b'"' && quote != b'\'' {
            return None;
        }
        let value_start = pos + 1;
        let value_len = src[value_start..].find(quote as char)?;
        let value = &src[value_start..value_start + value_len];
        pos = value_start + value_len + 1;

        match name {
            "lang" => attrs.lang = Some(value),
            "class" => attrs.class = Some(value),
            _ => {}
        }
    }

    let content_start = pos;
    let mut search = pos;
    while let Some(offset) = src[search..].find(SPAN_CLOSE) {
        let close_at = search + offset;
        let after = skip_whitespace(bytes, close_at + SPAN_CLOSE.len());
        if bytes.get(after) == Some(&b'>') {
            return Some(ParsedSpan {
                attrs,
                content: &src[content_start..close_at],
                end: after + 1,
            });
        }
        search = close_at + SPAN_CLOSE.len();
    }
    None
}

fn skip_whitespace(bytes: &[u8], mut pos: usize) -> usize {
    while bytes.get(pos).is_some_and(|b| b.is_ascii_whitespace()) {
        pos += 1;
    }
    pos
}
