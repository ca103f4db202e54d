//! Streaming markup tokenizer
//!
//! Splits a markup fragment into an alternating sequence of tag-like tokens
//! and text runs, keeping byte spans into the source so that every tag can be
//! re-emitted byte for byte. This is deliberately not a full HTML parser: it
//! only needs to know where tags start and end, what they are called, and
//! what attributes they carry.
//!
//! Entity decoding lives here too, because extraction and annotation must
//! measure plain text with exactly the same codec.

use crate::error::{AnnotateError, Result};
use crate::mapping::{CharSpan, OffsetMap};
use quick_xml::escape::{resolve_html5_entity, unescape_with};

/// Elements that never have an end tag
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose body is raw text rather than markup
pub(crate) const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Longest entity body we try to decode (`&CounterClockwiseContourIntegral;`)
const MAX_ENTITY_LEN: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    StartTag,
    EndTag,
    SelfClosingTag,
    Comment,
    /// Doctype, CDATA section or processing instruction
    Declaration,
    Text,
}

impl TokenKind {
    /// Anything that is not text
    pub fn is_tag_like(&self) -> bool {
        !matches!(self, TokenKind::Text)
    }
}

/// A single token with its position in the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupToken {
    pub kind: TokenKind,
    pub span: CharSpan,
    /// Lowercase element name (tags only)
    pub name: Option<String>,
}

impl MarkupToken {
    fn new(kind: TokenKind, start: usize, end: usize) -> Self {
        Self {
            kind,
            span: CharSpan::new(start, end),
            name: None,
        }
    }

    fn named(mut self, name: String) -> Self {
        self.name = Some(name);
        self
    }

    /// The token's bytes in `source`
    pub fn raw<'a>(&self, source: &'a str) -> &'a str {
        &source[self.span.start..self.span.end]
    }

    pub fn is_text(&self) -> bool {
        self.kind == TokenKind::Text
    }

    /// Whether this is a tag with the given (lowercase) name
    pub fn name_is(&self, name: &str) -> bool {
        self.name.as_deref() == Some(name)
    }

    pub fn is_start_of(&self, name: &str) -> bool {
        self.kind == TokenKind::StartTag && self.name_is(name)
    }

    pub fn is_end_of(&self, name: &str) -> bool {
        self.kind == TokenKind::EndTag && self.name_is(name)
    }
}

/// Iterator over the tokens of a markup string
pub struct MarkupTokenizer<'a> {
    source: &'a str,
    pos: usize,
    /// Set after `<script>`/`<style>`: the body up to the matching end tag is text
    raw_text_until: Option<String>,
    failed: bool,
}

impl<'a> MarkupTokenizer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            raw_text_until: None,
            failed: false,
        }
    }

    fn starts_markup(&self, at: usize) -> bool {
        let bytes = self.source.as_bytes();
        match bytes.get(at + 1) {
            Some(b) if b.is_ascii_alphabetic() => true,
            Some(b'!') | Some(b'?') => true,
            Some(b'/') => bytes.get(at + 2).is_some_and(|b| b.is_ascii_alphabetic()),
            _ => false,
        }
    }

    fn find_text_end(&self, from: usize) -> usize {
        let mut search = from;
        while let Some(rel) = self.source[search..].find('<') {
            let at = search + rel;
            if self.starts_markup(at) {
                return at;
            }
            search = at + 1;
        }
        self.source.len()
    }

    fn find_raw_text_end(&self, name: &str) -> usize {
        let mut search = self.pos;
        while let Some(rel) = self.source[search..].find("</") {
            let at = search + rel;
            let candidate = self.source.as_bytes().get(at + 2..at + 2 + name.len());
            if candidate.is_some_and(|c| c.eq_ignore_ascii_case(name.as_bytes())) {
                return at;
            }
            search = at + 2;
        }
        self.source.len()
    }

    fn scan_markup(&mut self) -> Result<MarkupToken> {
        let start = self.pos;
        let rest = &self.source[start..];

        if rest.starts_with("<!--") {
            let end = rest[4..]
                .find("-->")
                .ok_or_else(|| AnnotateError::malformed(start, "unterminated comment"))?;
            return Ok(MarkupToken::new(TokenKind::Comment, start, start + 4 + end + 3));
        }

        if rest.starts_with("<![CDATA[") {
            let end = rest
                .find("]]>")
                .ok_or_else(|| AnnotateError::malformed(start, "unterminated CDATA section"))?;
            return Ok(MarkupToken::new(TokenKind::Declaration, start, start + end + 3));
        }

        if rest.starts_with("<!") || rest.starts_with("<?") {
            let end = rest
                .find('>')
                .ok_or_else(|| AnnotateError::malformed(start, "unterminated declaration"))?;
            return Ok(MarkupToken::new(TokenKind::Declaration, start, start + end + 1));
        }

        if let Some(body) = rest.strip_prefix("</") {
            let name = read_name(body);
            let end = rest
                .find('>')
                .ok_or_else(|| AnnotateError::malformed(start, format!("unterminated </{name}")))?;
            return Ok(MarkupToken::new(TokenKind::EndTag, start, start + end + 1).named(name));
        }

        let name = read_name(&rest[1..]);
        let end = find_tag_end(rest, 1 + name.len())
            .ok_or_else(|| AnnotateError::malformed(start, format!("unterminated <{name}")))?;
        let raw = &rest[..end];
        let kind = if raw.ends_with("/>") {
            TokenKind::SelfClosingTag
        } else {
            TokenKind::StartTag
        };
        if kind == TokenKind::StartTag && RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
            self.raw_text_until = Some(name.clone());
        }
        Ok(MarkupToken::new(kind, start, start + end).named(name))
    }
}

impl Iterator for MarkupTokenizer<'_> {
    type Item = Result<MarkupToken>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.source.len() {
            return None;
        }

        if let Some(name) = self.raw_text_until.take() {
            let end = self.find_raw_text_end(&name);
            if end > self.pos {
                let token = MarkupToken::new(TokenKind::Text, self.pos, end);
                self.pos = end;
                return Some(Ok(token));
            }
        }

        if self.source.as_bytes()[self.pos] == b'<' && self.starts_markup(self.pos) {
            return match self.scan_markup() {
                Ok(token) => {
                    self.pos = token.span.end;
                    Some(Ok(token))
                }
                Err(err) => {
                    self.failed = true;
                    Some(Err(err))
                }
            };
        }

        let first = self.source[self.pos..].chars().next().map_or(1, char::len_utf8);
        let end = self.find_text_end(self.pos + first);
        let token = MarkupToken::new(TokenKind::Text, self.pos, end);
        self.pos = end;
        Some(Ok(token))
    }
}

/// Tokenize a whole markup string
pub fn tokenize_markup(source: &str) -> Result<Vec<MarkupToken>> {
    MarkupTokenizer::new(source).collect()
}

fn read_name(input: &str) -> String {
    input
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b':' | b'_' | b'.'))
        .map(|b| b.to_ascii_lowercase() as char)
        .collect()
}

/// Byte index just past the closing `>` of a start tag, honouring quoted
/// attribute values.
fn find_tag_end(tag: &str, from: usize) -> Option<usize> {
    let mut quote: Option<u8> = None;
    let mut after_eq = false;
    for (i, &b) in tag.as_bytes().iter().enumerate().skip(from) {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None => {
                if b == b'>' {
                    return Some(i + 1);
                }
                if after_eq && (b == b'"' || b == b'\'') {
                    quote = Some(b);
                    after_eq = false;
                    continue;
                }
                after_eq = b == b'=' || (after_eq && b.is_ascii_whitespace());
            }
        }
    }
    None
}

// ============================================================================
// Tag attributes
// ============================================================================

/// A parsed attribute; spans are relative to the tag's raw text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub name_span: CharSpan,
    /// Raw (undecoded) value
    pub value: Option<String>,
    pub value_span: Option<CharSpan>,
}

/// Name, kind and attributes of a tag token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagInfo {
    pub name: String,
    pub kind: TokenKind,
    pub attributes: Vec<Attribute>,
}

impl TagInfo {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Whether the `class` attribute contains `class` as a whole token
    pub fn has_class(&self, class: &str) -> bool {
        self.attribute("class")
            .and_then(|a| a.value.as_deref())
            .is_some_and(|v| v.split_ascii_whitespace().any(|c| c == class))
    }
}

/// Parse the raw text of a start, end or self-closing tag
pub fn parse_tag(raw: &str) -> Option<TagInfo> {
    if let Some(body) = raw.strip_prefix("</") {
        return Some(TagInfo {
            name: read_name(body),
            kind: TokenKind::EndTag,
            attributes: Vec::new(),
        });
    }
    let body = raw.strip_prefix('<')?;
    let name = read_name(body);
    if name.is_empty() {
        return None;
    }
    let kind = if raw.ends_with("/>") {
        TokenKind::SelfClosingTag
    } else {
        TokenKind::StartTag
    };

    let bytes = raw.as_bytes();
    let mut i = 1 + name.len();
    let mut attributes = Vec::new();

    loop {
        while i < bytes.len() && (bytes[i].is_ascii_whitespace() || bytes[i] == b'/') {
            i += 1;
        }
        if i >= bytes.len() || bytes[i] == b'>' {
            break;
        }

        let name_start = i;
        while i < bytes.len() && !matches!(bytes[i], b'=' | b'>' | b'/') && !bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        let name_span = CharSpan::new(name_start, i);

        let mut j = i;
        while j < bytes.len() && bytes[j].is_ascii_whitespace() {
            j += 1;
        }

        let mut value_span = None;
        if j < bytes.len() && bytes[j] == b'=' {
            j += 1;
            while j < bytes.len() && bytes[j].is_ascii_whitespace() {
                j += 1;
            }
            if j < bytes.len() && (bytes[j] == b'"' || bytes[j] == b'\'') {
                let quote = bytes[j];
                let value_start = j + 1;
                let mut k = value_start;
                while k < bytes.len() && bytes[k] != quote {
                    k += 1;
                }
                value_span = Some(CharSpan::new(value_start, k));
                i = (k + 1).min(bytes.len());
            } else {
                let value_start = j;
                let mut k = j;
                while k < bytes.len() && !bytes[k].is_ascii_whitespace() && bytes[k] != b'>' {
                    k += 1;
                }
                value_span = Some(CharSpan::new(value_start, k));
                i = k;
            }
        }

        attributes.push(Attribute {
            name: raw[name_span.start..name_span.end].to_ascii_lowercase(),
            name_span,
            value: value_span.map(|s| raw[s.start..s.end].to_string()),
            value_span,
        });
    }

    Some(TagInfo {
        name,
        kind,
        attributes,
    })
}

// ============================================================================
// Entities and text projection
// ============================================================================

/// Decoded text plus the map back to its raw form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    pub text: String,
    pub map: OffsetMap,
}

/// Decode character entities leniently.
///
/// Named (HTML5) and numeric entities terminated by `;` are decoded; anything
/// else, including a bare `&`, is kept literally.
pub fn decode_entities(raw: &str) -> DecodedText {
    let mut text = String::with_capacity(raw.len());
    let mut map = OffsetMap::new();
    let mut last = 0;
    let mut search = 0;

    while let Some(rel) = raw[search..].find('&') {
        let amp = search + rel;
        match entity_at(raw, amp) {
            Some((len, decoded)) => {
                text.push_str(&raw[last..amp]);
                map.push_literal(amp - last);
                text.push_str(&decoded);
                map.push_entity(len, decoded.len());
                last = amp + len;
                search = last;
            }
            None => search = amp + 1,
        }
    }

    text.push_str(&raw[last..]);
    map.push_literal(raw.len() - last);
    DecodedText { text, map }
}

fn entity_at(raw: &str, amp: usize) -> Option<(usize, String)> {
    let semi = raw[amp + 1..].find(';')?;
    if semi == 0 || semi > MAX_ENTITY_LEN {
        return None;
    }
    let body = &raw[amp + 1..amp + 1 + semi];
    if !body.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'#') {
        return None;
    }
    let candidate = &raw[amp..amp + semi + 2];
    let decoded = unescape_with(candidate, resolve_html5_entity).ok()?;
    Some((candidate.len(), decoded.into_owned()))
}

/// Plain-text projection of a tokenized fragment: tags dropped, entities
/// decoded, whitespace untouched.
pub fn project_text(source: &str, tokens: &[MarkupToken]) -> String {
    tokens
        .iter()
        .filter(|t| t.is_text())
        .map(|t| decode_entities(t.raw(source)).text)
        .collect()
}

/// Tokenize and project in one step
pub fn plain_text(source: &str) -> Result<String> {
    let tokens = tokenize_markup(source)?;
    Ok(project_text(source, &tokens))
}

/// Verify every opened element is closed in order.
///
/// Void elements and self-closing tags need no end tag.
pub fn check_balanced(source: &str, tokens: &[MarkupToken]) -> Result<()> {
    let mut stack: Vec<(&str, usize)> = Vec::new();
    for token in tokens {
        let Some(name) = token.name.as_deref() else {
            continue;
        };
        if VOID_ELEMENTS.contains(&name) {
            continue;
        }
        match token.kind {
            TokenKind::StartTag => stack.push((name, token.span.start)),
            TokenKind::EndTag => match stack.pop() {
                Some((open, _)) if open == name => {}
                _ => {
                    return Err(AnnotateError::malformed(
                        token.span.start,
                        format!("unexpected {}", token.raw(source)),
                    ))
                }
            },
            _ => {}
        }
    }
    match stack.pop() {
        Some((open, offset)) => Err(AnnotateError::malformed(offset, format!("unclosed <{open}>"))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize_markup(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_tag_text_alternation() {
        let source = "<p class=\"x\">Hello <em>big</em> world</p>";
        let tokens = tokenize_markup(source).unwrap();
        let raws: Vec<&str> = tokens.iter().map(|t| t.raw(source)).collect();
        assert_eq!(
            raws,
            vec!["<p class=\"x\">", "Hello ", "<em>", "big", "</em>", " world", "</p>"]
        );
        assert!(tokens[0].is_start_of("p"));
        assert!(tokens[6].is_end_of("p"));
    }

    #[test]
    fn test_quoted_gt_inside_attribute() {
        let source = "<a title=\"a > b\" href='x'>link</a>";
        let tokens = tokenize_markup(source).unwrap();
        assert_eq!(tokens[0].raw(source), "<a title=\"a > b\" href='x'>");
        assert_eq!(tokens[1].raw(source), "link");
    }

    #[test]
    fn test_comments_and_declarations() {
        assert_eq!(
            kinds("<!DOCTYPE html><!-- a > b --><p>x</p>"),
            vec![
                TokenKind::Declaration,
                TokenKind::Comment,
                TokenKind::StartTag,
                TokenKind::Text,
                TokenKind::EndTag
            ]
        );
    }

    #[test]
    fn test_lone_lt_is_text() {
        let source = "<p>a < b</p>";
        let tokens = tokenize_markup(source).unwrap();
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[1].raw(source), "a < b");
    }

    #[test]
    fn test_multibyte_text() {
        let source = "<p>été – ok</p>";
        let tokens = tokenize_markup(source).unwrap();
        assert_eq!(tokens[1].raw(source), "été – ok");
    }

    #[test]
    fn test_self_closing_and_void() {
        let source = "<p>a<br>b<img src=\"x.png\"/></p>";
        let tokens = tokenize_markup(source).unwrap();
        assert_eq!(tokens[2].kind, TokenKind::StartTag);
        assert_eq!(tokens[4].kind, TokenKind::SelfClosingTag);
        assert!(check_balanced(source, &tokens).is_ok());
    }

    #[test]
    fn test_script_body_is_raw_text() {
        let source = "<script>if (a < b && c > d) {}</script><p>x</p>";
        let tokens = tokenize_markup(source).unwrap();
        assert_eq!(tokens[1].raw(source), "if (a < b && c > d) {}");
        assert!(tokens[2].is_end_of("script"));
    }

    #[test]
    fn test_unterminated_tag_is_malformed() {
        let err = tokenize_markup("<p>text</p><a href=\"x").unwrap_err();
        assert!(err.is_malformed_markup());
    }

    #[test]
    fn test_unbalanced_tags() {
        let source = "<p><em>x</p>";
        let tokens = tokenize_markup(source).unwrap();
        assert!(check_balanced(source, &tokens).is_err());

        let source = "<p>x";
        let tokens = tokenize_markup(source).unwrap();
        assert!(check_balanced(source, &tokens).is_err());
    }

    #[test]
    fn test_parse_tag_attributes() {
        let tag = parse_tag("<a class=\"nav link\" href=x.html data-flag>").unwrap();
        assert_eq!(tag.name, "a");
        assert_eq!(tag.kind, TokenKind::StartTag);
        assert!(tag.has_class("link"));
        assert!(!tag.has_class("nav link"));
        assert_eq!(tag.attribute("href").unwrap().value.as_deref(), Some("x.html"));
        assert_eq!(tag.attribute("data-flag").unwrap().value, None);

        let class = tag.attribute("class").unwrap();
        let span = class.value_span.unwrap();
        assert_eq!(&"<a class=\"nav link\" href=x.html data-flag>"[span.start..span.end], "nav link");
    }

    #[test]
    fn test_parse_end_tag() {
        let tag = parse_tag("</LI>").unwrap();
        assert_eq!(tag.name, "li");
        assert_eq!(tag.kind, TokenKind::EndTag);
    }

    #[test]
    fn test_decode_entities() {
        let decoded = decode_entities("AT&amp;T &eacute;t&#233; &#x41; &bogus; a & b");
        assert_eq!(decoded.text, "AT&T été A &bogus; a & b");
        assert_eq!(decoded.map.raw_len(), "AT&amp;T &eacute;t&#233; &#x41; &bogus; a & b".len());
        assert_eq!(decoded.map.plain_len(), decoded.text.len());
    }

    #[test]
    fn test_decode_nbsp() {
        let decoded = decode_entities("a&nbsp;b");
        assert_eq!(decoded.text, "a\u{a0}b");
    }

    #[test]
    fn test_project_text() {
        let text = plain_text("<p>Fish &amp; <b>chips</b>\n</p>").unwrap();
        assert_eq!(text, "Fish & chips\n");
    }
}
