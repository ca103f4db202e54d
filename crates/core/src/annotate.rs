//! Markup-preserving annotator
//!
//! Change ranges are measured over a unit's plain-text projection. The
//! annotator walks the unit's markup tokens, advancing a plain-text offset
//! over text tokens only, and wraps every overlapping sub-span of a text token
//! in a marker element. Tags are copied byte for byte and markers never cross
//! a tag boundary, so balanced input stays balanced.
//!
//! The plain offset is measured with [`decode_entities`], the same codec used
//! at extraction time; everything downstream depends on the two agreeing.

use crate::config::{AnnotateConfig, MarkerClasses};
use crate::diff::{ChangeKind, ChangeRange};
use crate::error::Result;
use crate::mapping::CharSpan;
use crate::markup::{
    check_balanced, decode_entities, parse_tag, tokenize_markup, TokenKind, RAW_TEXT_ELEMENTS,
};
use quick_xml::escape::escape;

/// Prefix of the provenance tooltip on modified markers
const PROVENANCE_PREFIX: &str = "Modified from: ";

/// Inserts change markers into unit markup
#[derive(Debug, Clone, PartialEq)]
pub struct Annotator {
    markers: MarkerClasses,
    emit_provenance: bool,
}

impl Default for Annotator {
    fn default() -> Self {
        Self::new(MarkerClasses::default())
    }
}

impl Annotator {
    pub fn new(markers: MarkerClasses) -> Self {
        Self {
            markers,
            emit_provenance: true,
        }
    }

    pub fn from_config(config: &AnnotateConfig) -> Self {
        Self::new(config.markers.clone()).with_provenance(config.emit_provenance)
    }

    pub fn with_provenance(mut self, emit: bool) -> Self {
        self.emit_provenance = emit;
        self
    }

    pub fn markers(&self) -> &MarkerClasses {
        &self.markers
    }

    /// Wrap the parts of `unit_markup` covered by `ranges`.
    ///
    /// `ranges` must be sorted and disjoint. Fails with `MalformedMarkup`
    /// when the unit cannot be tokenized or its tags do not pair up; the
    /// caller is expected to fall back to the unannotated markup.
    pub fn annotate(&self, unit_markup: &str, ranges: &[ChangeRange]) -> Result<String> {
        let tokens = tokenize_markup(unit_markup)?;
        check_balanced(unit_markup, &tokens)?;

        let mut out = String::with_capacity(unit_markup.len() + ranges.len() * 48);
        let mut plain_offset = 0;
        let mut raw_text_body = false;

        for token in &tokens {
            let raw = token.raw(unit_markup);
            if token.kind != TokenKind::Text {
                raw_text_body = token.kind == TokenKind::StartTag
                    && token.name.as_deref().is_some_and(|n| RAW_TEXT_ELEMENTS.contains(&n));
                out.push_str(raw);
                continue;
            }

            let decoded = decode_entities(raw);
            let token_span = CharSpan::new(plain_offset, plain_offset + decoded.text.len());
            plain_offset = token_span.end;

            if raw_text_body {
                out.push_str(raw);
                continue;
            }

            let mut cursor = 0;
            for range in ranges {
                if range.span.start >= token_span.end {
                    break;
                }
                let Some(overlap) = range.span.intersection(&token_span) else {
                    continue;
                };
                let local = overlap.relative_to(token_span.start);
                let Some(local) = trim_whitespace(&decoded.text, local) else {
                    continue;
                };

                let wrapped = decoded.map.map_span_to_raw(local);
                let start = wrapped.start.max(cursor);
                if start >= wrapped.end {
                    continue;
                }
                out.push_str(&raw[cursor..start]);
                out.push_str(&self.open_marker(range));
                out.push_str(&raw[start..wrapped.end]);
                out.push_str(&self.close_marker());
                cursor = wrapped.end;
            }
            out.push_str(&raw[cursor..]);
        }

        Ok(out)
    }

    /// Wrap a whole unit's inner content as an added element, keeping its
    /// own start and end tag outside the marker.
    pub fn wrap_whole(&self, unit_markup: &str) -> Result<String> {
        let tokens = tokenize_markup(unit_markup)?;
        check_balanced(unit_markup, &tokens)?;

        let (first, last) = match (tokens.first(), tokens.last()) {
            (Some(first), Some(last)) if tokens.len() >= 2 && first.kind == TokenKind::StartTag => {
                (first, last)
            }
            _ => {
                return Err(crate::error::AnnotateError::malformed(
                    0,
                    "unit is not a single element",
                ))
            }
        };

        let open = first.span.end;
        let close = last.span.start;
        Ok(format!(
            "{}<{} class=\"{}\">{}{}{}",
            &unit_markup[..open],
            self.markers.tag,
            self.markers.added_element,
            &unit_markup[open..close],
            self.close_marker(),
            &unit_markup[close..]
        ))
    }

    fn open_marker(&self, range: &ChangeRange) -> String {
        match (range.kind, &range.previous) {
            (ChangeKind::Modified, Some(previous)) if self.emit_provenance => format!(
                "<{} class=\"{}\" title=\"{}{}\">",
                self.markers.tag,
                self.markers.modified_text,
                PROVENANCE_PREFIX,
                escape(previous.as_str())
            ),
            (ChangeKind::Modified, _) => {
                format!("<{} class=\"{}\">", self.markers.tag, self.markers.modified_text)
            }
            (ChangeKind::Added, _) => {
                format!("<{} class=\"{}\">", self.markers.tag, self.markers.added_text)
            }
        }
    }

    fn close_marker(&self) -> String {
        format!("</{}>", self.markers.tag)
    }
}

/// Shrink `span` of `text` past leading and trailing whitespace; `None` when
/// nothing but whitespace is left.
fn trim_whitespace(text: &str, span: CharSpan) -> Option<CharSpan> {
    let slice = text.get(span.start..span.end)?;
    let trimmed_start = slice.trim_start();
    if trimmed_start.is_empty() {
        return None;
    }
    let start = span.start + (slice.len() - trimmed_start.len());
    let end = span.end - (slice.len() - slice.trim_end().len());
    Some(CharSpan::new(start, end))
}

/// Remove the engine's marker elements, keeping their content.
///
/// Only marker elements whose `class` carries one of the configured marker
/// classes are removed; other elements with the same tag name survive.
pub fn strip_markers(markup: &str, markers: &MarkerClasses) -> Result<String> {
    let tokens = tokenize_markup(markup)?;
    let mut out = String::with_capacity(markup.len());
    let mut open: Vec<bool> = Vec::new();

    for token in &tokens {
        let raw = token.raw(markup);
        let is_marker_tag = token.name.as_deref() == Some(markers.tag.as_str());

        match token.kind {
            TokenKind::StartTag if is_marker_tag => {
                let engine = parse_tag(raw).is_some_and(|tag| {
                    tag.attribute("class")
                        .and_then(|a| a.value.as_deref())
                        .is_some_and(|v| v.split_ascii_whitespace().any(|c| markers.is_marker_class(c)))
                });
                open.push(engine);
                if !engine {
                    out.push_str(raw);
                }
            }
            TokenKind::EndTag if is_marker_tag => {
                if !open.pop().unwrap_or(false) {
                    out.push_str(raw);
                }
            }
            _ => out.push_str(raw),
        }
    }

    Ok(out)
}
