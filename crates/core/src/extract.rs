//! Content unit extraction
//!
//! A content unit is the outermost element whose tag is on the comparable
//! whitelist, from its start tag to the matching end tag. Scanning is greedy
//! and left to right, so comparable elements nested inside a unit are never
//! extracted on their own.

use crate::config::Anchor;
use crate::error::Result;
use crate::mapping::CharSpan;
use crate::markup::{parse_tag, project_text, tokenize_markup, MarkupToken, TokenKind};
use std::ops::Range;

/// A comparable block of one document version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentUnit {
    /// Position among the units of its document
    pub ordinal: usize,
    /// Lowercase tag name
    pub tag: String,
    /// Byte span of the whole element in the document
    pub span: CharSpan,
    /// Raw markup of the element
    pub markup: String,
    /// Plain-text projection: tags stripped, entities decoded
    pub text: String,
}

impl ContentUnit {
    /// A unit with no visible text never takes part in matching
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Projection without surrounding whitespace, used for similarity
    pub fn comparable_text(&self) -> &str {
        self.text.trim()
    }
}

/// A tokenized markup document
#[derive(Debug, Clone)]
pub struct ParsedMarkup<'a> {
    source: &'a str,
    tokens: Vec<MarkupToken>,
}

impl<'a> ParsedMarkup<'a> {
    pub fn parse(source: &'a str) -> Result<Self> {
        Ok(Self {
            source,
            tokens: tokenize_markup(source)?,
        })
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn tokens(&self) -> &[MarkupToken] {
        &self.tokens
    }

    /// Index of the end tag closing the start tag at `open`, counting
    /// nested elements of the same name.
    pub(crate) fn matching_end(&self, open: usize) -> Option<usize> {
        let name = self.tokens[open].name.as_deref()?;
        let mut depth = 0usize;
        for (idx, token) in self.tokens.iter().enumerate().skip(open + 1) {
            if token.is_start_of(name) {
                depth += 1;
            } else if token.is_end_of(name) {
                if depth == 0 {
                    return Some(idx);
                }
                depth -= 1;
            }
        }
        None
    }

    /// Byte range of the main content: the inside of the first element
    /// matching an anchor, or the whole document when none does.
    pub fn content_region(&self, anchors: &[Anchor]) -> Range<usize> {
        for anchor in anchors {
            let found = self.tokens.iter().enumerate().find(|(_, token)| {
                token.is_start_of(&anchor.tag)
                    && parse_tag(token.raw(self.source)).is_some_and(|tag| anchor.matches(&tag))
            });
            if let Some((open, start)) = found {
                if let Some(close) = self.matching_end(open) {
                    return start.span.end..self.tokens[close].span.start;
                }
                tracing::debug!(anchor = %anchor, "anchor element is never closed");
            }
        }
        0..self.source.len()
    }

    /// Extract comparable units inside `region`, in document order
    pub fn units<F>(&self, region: Range<usize>, is_comparable: F) -> Vec<ContentUnit>
    where
        F: Fn(&str) -> bool,
    {
        let mut units = Vec::new();
        let mut idx = 0;

        while idx < self.tokens.len() {
            let token = &self.tokens[idx];
            let inside = token.span.start >= region.start && token.span.end <= region.end;
            let candidate = inside
                && token.kind == TokenKind::StartTag
                && token.name.as_deref().is_some_and(&is_comparable);

            if !candidate {
                idx += 1;
                continue;
            }

            match self.matching_end(idx) {
                Some(close) if self.tokens[close].span.end <= region.end => {
                    let span = CharSpan::new(token.span.start, self.tokens[close].span.end);
                    units.push(ContentUnit {
                        ordinal: units.len(),
                        tag: token.name.clone().unwrap_or_default(),
                        span,
                        markup: self.source[span.start..span.end].to_string(),
                        text: project_text(self.source, &self.tokens[idx..=close]),
                    });
                    idx = close + 1;
                }
                _ => {
                    tracing::debug!(offset = token.span.start, tag = ?token.name, "unit start tag has no end tag");
                    idx += 1;
                }
            }
        }

        units
    }
}

/// Convenience wrapper: parse, locate the content region and extract units
pub fn extract_units(source: &str, anchors: &[Anchor], tags: &[String]) -> Result<Vec<ContentUnit>> {
    let parsed = ParsedMarkup::parse(source)?;
    let region = parsed.content_region(anchors);
    Ok(parsed.units(region, |name| tags.iter().any(|t| t.eq_ignore_ascii_case(name))))
}
