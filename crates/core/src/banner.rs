//! Change notice placement
//!
//! A page template may reserve a spot for the notice with a placeholder
//! element; otherwise the notice goes right after the content anchor's start
//! tag. Besides the per-page notice there is an index notice that links
//! every changed page from the home page of a build.

use crate::config::{AnnotateConfig, Anchor, MarkerClasses};
use crate::engine::ChangeSummary;
use crate::extract::ParsedMarkup;
use crate::markup::{parse_tag, TokenKind};
use quick_xml::escape::escape;

/// Class of the placeholder element reserved by page templates
pub const PLACEHOLDER_CLASS: &str = "preview-changed-banner";

/// Text the placeholder element must contain
pub const PLACEHOLDER_TEXT: &str = "PREVIEW_BANNER_PLACEHOLDER";

/// Places a rendered notice into a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BannerInjector {
    anchors: Vec<Anchor>,
    placeholder_class: String,
    placeholder_text: String,
}

impl Default for BannerInjector {
    fn default() -> Self {
        Self::from_config(&AnnotateConfig::default())
    }
}

impl BannerInjector {
    pub fn new(anchors: Vec<Anchor>) -> Self {
        Self {
            anchors,
            placeholder_class: PLACEHOLDER_CLASS.to_string(),
            placeholder_text: PLACEHOLDER_TEXT.to_string(),
        }
    }

    pub fn from_config(config: &AnnotateConfig) -> Self {
        Self::new(config.content_anchors.clone())
    }

    /// Insert `notice` into `markup`.
    ///
    /// Replaces the first placeholder element if there is one, otherwise
    /// inserts after the first content anchor's start tag. Markup with
    /// neither, or markup that cannot be tokenized, is returned unchanged.
    pub fn inject(&self, markup: &str, notice: &str) -> String {
        let parsed = match ParsedMarkup::parse(markup) {
            Ok(parsed) => parsed,
            Err(err) => {
                tracing::warn!(error = %err, "cannot place notice in malformed markup");
                return markup.to_string();
            }
        };

        if let Some((start, end)) = self.placeholder(&parsed) {
            return format!("{}{}{}", &markup[..start], notice, &markup[end..]);
        }

        for anchor in &self.anchors {
            let found = parsed.tokens().iter().find(|t| {
                t.kind == TokenKind::StartTag && parse_tag(t.raw(markup)).is_some_and(|tag| anchor.matches(&tag))
            });
            if let Some(token) = found {
                let at = token.span.end;
                return format!("{}{}{}", &markup[..at], notice, &markup[at..]);
            }
        }

        tracing::debug!("no placeholder or content anchor for notice");
        markup.to_string()
    }

    /// Byte range of the first placeholder element
    fn placeholder(&self, parsed: &ParsedMarkup<'_>) -> Option<(usize, usize)> {
        let source = parsed.source();
        let tokens = parsed.tokens();
        tokens.iter().enumerate().find_map(|(idx, token)| {
            let is_candidate = token.is_start_of("div")
                && parse_tag(token.raw(source)).is_some_and(|tag| tag.has_class(&self.placeholder_class));
            if !is_candidate {
                return None;
            }
            let close = parsed.matching_end(idx)?;
            let inner = &source[token.span.end..tokens[close].span.start];
            inner
                .contains(self.placeholder_text.as_str())
                .then(|| (token.span.start, tokens[close].span.end))
        })
    }
}

/// Default notice for a changed document, keyed on the marker classes
pub fn render_notice(summary: &ChangeSummary, markers: &MarkerClasses) -> String {
    let headline = if summary.first_publish {
        "This page is new in this revision.".to_string()
    } else {
        format!(
            "This page has been modified in this revision (~{}% of content changed, {} changed {}).",
            summary.change_percent(),
            summary.changed_unit_count,
            if summary.changed_unit_count == 1 { "block" } else { "blocks" }
        )
    };
    let tag = &markers.tag;
    format!(
        "<div class=\"revision-notice\"><p><strong>Changes:</strong> {headline} \
         <{tag} class=\"{}\">Modified text</{tag}>, \
         <{tag} class=\"{}\">added text</{tag}> and \
         <{tag} class=\"{}\">new sections</{tag}> are highlighted.</p></div>",
        markers.modified_text, markers.added_text, markers.added_element,
    )
}

/// Link to one changed page in the index notice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLink {
    /// Page identifier; the link target is `{id}.html`
    pub id: String,
    pub title: String,
}

impl PageLink {
    /// Link titled by the page's first `h1`, or by its identifier
    pub fn from_page(id: impl Into<String>, markup: &str) -> Self {
        let id = id.into();
        let title = page_title(markup).unwrap_or_else(|| id.clone());
        Self { id, title }
    }
}

/// Whitespace-collapsed text of the first `h1` element
pub fn page_title(markup: &str) -> Option<String> {
    let parsed = ParsedMarkup::parse(markup).ok()?;
    let heading = parsed.units(0..markup.len(), |name| name == "h1").into_iter().next()?;
    let title = heading.text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!title.is_empty()).then_some(title)
}

/// Notice for the home page of a build, linking every changed page
pub fn render_index_notice(links: &[PageLink]) -> String {
    let body = if links.is_empty() {
        "No changes were detected in this revision.".to_string()
    } else {
        let links = links
            .iter()
            .map(|link| format!("<a href=\"{}.html\">{}</a>", escape(link.id.as_str()), escape(link.title.as_str())))
            .collect::<Vec<_>>()
            .join(", ");
        format!("The following pages have been modified: {links}")
    };
    format!("<div class=\"revision-index-notice\"><p><strong>Changes:</strong> {body}</p></div>")
}
