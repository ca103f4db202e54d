//! Navigation reference flagging
//!
//! Marks links in a navigation document whose target is one of the changed
//! documents. This is a membership check on link targets; no text is diffed.

use crate::config::AnnotateConfig;
use crate::markup::{decode_entities, parse_tag, tokenize_markup, Attribute, TokenKind};
use std::collections::BTreeSet;

/// Appends a class token to links that point at changed documents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceFlagger {
    class: String,
    link_tags: Vec<String>,
}

impl Default for ReferenceFlagger {
    fn default() -> Self {
        Self::from_config(&AnnotateConfig::default())
    }
}

impl ReferenceFlagger {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            link_tags: vec!["a".to_string()],
        }
    }

    pub fn from_config(config: &AnnotateConfig) -> Self {
        Self {
            class: config.reference_class.clone(),
            link_tags: config.link_tags.iter().map(|t| t.to_ascii_lowercase()).collect(),
        }
    }

    /// Flag every link in `navigation` targeting an identifier in `changed`.
    ///
    /// Markup that cannot be tokenized is returned unchanged.
    pub fn flag(&self, navigation: &str, changed: &BTreeSet<String>) -> String {
        let tokens = match tokenize_markup(navigation) {
            Ok(tokens) => tokens,
            Err(err) => {
                tracing::warn!(error = %err, "navigation markup is malformed, left unflagged");
                return navigation.to_string();
            }
        };

        let mut out = String::with_capacity(navigation.len() + changed.len() * (self.class.len() + 9));
        let mut flagged = 0usize;

        for token in &tokens {
            let raw = token.raw(navigation);
            let is_link = matches!(token.kind, TokenKind::StartTag | TokenKind::SelfClosingTag)
                && token.name.as_deref().is_some_and(|n| self.link_tags.iter().any(|t| t == n));

            match is_link.then(|| self.flag_tag(raw, changed)).flatten() {
                Some(rewritten) => {
                    flagged += 1;
                    out.push_str(&rewritten);
                }
                None => out.push_str(raw),
            }
        }

        tracing::debug!(flagged, identifiers = changed.len(), "navigation references flagged");
        out
    }

    /// Rewritten tag when it targets a changed identifier and lacks the class
    fn flag_tag(&self, raw: &str, changed: &BTreeSet<String>) -> Option<String> {
        let tag = parse_tag(raw)?;
        let href = tag.attribute("href")?.value.as_deref()?;
        if !targets_any(href, changed) || tag.has_class(&self.class) {
            return None;
        }
        Some(match tag.attribute("class") {
            Some(class) => self.extend_class(raw, class),
            None => {
                let at = if raw.ends_with("/>") { raw.len() - 2 } else { raw.len() - 1 };
                let before = raw[..at].trim_end();
                format!("{} class=\"{}\"{}", before, self.class, &raw[at..])
            }
        })
    }

    fn extend_class(&self, raw: &str, class: &Attribute) -> String {
        let Some(span) = class.value_span else {
            let end = class.name_span.end;
            return format!("{}=\"{}\"{}", &raw[..end], self.class, &raw[end..]);
        };
        let value = &raw[span.start..span.end];
        let quoted = span.start > 0 && matches!(raw.as_bytes()[span.start - 1], b'"' | b'\'');

        let joined = if value.trim().is_empty() {
            self.class.clone()
        } else {
            format!("{} {}", value.trim_end(), self.class)
        };
        if quoted {
            format!("{}{}{}", &raw[..span.start], joined, &raw[span.end..])
        } else {
            format!("{}\"{}\"{}", &raw[..span.start], joined, &raw[span.end..])
        }
    }
}

/// Final path segment of a link target, query and fragment removed
pub fn target_name(href: &str) -> String {
    let decoded = decode_entities(href).text;
    let path = decoded.split(['?', '#']).next().unwrap_or_default();
    path.trim_end_matches('/').rsplit('/').next().unwrap_or_default().to_string()
}

fn targets_any(href: &str, changed: &BTreeSet<String>) -> bool {
    let name = target_name(href);
    if name.is_empty() {
        return false;
    }
    changed.contains(&name)
        || name
            .strip_suffix(".html")
            .is_some_and(|stem| changed.contains(stem))
}
