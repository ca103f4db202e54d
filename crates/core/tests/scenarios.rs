//! End-to-end annotation scenarios

use revmark_core::annotate::strip_markers;
use revmark_core::{
    annotate_document, AnnotateConfig, AnnotationEngine, ChangeKind, DiffAlgorithm, MarkerClasses,
};

#[test]
fn test_scenario_a_modified_word() {
    let doc = annotate_document(Some("<p>The cat sat.</p>"), "<p>The cat slept.</p>", None);

    assert_eq!(doc.summary.changed_unit_count, 1);
    assert_eq!(doc.summary.changes[0].kind, ChangeKind::Modified);
    assert_eq!(doc.summary.changes[0].highlighted_ranges, 1);
    assert!(doc
        .markup
        .contains(">slept.</mark></p>"));
    assert!(doc.markup.starts_with("<p>The cat <mark class=\"modified-text\""));
}

#[test]
fn test_scenario_b_added_paragraph() {
    let doc = annotate_document(Some("<p>Hello.</p>"), "<p>Hello.</p><p>World.</p>", None);

    assert_eq!(doc.summary.changed_unit_count, 1);
    assert_eq!(
        doc.markup,
        "<p>Hello.</p><p><mark class=\"added-element\">World.</mark></p>"
    );
}

#[test]
fn test_scenario_c_first_publish() {
    let doc = annotate_document(None, "<p>Brand new page.</p>", None);

    assert_eq!(doc.summary.similarity_ratio, 0.0);
    assert_eq!(doc.summary.changed_unit_count, 1);
    assert_eq!(doc.summary.changes[0].kind, ChangeKind::Added);
    assert_eq!(doc.markup, "<p><mark class=\"added-element\">Brand new page.</mark></p>");
}

#[test]
fn test_scenario_d_identical() {
    let markup = "<p>A quick brown fox.</p>";
    let doc = annotate_document(Some(markup), markup, None);

    assert_eq!(doc.summary.changed_unit_count, 0);
    assert_eq!(doc.summary.similarity_ratio, 1.0);
    assert_eq!(doc.markup, markup);
}

const OLD_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Chapter 2</title><style>p > em { color: red; }</style></head>
<body>
<nav><ul><li><a href="ch01.html">One</a></li><li><a href="ch02.html">Two</a></li></ul></nav>
<main>
<h1>Chapter 2: Methods</h1>
<p>We surveyed <em>forty</em> households in the region.</p>
<p>Responses were coded by two reviewers.</p>
<blockquote><p>It was a long winter.</p></blockquote>
<p>Results follow in the next chapter.</p>
</main>
</body>
</html>
"#;

const NEW_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Chapter 2</title><style>p > em { color: red; }</style></head>
<body>
<nav><ul><li><a href="ch01.html">One</a></li><li><a href="ch02.html">Two</a></li></ul></nav>
<main>
<h1>Chapter 2: Methods</h1>
<p>We surveyed <em>sixty</em> households in the region.</p>
<!-- reviewer note -->
<p>Responses were coded by two reviewers.</p>
<p>Each interview lasted about an hour &amp; was recorded.</p>
<blockquote><p>It was a long winter.</p></blockquote>
<p>Results follow in the next chapter.</p>
</main>
</body>
</html>
"#;

#[test]
fn test_full_page() {
    let engine = AnnotationEngine::default_config();
    let doc = engine.annotate(Some(OLD_PAGE), NEW_PAGE);

    assert_eq!(doc.summary.changed_unit_count, 2);
    assert!(doc.summary.similarity_ratio > 0.5 && doc.summary.similarity_ratio < 1.0);
    assert!(doc.markup.contains(
        "<em><mark class=\"modified-text\" title=\"Modified from: forty\">sixty</mark></em>"
    ));
    assert!(doc.markup.contains(
        "<p><mark class=\"added-element\">Each interview lasted about an hour &amp; was recorded.</mark></p>"
    ));
    // head, navigation and comments are untouched
    assert!(doc.markup.starts_with(&NEW_PAGE[..NEW_PAGE.find("<main>").unwrap_or(0)]));
    assert!(doc.markup.contains("<!-- reviewer note -->"));

    let stripped = strip_markers(&doc.markup, &engine.config().markers).unwrap();
    assert_eq!(stripped, NEW_PAGE);
}

#[test]
fn test_deleted_paragraph_is_not_marked() {
    let old = "<main><p>Keep this one.</p><p>Drop this one entirely please.</p></main>";
    let new = "<main><p>Keep this one.</p></main>";
    let doc = annotate_document(Some(old), new, None);

    assert_eq!(doc.summary.changed_unit_count, 0);
    assert_eq!(doc.markup, new);
    assert!(doc.summary.similarity_ratio < 1.0);
}

#[test]
fn test_custom_markers_and_algorithm() {
    let config = AnnotateConfig::default()
        .with_algorithm(DiffAlgorithm::Lcs)
        .with_provenance(false)
        .with_markers(MarkerClasses {
            tag: "span".to_string(),
            modified_text: "chg".to_string(),
            added_text: "ins".to_string(),
            added_element: "new-block".to_string(),
        });
    let doc = annotate_document(
        Some("<li>alpha beta gamma</li>"),
        "<li>alpha delta gamma epsilon</li>",
        Some(config),
    );

    assert_eq!(
        doc.markup,
        "<li>alpha <span class=\"chg\">delta</span> gamma <span class=\"ins\">epsilon</span></li>"
    );
}

#[test]
fn test_whitespace_only_change_counts_as_edit() {
    let doc = annotate_document(
        Some("<p>one two three four five six seven</p>"),
        "<p>one two  three four five six seven</p>",
        None,
    );

    // the doubled space is a token edit, but whitespace is never wrapped
    assert_eq!(doc.summary.changed_unit_count, 1);
    assert_eq!(doc.markup, "<p>one two  three four five six seven</p>");
}

#[test]
fn test_config_from_toml() {
    let config = AnnotateConfig::from_toml_str(
        r#"
        comparable_tags = ["p", "dd"]
        content_anchors = ["article"]
        "#,
    )
    .unwrap();
    let doc = annotate_document(
        Some("<p>outside</p><article><dd>Old term text</dd></article>"),
        "<p>outside changed</p><article><dd>Old term text</dd><dd>Fresh entry</dd></article>",
        Some(config),
    );

    assert_eq!(doc.summary.changed_unit_count, 1);
    assert!(doc.markup.starts_with("<p>outside changed</p>"));
    assert!(doc.markup.contains("<dd><mark class=\"added-element\">Fresh entry</mark></dd>"));
}
