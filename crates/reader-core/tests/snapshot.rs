use pretty_assertions::assert_eq;
use reader_core::{
    AnnotationSources, DecoderConfig, FileId, LineIndex, LineSnapshot, ResolvedStyle, Rgb,
    SourceView, Theme, ThemeRule,
};
use serde_json::json;

fn view(lines: &[&str], link: serde_json::Value, semantics: serde_json::Value) -> SourceView {
    let sources = AnnotationSources {
        link: Some(&link),
        semantics: Some(&semantics),
        ..Default::default()
    };
    SourceView::new(
        LineIndex::from_lines(lines),
        DecoderConfig::default(),
        &sources,
    )
}

fn texts(snapshot: &LineSnapshot) -> Vec<&str> {
    snapshot.spans.iter().map(|span| span.text.as_str()).collect()
}

#[test]
fn test_line_is_split_at_mark_boundaries() {
    let view = view(
        &["if (x) return;"],
        json!([]),
        json!([1, 1, 1, 3, "KEYWORD", "if", 1, 8, 1, 14, "KEYWORD", "return"]),
    );

    let snapshot = LineSnapshot::build(view.line_index(), view.decorations(), 1).unwrap();
    assert_eq!(texts(&snapshot), vec!["if", " (x) ", "return", ";"]);
    assert_eq!(snapshot.spans[0].classes, vec!["semantics", "KEYWORD", "if"]);
    assert!(snapshot.spans[1].classes.is_empty());
    assert_eq!(snapshot.spans[2].column, 7);
}

#[test]
fn test_overlapping_marks_compose_outer_first() {
    let view = view(
        &["#if 0", "int x;", "#endif"],
        json!([]),
        json!([1, 1, 3, 7, "INACTIVE", null, 2, 1, 2, 4, "KEYWORD", "int"]),
    );

    let snapshot = LineSnapshot::build(view.line_index(), view.decorations(), 2).unwrap();
    assert_eq!(texts(&snapshot), vec!["int", " x;"]);
    assert_eq!(
        snapshot.spans[0].classes,
        vec!["semantics", "INACTIVE", "KEYWORD", "int"]
    );
    assert_eq!(snapshot.spans[1].classes, vec!["semantics", "INACTIVE"]);
    assert!(snapshot.spans[0].has_class("INACTIVE"));
}

#[test]
fn test_link_spans_carry_target() {
    let view = view(
        &["#include <a.h>"],
        json!([1, 10, 1, 15, 4]),
        json!([1, 10, 1, 15, "header_name", null]),
    );

    let snapshot = LineSnapshot::build(view.line_index(), view.decorations(), 1).unwrap();
    assert_eq!(texts(&snapshot), vec!["#include ", "<a.h>"]);
    assert_eq!(snapshot.spans[0].link, None);
    assert_eq!(snapshot.spans[1].link, Some(FileId(4)));
}

#[test]
fn test_empty_and_missing_rows() {
    let view = view(&["a", ""], json!([]), json!([]));
    let snapshot = LineSnapshot::build(view.line_index(), view.decorations(), 2).unwrap();
    assert!(snapshot.spans.is_empty());
    assert!(LineSnapshot::build(view.line_index(), view.decorations(), 3).is_none());
}

#[test]
fn test_default_theme_resolves_compound_selectors() {
    let theme = Theme::default();

    let keyword = theme.resolve(&["semantics", "KEYWORD"]);
    assert_eq!(keyword.color, Some(Rgb { r: 0, g: 0, b: 0xff }));

    let flow = theme.resolve(&["semantics", "KEYWORD", "if"]);
    assert_eq!(flow.color, Some(Rgb { r: 0x8f, g: 0x08, b: 0xc4 }));

    // `.KEYWORD.if` is more specific than the later `.INACTIVE`.
    let inactive_if = theme.resolve(&["semantics", "INACTIVE", "KEYWORD", "if"]);
    assert_eq!(inactive_if.color, Some(Rgb { r: 0x8f, g: 0x08, b: 0xc4 }));

    // Same specificity: the later rule wins.
    let inactive_keyword = theme.resolve(&["semantics", "KEYWORD", "INACTIVE"]);
    assert_eq!(
        inactive_keyword.color,
        Some(Rgb { r: 0xe5, g: 0xeb, b: 0xf1 })
    );

    let expansion = theme.resolve(&["semantics", "EXPANSION"]);
    assert!(expansion.underline && expansion.dotted);
    assert_eq!(expansion.color, None);

    let header = theme.resolve(&["semantics", "header_name"]);
    assert!(header.underline && !header.dotted);
}

#[test]
fn test_theme_css_and_json() {
    let theme = Theme::new(vec![ThemeRule::new(
        ".EXPANSION",
        &[("textDecorationStyle", "dotted"), ("color", "#000")],
    )]);
    assert_eq!(
        theme.to_css(),
        ".EXPANSION { color: #000; text-decoration-style: dotted; }\n"
    );

    let parsed: Theme = serde_json::from_value(json!({
        "rules": [{ "selector": ".TOKEN", "declarations": { "fontWeight": "bold" } }]
    }))
    .unwrap();
    assert!(parsed.resolve(&["TOKEN"]).bold);
    assert!(Theme::default().to_css().contains(".link::before {"));
}

#[test]
fn test_default_theme_quotes_link_path() {
    let css = Theme::default().to_css();
    assert!(css.contains(
        ".link .file { color: #A31515; font-weight: bold; quotes: '\"' '\"'; }\n"
    ));
    assert!(css.contains(".link .file::before { content: open-quote; }\n"));
    assert!(css.contains(".link .file::after { content: close-quote; }\n"));

    // Descendant and pseudo-element rules only apply to DOM hosts.
    let file = Theme::default().resolve(&["link", "file"]);
    assert_eq!(file, ResolvedStyle::default());
}
