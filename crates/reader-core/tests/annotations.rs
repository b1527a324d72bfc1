use pretty_assertions::assert_eq;
use reader_core::{
    AnnotationKind, AnnotationSources, Annotations, ColumnEncoding, DecodeError, DecodedRange,
    Decoder, ElaboratedType, FileId, LineIndex, LinkTarget, Malformed, SemanticClass,
};
use serde_json::{Value, json};

fn array(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        other => panic!("expected array, got {other}"),
    }
}

#[test]
fn test_link_tuple_resolves_to_offsets() {
    let index = LineIndex::from_lines(["#include <stdio.h>"]);
    let data = array(json!([1, 1, 1, 5, 42]));

    let links = Decoder::new(&index).links(&data).unwrap();
    assert_eq!(
        links,
        vec![DecodedRange::new(0, 4, LinkTarget { file: FileId(42) })]
    );
}

#[test]
fn test_keyword_semantics_range() {
    let index = LineIndex::from_lines(["if (x)"]);
    let data = array(json!([1, 1, 1, 4, "KEYWORD", "if"]));

    let semantics = Decoder::new(&index).semantics(&data).unwrap();
    assert_eq!(semantics.len(), 1);
    assert_eq!((semantics[0].from, semantics[0].to), (0, 3));
    assert_eq!(semantics[0].payload.class_attr(), "semantics KEYWORD if");
}

#[test]
fn test_semantics_without_sub_kind() {
    let index = LineIndex::from_lines(["x = 1;"]);
    let data = array(json!([1, 1, 1, 2, "IDENTIFIER", null, 1, 5, 1, 6, "LITERAL", ""]));

    let semantics = Decoder::new(&index).semantics(&data).unwrap();
    assert_eq!(
        semantics,
        vec![
            DecodedRange::new(
                0,
                1,
                SemanticClass {
                    kind: "IDENTIFIER".to_string(),
                    name: None
                }
            ),
            DecodedRange::new(
                4,
                5,
                SemanticClass {
                    kind: "LITERAL".to_string(),
                    name: None
                }
            ),
        ]
    );
    assert_eq!(semantics[1].payload.class_attr(), "semantics LITERAL");
}

#[test]
fn test_multi_line_range() {
    let index = LineIndex::from_lines(["#if 0", "int x;", "#endif"]);
    let data = array(json!([1, 1, 3, 7, "INACTIVE", null]));

    let semantics = Decoder::new(&index).semantics(&data).unwrap();
    assert_eq!((semantics[0].from, semantics[0].to), (0, 19));
    assert_eq!(index.char_count(), 19);
}

#[test]
fn test_length_not_multiple_of_width_is_malformed() {
    let index = LineIndex::from_lines(["abcdef"]);
    let data = array(json!([1, 1, 1, 2]));

    let err = Decoder::new(&index).links(&data).unwrap_err();
    assert_eq!(
        err,
        DecodeError::MalformedAnnotation {
            kind: AnnotationKind::Link,
            reason: Malformed::Length { len: 4, width: 5 },
        }
    );
}

#[test]
fn test_every_multiple_of_width_decodes() {
    let index = LineIndex::from_lines(["abcdef"]);
    for count in 0..4 {
        let mut data = Vec::new();
        for _ in 0..count {
            data.extend(array(json!([1, 1, 1, 2, 3])));
        }
        let links = Decoder::new(&index).links(&data).unwrap();
        assert_eq!(links.len(), count);
    }
}

#[test]
fn test_wrong_field_type_is_malformed() {
    let index = LineIndex::from_lines(["abcdef"]);
    let data = array(json!([1, "1", 1, 2, 3]));

    let err = Decoder::new(&index).links(&data).unwrap_err();
    assert_eq!(
        err,
        DecodeError::MalformedAnnotation {
            kind: AnnotationKind::Link,
            reason: Malformed::Field {
                index: 0,
                field: "begin_col"
            },
        }
    );
}

#[test]
fn test_row_past_end_is_out_of_range() {
    let index = LineIndex::from_lines(["a", "b"]);
    let data = array(json!([1, 1, 1, 2, "TOKEN", null, 3, 1, 3, 2, "TOKEN", null]));

    let err = Decoder::new(&index).semantics(&data).unwrap_err();
    assert_eq!(
        err,
        DecodeError::OutOfRange {
            kind: AnnotationKind::Semantics,
            index: 1,
            row: 3,
            column: 1,
        }
    );
}

#[test]
fn test_column_past_line_end_is_out_of_range() {
    let index = LineIndex::from_lines(["abc", "def"]);
    let data = array(json!([1, 1, 1, 5, 9]));

    let err = Decoder::new(&index).links(&data).unwrap_err();
    assert!(matches!(err, DecodeError::OutOfRange { column: 5, .. }));
}

#[test]
fn test_zero_column_is_out_of_range() {
    let index = LineIndex::from_lines(["abc"]);
    let data = array(json!([1, 0, 1, 2, 9]));

    let err = Decoder::new(&index).links(&data).unwrap_err();
    assert!(matches!(err, DecodeError::OutOfRange { column: 0, .. }));
}

#[test]
fn test_inverted_range_is_rejected() {
    let index = LineIndex::from_lines(["abcdef"]);
    let data = array(json!([1, 5, 1, 2, 9]));

    let err = Decoder::new(&index).links(&data).unwrap_err();
    assert_eq!(
        err,
        DecodeError::MalformedAnnotation {
            kind: AnnotationKind::Link,
            reason: Malformed::Inverted {
                index: 0,
                from: 4,
                to: 1
            },
        }
    );
}

#[test]
fn test_zero_length_range_is_kept() {
    let index = LineIndex::from_lines(["abc"]);
    let data = array(json!([1, 2, 1, 2, "EXPANSION", null]));

    let semantics = Decoder::new(&index).semantics(&data).unwrap();
    assert_eq!((semantics[0].from, semantics[0].to), (1, 1));
}

#[test]
fn test_decoding_is_deterministic_and_keeps_input_order() {
    let index = LineIndex::from_lines(["int main(void) {", "  return 0;", "}"]);
    #[rustfmt::skip]
    let data = array(json!([
        2, 3, 2, 9, "KEYWORD", "return",
        1, 1, 1, 4, "KEYWORD", "int",
        1, 5, 1, 9, "IDENTIFIER", null
    ]));

    let decoder = Decoder::new(&index);
    let first = decoder.semantics(&data).unwrap();
    let second = decoder.semantics(&data).unwrap();
    assert_eq!(first, second);

    let starts: Vec<usize> = first.iter().map(|r| r.from).collect();
    assert_eq!(starts, vec![19, 0, 4]);
    for range in &first {
        assert!(range.from <= range.to && range.to <= index.char_count());
    }
}

#[test]
fn test_byte_columns() {
    let index = LineIndex::from_lines(["s = \"你好\";"]);
    // The string literal spans 1-based byte columns 5..13.
    let data = array(json!([1, 5, 1, 13, "LITERAL", null]));

    let chars = Decoder::new(&index).semantics(&data);
    assert!(matches!(chars, Err(DecodeError::OutOfRange { .. })));

    let bytes = Decoder::new(&index)
        .with_columns(ColumnEncoding::Utf8Bytes)
        .semantics(&data)
        .unwrap();
    assert_eq!((bytes[0].from, bytes[0].to), (4, 8));
}

#[test]
fn test_decl_tuple() {
    let index = LineIndex::from_lines(["static const struct point origin;"]);
    #[rustfmt::skip]
    let data = array(json!([
        1, 27, "origin", "VarDecl", 10, 1, "const struct point", "const struct point"
    ]));

    let decls = Decoder::new(&index).decls(&data).unwrap();
    assert_eq!(decls.len(), 1);
    let decl = &decls[0];
    assert_eq!((decl.from, decl.to), (26, 32));
    assert_eq!(decl.payload.name, "origin");
    assert_eq!(decl.payload.elaborated, ElaboratedType::Struct);
    assert_eq!(decl.payload.desugared_type, None);
    assert_eq!(
        decl.payload.specifiers().collect::<Vec<_>>(),
        vec!["static", "const"]
    );
}

#[test]
fn test_decl_name_must_fit_on_its_line() {
    let index = LineIndex::from_lines(["int x;"]);
    let data = array(json!([1, 5, "overflowing", "VarDecl", 0, 0, "int", null]));

    let err = Decoder::new(&index).decls(&data).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::OutOfRange {
            kind: AnnotationKind::Decl,
            ..
        }
    ));
}

#[test]
fn test_macro_decl_tuple() {
    let index = LineIndex::from_lines(["#define MAX(a, b) ((a) > (b) ? (a) : (b))"]);
    let data = array(json!([1, 9, "MAX", "(a, b)", "((a) > (b) ? (a) : (b))"]));

    let macros = Decoder::new(&index).macro_decls(&data).unwrap();
    assert_eq!((macros[0].from, macros[0].to), (8, 11));
    assert_eq!(macros[0].payload.parameters.as_deref(), Some("(a, b)"));
}

#[test]
fn test_failing_kind_does_not_affect_others() {
    let index = LineIndex::from_lines(["#include \"a.h\"", "if (x) {}"]);
    let link = json!([1, 10, 1, 15, 2]);
    let semantics = json!([2, 1, 2, 3, "KEYWORD"]);

    let sources = AnnotationSources {
        link: Some(&link),
        semantics: Some(&semantics),
        ..Default::default()
    };
    let annotations = Annotations::decode(&Decoder::new(&index), &sources);

    assert_eq!(annotations.links.len(), 1);
    assert!(annotations.semantics.is_empty());
    assert!(annotations.failed(AnnotationKind::Semantics));
    assert!(!annotations.failed(AnnotationKind::Link));
    assert_eq!(annotations.failures.len(), 1);
}

#[test]
fn test_non_array_block_fails_only_its_kind() {
    let index = LineIndex::from_lines(["if (x) {}"]);
    let link = json!({ "corrupt": true });
    let semantics = json!([1, 1, 1, 3, "KEYWORD", "if"]);

    let sources = AnnotationSources {
        link: Some(&link),
        semantics: Some(&semantics),
        ..Default::default()
    };
    let annotations = Annotations::decode(&Decoder::new(&index), &sources);

    assert!(annotations.links.is_empty());
    assert_eq!(annotations.semantics.len(), 1);
    assert_eq!(
        annotations.failures,
        vec![DecodeError::MalformedAnnotation {
            kind: AnnotationKind::Link,
            reason: Malformed::Shape,
        }]
    );
}
