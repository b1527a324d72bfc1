use criterion::{Criterion, black_box, criterion_group, criterion_main};
use reader_core::{
    AnnotationSources, DecorationSet, DecoderConfig, Decoder, IdResolver, LineIndex, LineSnapshot,
    SourceView,
};
use serde_json::{Value, json};

fn large_lines(line_count: usize) -> Vec<String> {
    (0..line_count)
        .map(|i| format!("    if (value_{i:06} > limit) return compute(value_{i:06}, {i});"))
        .collect()
}

/// Three semantic tuples per line: the `if`, the identifier and the `return`.
fn large_semantics(line_count: usize) -> Vec<Value> {
    let mut out = Vec::with_capacity(line_count * 18);
    for row in 1..=line_count {
        for tuple in [
            json!([row, 5, row, 7, "KEYWORD", "if"]),
            json!([row, 9, row, 21, "IDENTIFIER", null]),
            json!([row, 31, row, 37, "KEYWORD", "return"]),
        ] {
            if let Value::Array(fields) = tuple {
                out.extend(fields);
            }
        }
    }
    out
}

fn bench_decode_semantics(c: &mut Criterion) {
    let index = LineIndex::from_lines(large_lines(50_000));
    let data = large_semantics(50_000);
    c.bench_function("decode_semantics/150k_tuples", |b| {
        b.iter(|| {
            let ranges = Decoder::new(&index).semantics(black_box(&data)).unwrap();
            black_box(ranges.len());
        })
    });
}

fn bench_view_queries(c: &mut Criterion) {
    let data = Value::Array(large_semantics(50_000));
    let sources = AnnotationSources {
        semantics: Some(&data),
        ..Default::default()
    };
    let view = SourceView::new(
        LineIndex::from_lines(large_lines(50_000)),
        DecoderConfig::default(),
        &sources,
    );

    c.bench_function("hover/middle_of_document", |b| {
        b.iter(|| black_box(view.hover_at(black_box(25_000), 10, &IdResolver)))
    });

    c.bench_function("snapshot/60_lines", |b| {
        b.iter(|| {
            for row in 25_000..25_060 {
                black_box(LineSnapshot::build(
                    view.line_index(),
                    view.decorations(),
                    row,
                ));
            }
        })
    });

    let rebuilt = view.decorations().clone();
    c.bench_function("replace/unchanged_set", |b| {
        b.iter_batched(
            || (view.decorations().clone(), rebuilt.clone()),
            |(mut held, next): (DecorationSet, DecorationSet)| black_box(held.replace(next)),
            criterion::BatchSize::LargeInput,
        )
    });
}

criterion_group!(benches, bench_decode_semantics, bench_view_queries);
criterion_main!(benches);
