use criterion::{criterion_group, criterion_main, Criterion};
use term_vector::{Compare, CommonParser, TermVector, VectorConfig};

fn synthetic_text(words: usize, vocabulary: usize, salt: usize) -> String {
    (0..words)
        .map(|i| format!("w{}", (i * 31 + salt) % vocabulary))
        .collect::<Vec<_>>()
        .join(" ")
}

fn build_and_compare_benchmark(c: &mut Criterion) {
    let parser = CommonParser::new();
    let doc_a = synthetic_text(50_000, 8_000, 0);
    let doc_b = synthetic_text(50_000, 12_000, 7);

    // growth path: starts tiny and rehashes many times
    c.bench_function("build_from_small_table", |b| {
        let config = VectorConfig::default().with_initial_capacity(1);
        b.iter(|| TermVector::from_text(&doc_a, &parser, &config).unwrap());
    });

    c.bench_function("build_from_default_table", |b| {
        let config = VectorConfig::default();
        b.iter(|| TermVector::from_text(&doc_a, &parser, &config).unwrap());
    });

    let config = VectorConfig::default();
    let v1 = TermVector::from_text(&doc_a, &parser, &config).unwrap();
    let v2 = TermVector::from_text(&doc_b, &parser, &config).unwrap();
    c.bench_function("cosine_similarity", |b| {
        b.iter(|| v1.cosine_similarity::<f64>(&v2));
    });

    let bytes = v1.to_bytes().unwrap();
    c.bench_function("load", |b| {
        b.iter(|| TermVector::from_bytes(&bytes).unwrap());
    });
}

criterion_group!(benches, build_and_compare_benchmark);
criterion_main!(benches);
