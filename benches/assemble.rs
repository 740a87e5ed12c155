//! Benchmarks for per-document example building and batch processing.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use docrel::{
    process_documents, Document, Entity, ExampleBuilder, ExampleConfig, GoldLabel, Mention,
    MockTokenizer, RelationVocab, Split,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// A DocRED-sized document: 8 sentences of 24 words, `entity_count` entities.
fn synthetic_document(index: usize, entity_count: usize) -> Document {
    let sents: Vec<Vec<String>> = (0..8)
        .map(|s| (0..24).map(|w| format!("word{}x{}", s, w)).collect())
        .collect();
    let entities = (0..entity_count)
        .map(|e| {
            Entity::new(vec![
                Mention::new(e % 8, (e * 3) % 22, (e * 3) % 22 + 2, "ORG"),
                Mention::new((e + 3) % 8, e % 24, e % 24 + 1, "ORG"),
            ])
        })
        .collect();
    let labels = (1..entity_count)
        .step_by(3)
        .map(|t| GoldLabel::new(0, t, "P17"))
        .collect();
    Document::new(format!("doc {}", index), sents, entities).with_labels(labels)
}

fn builder() -> ExampleBuilder {
    ExampleBuilder::new(
        ExampleConfig::default(),
        Arc::new(MockTokenizer::new().with_piece_width(4)),
        RelationVocab::from_names(["P17", "P131", "P159"]).unwrap(),
    )
    .unwrap()
}

fn bench_single_document(c: &mut Criterion) {
    let mut group = c.benchmark_group("process_document");
    let builder = builder();

    for &entities in &[5, 20, 40] {
        let doc = synthetic_document(0, entities);
        for split in [Split::Train, Split::Valid] {
            group.bench_with_input(
                BenchmarkId::new(split.as_str(), entities),
                &doc,
                |b, doc| {
                    let mut rng = StdRng::seed_from_u64(0);
                    b.iter(|| black_box(builder.process(doc.clone(), split, &mut rng).unwrap()))
                },
            );
        }
    }
    group.finish();
}

fn bench_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("process_documents");
    group.sample_size(10);
    let builder = builder();

    for &count in &[16, 64] {
        let docs: Vec<Document> = (0..count).map(|i| synthetic_document(i, 20)).collect();
        group.bench_with_input(BenchmarkId::from_parameter(count), &docs, |b, docs| {
            b.iter(|| black_box(process_documents(&builder, docs, Split::Train, 1).unwrap()))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_single_document, bench_batch);
criterion_main!(benches);
