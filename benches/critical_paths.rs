//! Criterion benchmarks for cldctx critical paths
//!
//! Benchmarks the operations that run on every element render:
//! - Classify: splitting an option bag against the vocabulary
//! - Merge: folding a scope chain
//! - Compose: building the chain and serializing the URL

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use cldctx::options::{classify, OptionBag, OptionMap};
use cldctx::scope::merge;
use cldctx::transformation::{build, TransformationStep};
use cldctx::url::{compose, ResourceDescriptor};
use cldctx::vocabulary::Vocabulary;

// =============================================================================
// Test Data Generators
// =============================================================================

/// Bag mixing recognized options in all three spellings with attributes
fn make_bag(n: usize) -> OptionBag {
    let spellings =
        ["fetch_format", "default-image", "quality", "aria-label", "className", "crop", "data-id"];
    (0..n)
        .map(|i| (format!("{}{}", spellings[i % spellings.len()], i / spellings.len()), "auto"))
        .collect()
}

fn make_scopes(depth: usize) -> Vec<OptionMap> {
    (0..depth)
        .map(|i| {
            [
                ("cloudName", format!("demo{}", i)),
                ("width", format!("{}", 100 * (i + 1))),
                ("crop", "scale".into()),
            ]
            .into_iter()
            .collect()
        })
        .collect()
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_classify(c: &mut Criterion) {
    let vocab = Vocabulary::builtin();
    let mut group = c.benchmark_group("classify");
    for size in [8, 32, 128] {
        let bag = make_bag(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &bag, |b, bag| {
            b.iter(|| classify(black_box(bag), vocab))
        });
    }
    group.finish();
}

fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge");
    for depth in [1, 4, 16] {
        let scopes = make_scopes(depth);
        group.bench_with_input(BenchmarkId::from_parameter(depth), &scopes, |b, scopes| {
            b.iter(|| merge(black_box(scopes).iter()))
        });
    }
    group.finish();
}

fn bench_compose(c: &mut Criterion) {
    let vocab = Vocabulary::builtin();
    let scopes = make_scopes(3);
    let merged = merge(scopes.iter());
    let explicit = vec![
        TransformationStep::new().with("effect", "sepia").with("angle", 10u32),
        TransformationStep::new().with("fetchFormat", "auto").with("quality", "auto"),
    ];
    let descriptor = ResourceDescriptor::new("demo", "folder/sample").secure(true);

    c.bench_function("compose_url", |b| {
        b.iter(|| {
            let steps = build(black_box(&merged), &explicit, Some(300), vocab);
            compose(&descriptor, &steps, vocab)
        })
    });
}

criterion_group!(benches, bench_classify, bench_merge, bench_compose);
criterion_main!(benches);
