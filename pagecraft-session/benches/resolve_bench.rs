//! Resolution benchmarks.
//!
//! Run with:
//!   cargo bench --bench resolve_bench

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use pagecraft_session::Resolver;
use pagecraft_types::{ContentKey, ContentTree, ContentValue, PendingBuffer, PendingChange};
use serde_json::json;

fn page_tree(sections: usize, fields: usize) -> ContentTree {
    let mut tree = ContentTree::new();
    for s in 0..sections {
        for f in 0..fields {
            let key = ContentKey::new("home", format!("section_{s}"), format!("field_{f}"));
            tree.insert(&key, ContentValue::text(format!("stored {s}/{f}")));
        }
    }
    tree
}

fn bench_resolve_stored(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_stored");

    for sections in [4, 16, 64] {
        let tree = page_tree(sections, 8);
        let key = ContentKey::new("home", format!("section_{}", sections / 2), "field_3");

        group.bench_with_input(
            BenchmarkId::from_parameter(sections),
            &tree,
            |b, tree| {
                b.iter(|| {
                    let value = Resolver::new(black_box(tree))
                        .resolve(black_box(&key), ContentValue::text("default"));
                    black_box(value);
                });
            },
        );
    }

    group.finish();
}

fn bench_resolve_pending(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_pending");
    let tree = page_tree(16, 8);

    for staged in [1, 32, 256] {
        let pending: PendingBuffer = (0..staged)
            .map(|i| {
                PendingChange::new(
                    ContentKey::new("home", "section_0", format!("field_{i}")),
                    ContentValue::text(format!("pending {i}")),
                )
            })
            .collect();
        let key = ContentKey::new("home", "section_0", "field_0");

        group.bench_with_input(
            BenchmarkId::from_parameter(staged),
            &pending,
            |b, pending| {
                b.iter(|| {
                    let value = Resolver::new(&tree)
                        .with_pending(Some(black_box(pending)))
                        .resolve(black_box(&key), ContentValue::text("default"));
                    black_box(value);
                });
            },
        );
    }

    group.finish();
}

fn bench_resolve_dotted(c: &mut Criterion) {
    let logos: Vec<_> = (0..50)
        .map(|i| json!({"imageUrl": format!("/logos/{i}.png"), "alt": format!("client {i}")}))
        .collect();
    let mut tree = ContentTree::new();
    tree.insert(
        &ContentKey::new("home", "trust_block", "client_logos"),
        ContentValue::Json(json!(logos)),
    );
    let key = ContentKey::new("home", "trust_block", "client_logos.42.imageUrl");

    c.bench_function("resolve_dotted", |b| {
        b.iter(|| {
            let value = Resolver::new(black_box(&tree))
                .resolve(black_box(&key), ContentValue::image("/logos/default.png"));
            black_box(value);
        });
    });
}

criterion_group!(
    benches,
    bench_resolve_stored,
    bench_resolve_pending,
    bench_resolve_dotted
);
criterion_main!(benches);
