//! Criterion benchmarks for sprig-core allocation.
//!
//! Covers: `next_branch` over growing record sets and the copy-on-allocate
//! snapshot update used during startup.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use sprig_core::allocator::{next_branch, DerivationLayout, RecordSnapshot};
use sprig_core::types::{DerivationPath, WalletRecord};

fn make_records(n: u32) -> Vec<WalletRecord> {
    (0..n)
        .map(|i| {
            WalletRecord::fresh(
                format!("C{i:04}"),
                DerivationPath::from_segments(vec![0, i]),
                u64::from(i),
            )
        })
        .collect()
}

fn bench_next_branch(c: &mut Criterion) {
    let mut group = c.benchmark_group("next_branch");
    for n in [1u32, 16, 256, 4096] {
        let paths: Vec<DerivationPath> = make_records(n)
            .into_iter()
            .map(|r| r.derivation_path)
            .collect();
        group.bench_with_input(BenchmarkId::from_parameter(n), &paths, |b, paths| {
            b.iter(|| next_branch(black_box(paths), 2).unwrap())
        });
    }
    group.finish();
}

fn bench_snapshot_allocate(c: &mut Criterion) {
    let layout = DerivationLayout::default();
    let snapshot = RecordSnapshot::from_records(make_records(256));
    c.bench_function("snapshot_allocate_256", |b| {
        b.iter(|| {
            let path = layout.next_path(black_box(&snapshot)).unwrap();
            snapshot.with_record(WalletRecord::fresh("NEW", path, 0))
        })
    });
}

criterion_group!(benches, bench_next_branch, bench_snapshot_allocate);
criterion_main!(benches);
