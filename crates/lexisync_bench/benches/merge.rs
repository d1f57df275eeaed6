//! Merge policy benchmarks.

use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use lexisync_bench::{edit_every, entries};
use lexisync_merge::merge_project;

/// Benchmark a project merge where nothing changed.
fn bench_merge_unchanged(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge_unchanged");

    for count in [100usize, 1_000].iter() {
        let previous = entries(*count, 3);
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &previous, |b, previous| {
            b.iter(|| {
                black_box(merge_project(previous, previous, previous, Utc::now()).unwrap())
            });
        });
    }

    group.finish();
}

/// Benchmark a project merge with edits and conflicts on both sides.
fn bench_merge_edited(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge_edited");

    for count in [100usize, 1_000].iter() {
        let previous = entries(*count, 3);
        let store = edit_every(&previous, 3, "store");
        let model = edit_every(&previous, 5, "model");
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, _| {
            b.iter(|| black_box(merge_project(&previous, &store, &model, Utc::now()).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_merge_unchanged, bench_merge_edited);

criterion_main!(benches);
