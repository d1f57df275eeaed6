//! Span-text codec benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use lexisync_bench::{registry, span_text};
use lexisync_spantext::{decode, encode, from_native, span_count};

/// Benchmark decoding span text of increasing size.
fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    group.bench_function("plain", |b| {
        let text = "a large brown bear and a small grey dog".repeat(8);
        b.iter(|| black_box(decode(black_box(&text))));
    });

    for spans in [1usize, 10, 100].iter() {
        let text = span_text(*spans);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::new("spans", spans), &text, |b, text| {
            b.iter(|| black_box(decode(black_box(text))));
        });
    }

    group.finish();
}

/// Benchmark counting spans without building runs.
fn bench_span_count(c: &mut Criterion) {
    let text = span_text(100);
    c.bench_function("span_count/100", |b| {
        b.iter(|| black_box(span_count(black_box(&text))));
    });
}

/// Benchmark rendering native rich text back to span text.
fn bench_from_native(c: &mut Criterion) {
    let mut group = c.benchmark_group("from_native");
    let ws = registry();

    for spans in [1usize, 10, 100].iter() {
        let native = encode(&decode(&span_text(*spans)), 1, &ws).unwrap();
        group.throughput(Throughput::Elements(native.run_count() as u64));
        group.bench_with_input(BenchmarkId::new("spans", spans), &native, |b, native| {
            b.iter(|| black_box(from_native(black_box(native), 1, &ws).unwrap()));
        });
    }

    group.finish();
}

/// Benchmark the full decode, encode and render cycle.
fn bench_round_trip(c: &mut Criterion) {
    let ws = registry();
    let text = span_text(10);
    c.bench_function("round_trip/10", |b| {
        b.iter(|| {
            let native = encode(&decode(black_box(&text)), 1, &ws).unwrap();
            black_box(from_native(&native, 1, &ws).unwrap())
        });
    });
}

criterion_group!(
    benches,
    bench_decode,
    bench_span_count,
    bench_from_native,
    bench_round_trip,
);

criterion_main!(benches);
