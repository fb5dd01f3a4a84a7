use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use shingle::{fingerprint, select, similarity, SketchSize};

fn words(count: usize, salt: usize) -> String {
    (0..count)
        .map(|i| format!("word{}", (i * 7 + salt) % 997))
        .collect::<Vec<_>>()
        .join(" ")
}

fn bench_fingerprint(c: &mut Criterion) {
    let mut group = c.benchmark_group("fingerprint");
    for size in [500, 5_000, 50_000] {
        let text = words(size, 0);
        group.throughput(Throughput::Elements(size as u64));
        for w in [25, 50] {
            group.bench_function(format!("tokens_{size}_w{w}"), |b| {
                b.iter(|| fingerprint(black_box(&text), black_box(w)))
            });
        }
    }
    group.finish();
}

fn bench_select_and_compare(c: &mut Criterion) {
    let current = fingerprint(&words(20_000, 0), 25);
    let older = fingerprint(&words(20_000, 3), 25);
    let mut group = c.benchmark_group("compare");
    for size in [
        SketchSize::Bounded(8),
        SketchSize::Bounded(64),
        SketchSize::Unbounded,
    ] {
        group.bench_function(format!("lambda_{size}"), |b| {
            b.iter(|| {
                similarity(
                    select(black_box(&current), size),
                    select(black_box(&older), size),
                )
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_fingerprint, bench_select_and_compare);
criterion_main!(benches);
