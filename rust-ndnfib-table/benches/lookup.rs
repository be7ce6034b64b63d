//! Build and lookup throughput of the FIB table.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rust_ndnfib_common::{FibConfig, PortId, PrefixKind, Prefixes};
use rust_ndnfib_table::FibTable;

fn generate_urls(n: usize) -> Vec<Vec<u8>> {
    (0..n)
        .map(|i| format!("/com/site{}/section{}/page{}", i % 97, i % 13, i).into_bytes())
        .collect()
}

fn config() -> FibConfig {
    FibConfig {
        num_buckets: 1 << 16,
        log_capacity: 64 * 1024 * 1024,
        ..FibConfig::default()
    }
}

fn populate(urls: &[Vec<u8>]) -> FibTable {
    let mut table = FibTable::new(config()).unwrap();
    for url in urls {
        for prefix in Prefixes::new(url).iter() {
            let kind = if prefix.is_terminal() {
                PrefixKind::Terminal(PortId(0))
            } else {
                PrefixKind::Interior
            };
            table.insert(prefix.key(), kind).unwrap();
        }
    }
    table
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");

    for size in [1_000, 10_000, 100_000].iter() {
        let urls = generate_urls(*size);
        group.bench_with_input(BenchmarkId::new("FibTable", size), size, |b, _| {
            b.iter(|| black_box(populate(&urls)));
        });
    }

    group.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup");

    for size in [1_000, 10_000, 100_000].iter() {
        let urls = generate_urls(*size);
        let keys: Vec<Vec<u8>> = urls.iter().map(|u| Prefixes::new(u).terminal().to_vec()).collect();
        let frozen = populate(&urls).freeze();

        group.bench_with_input(BenchmarkId::new("hit", size), size, |b, _| {
            b.iter(|| {
                let mut hits = 0usize;
                for key in keys.iter() {
                    if frozen.contains(key).unwrap() {
                        hits += 1;
                    }
                }
                black_box(hits)
            });
        });

        group.bench_with_input(BenchmarkId::new("miss", size), size, |b, _| {
            b.iter(|| {
                let mut hits = 0usize;
                for key in keys.iter() {
                    if frozen.contains(&key[1..]).unwrap() {
                        hits += 1;
                    }
                }
                black_box(hits)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_build, bench_lookup);
criterion_main!(benches);
