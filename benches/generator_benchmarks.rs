//! Benchmarks for generator decorators.
//!
//! These benchmarks measure the overhead of the cache and alias decorators
//! over a slow base generator, and the cost of batch linking.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use entity_linker::prelude::*;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Table generator with a fixed per-lookup latency.
struct SlowTable {
    table: StaticMapGenerator<String, String>,
    latency: Duration,
}

impl CandidateGenerator for SlowTable {
    type Query = String;
    type Candidate = String;

    fn find_candidates(&self, query: &String) -> entity_linker::error::Result<CandidateSet<String>> {
        if !self.latency.is_zero() {
            thread::sleep(self.latency);
        }
        self.table.find_candidates(query)
    }
}

fn create_table(latency: Duration) -> SlowTable {
    let entries = (0..1000).map(|i| (format!("entity_{:04}", i), vec![format!("/m/{:x}", i)]));
    SlowTable {
        table: StaticMapGenerator::new(entries),
        latency,
    }
}

fn queries(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("entity_{:04}", (i * 7) % 1000)).collect()
}

// Benchmark: base generator without decorators
fn bench_baseline_find(c: &mut Criterion) {
    let gen = create_table(Duration::ZERO);
    let qs = queries(100);

    c.bench_function("baseline/find_candidates", |b| {
        b.iter(|| {
            for q in &qs {
                black_box(gen.find_candidates(q).unwrap());
            }
        });
    });
}

// Benchmark: warm cache over the same generator
fn bench_cached_find(c: &mut Criterion) {
    let cached = CacheBuilder::for_strings().build(create_table(Duration::ZERO)).unwrap();
    let qs = queries(100);
    for q in &qs {
        cached.find_candidates(q).unwrap();
    }

    c.bench_function("cached/find_candidates", |b| {
        b.iter(|| {
            for q in &qs {
                black_box(cached.find_candidates(q).unwrap());
            }
        });
    });
}

// Benchmark: cache in front of a slow generator, by working-set size
fn bench_cache_hit_vs_slow_miss(c: &mut Criterion) {
    let mut group = c.benchmark_group("cache_vs_latency");
    group.sample_size(10);

    for size in [10usize, 50] {
        let qs = queries(size);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("uncached", size), &qs, |b, qs| {
            let gen = create_table(Duration::from_micros(50));
            b.iter(|| {
                for q in qs {
                    black_box(gen.find_candidates(q).unwrap());
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("cached", size), &qs, |b, qs| {
            let cached = CachedGenerator::new(create_table(Duration::from_micros(50)));
            b.iter(|| {
                for q in qs {
                    black_box(cached.find_candidates(q).unwrap());
                }
            });
        });
    }

    group.finish();
}

// Benchmark: eviction churn with a budget smaller than the working set
fn bench_cache_eviction_churn(c: &mut Criterion) {
    let cached = CacheBuilder::new()
        .max_weight(64)
        .build(create_table(Duration::ZERO))
        .unwrap();
    let qs = queries(500);

    c.bench_function("cached/eviction_churn", |b| {
        b.iter(|| {
            for q in &qs {
                black_box(cached.find_candidates(q).unwrap());
            }
        });
    });
}

// Benchmark: recursive alias resolution over a chain
fn bench_alias_chain(c: &mut Criterion) {
    let mut aliases = AliasTable::from_pairs(
        (0..8).map(|i| (format!("alias_{}", i), format!("alias_{}", i + 1))),
    );
    aliases.insert("alias_8".to_string(), "entity_0001".to_string());
    let gen = AliasMappingGenerator::new(create_table(Duration::ZERO), aliases, true);
    let query = "alias_0".to_string();

    c.bench_function("alias/recursive_chain", |b| {
        b.iter(|| black_box(gen.find_candidates(&query).unwrap()));
    });
}

// Benchmark: batch linking from several threads over a shared cache
fn bench_concurrent_batch_link(c: &mut Criterion) {
    let generator = CachedGenerator::new(create_table(Duration::ZERO));
    let linker = Arc::new(TwoPhaseLinker::new(generator, NullRanker));
    let qs = Arc::new(queries(200));

    c.bench_function("linker/concurrent_batch_link", |b| {
        b.iter(|| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let linker = Arc::clone(&linker);
                    let qs = Arc::clone(&qs);
                    thread::spawn(move || linker.batch_link(&qs).unwrap())
                })
                .collect();
            for handle in handles {
                black_box(handle.join().unwrap());
            }
        });
    });
}

criterion_group!(
    benches,
    bench_baseline_find,
    bench_cached_find,
    bench_cache_hit_vs_slow_miss,
    bench_cache_eviction_churn,
    bench_alias_chain,
    bench_concurrent_batch_link,
);
criterion_main!(benches);
