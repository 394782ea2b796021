//! Benchmark for build and lookup over a generated lexicon.
//!
//! Compares:
//! 1. Exact lookup (`search`)
//! 2. Common-prefix enumeration (`common_prefix_search`)

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use lexfst::{Fst, Int32Fst, Pair};

/// Generate a deterministic lexicon with heavy prefix sharing.
fn generate_lexicon(size: usize, seed: u64) -> Vec<Pair<i32>> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let syllables = ["ka", "shi", "mo", "ta", "ru", "en", "go", "pre", "fix"];
    (0..size)
        .map(|i| {
            let len = rng.gen_range(1..=5);
            let word: String = (0..len)
                .map(|_| syllables[rng.gen_range(0..syllables.len())])
                .collect();
            Pair::new(word, i as i32)
        })
        .collect()
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    for size in [1_000, 10_000, 100_000] {
        let pairs = generate_lexicon(size, 42);
        group.bench_with_input(BenchmarkId::from_parameter(size), &pairs, |b, pairs| {
            b.iter(|| Int32Fst::new(black_box(pairs.clone())).unwrap());
        });
    }
    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    for size in [1_000, 10_000, 100_000] {
        let pairs = generate_lexicon(size, 42);
        let keys: Vec<Vec<u8>> = pairs.iter().map(|p| p.input.clone()).collect();
        let fst = Fst::new(pairs).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(size), &fst, |b, fst| {
            b.iter(|| {
                for key in &keys {
                    black_box(fst.search(key));
                }
            });
        });
    }
    group.finish();
}

fn bench_common_prefix_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("common_prefix_search");
    let pairs = generate_lexicon(10_000, 42);
    let queries: Vec<Vec<u8>> = pairs
        .iter()
        .step_by(7)
        .map(|p| {
            let mut q = p.input.clone();
            q.extend_from_slice(b"nokori");
            q
        })
        .collect();
    let fst = Fst::new(pairs).unwrap();
    group.bench_function("10000", |b| {
        b.iter(|| {
            for q in &queries {
                black_box(fst.common_prefix_search(q));
            }
        });
    });
    group.finish();
}

criterion_group!(benches, bench_build, bench_search, bench_common_prefix_search);
criterion_main!(benches);
