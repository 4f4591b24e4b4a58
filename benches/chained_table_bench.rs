use chained_table::ChainedHashTable;
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn key(n: u64) -> String {
    format!("k{:016x}", n)
}

fn filled(seed: u64, n: usize) -> (ChainedHashTable<String, u64>, Vec<String>) {
    let mut t = ChainedHashTable::new();
    let keys: Vec<_> = lcg(seed).take(n).map(key).collect();
    for (i, k) in keys.iter().enumerate() {
        t.insert(k.clone(), i as u64);
    }
    (t, keys)
}

// Every doubling from 16 buckets is on this path.
fn bench_insert_fresh_100k(c: &mut Criterion) {
    c.bench_function("chained::insert_fresh_100k", |b| {
        b.iter_batched(
            ChainedHashTable::<String, u64>::new,
            |mut t| {
                for (i, x) in lcg(1).take(100_000).enumerate() {
                    t.insert(key(x), i as u64);
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

// Capacity already grown; measures chain insert without rehashing.
fn bench_insert_warm_100k(c: &mut Criterion) {
    c.bench_function("chained::insert_warm_100k", |b| {
        b.iter_batched(
            || {
                let (mut t, keys) = filled(2, 110_000);
                for k in &keys {
                    t.remove(k);
                }
                t
            },
            |mut t| {
                for (i, x) in lcg(3).take(100_000).enumerate() {
                    t.insert(key(x), i as u64);
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_upsert_10k(c: &mut Criterion) {
    c.bench_function("chained::upsert_10k_on_100k", |b| {
        b.iter_batched(
            || filled(4, 100_000),
            |(mut t, keys)| {
                for k in keys.iter().step_by(10) {
                    t.insert(k.clone(), 0);
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_remove_10k(c: &mut Criterion) {
    c.bench_function("chained::remove_10k_of_110k", |b| {
        b.iter_batched(
            || filled(5, 110_000),
            |(mut t, keys)| {
                for k in keys.iter().step_by(11) {
                    black_box(t.remove(k));
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_get_hit_10k(c: &mut Criterion) {
    c.bench_function("chained::get_hit_10k_on_100k", |b| {
        let (t, keys) = filled(7, 100_000);
        let n = keys.len();
        let mut s = 0x9e3779b97f4a7c15u64;
        let queries: Vec<String> = (0..10_000)
            .map(|_| {
                s = s.wrapping_mul(2862933555777941757).wrapping_add(3037000493);
                keys[(s as usize) % n].clone()
            })
            .collect();
        b.iter(|| {
            for k in &queries {
                black_box(t.get(k));
            }
        })
    });
}

fn bench_get_miss_10k(c: &mut Criterion) {
    c.bench_function("chained::get_miss_10k_on_100k", |b| {
        let (t, _keys) = filled(11, 100_000);
        let misses: Vec<String> = lcg(0xdead_beef).take(10_000).map(key).collect();
        b.iter(|| {
            for k in &misses {
                black_box(t.get(k));
            }
        })
    });
}

fn bench_scans(c: &mut Criterion) {
    let (t, _keys) = filled(13, 100_000);
    c.bench_function("chained::range_keys_100k", |b| {
        b.iter(|| black_box(t.range_keys("k4", "k8")))
    });
    c.bench_function("chained::sorted_keys_100k", |b| {
        b.iter(|| black_box(t.sorted_keys()))
    });
    c.bench_function("chained::clone_100k", |b| b.iter(|| black_box(t.clone())));
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(12)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1))
}

criterion_group! {
    name = benches_insert;
    config = bench_config();
    targets = bench_insert_fresh_100k, bench_insert_warm_100k, bench_upsert_10k
}
criterion_group! {
    name = benches_ops;
    config = bench_config();
    targets = bench_remove_10k,
              bench_get_hit_10k,
              bench_get_miss_10k,
              bench_scans
}
criterion_main!(benches_insert, benches_ops);
