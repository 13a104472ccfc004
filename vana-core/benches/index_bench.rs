#[macro_use]
extern crate criterion;

use criterion::{BatchSize, Criterion};
use rand::Rng;

use vana_core::{HabitIndex, IndexOptions};

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_insert");

    for count in [32, 128] {
        group.throughput(criterion::Throughput::Elements(count as u64));
        group.bench_function(format!("records_{}", count), |b| {
            b.iter_batched(
                || {
                    HabitIndex::new(IndexOptions {
                        arena_capacity: 16 * 1024 * 1024,
                        buckets: 256,
                    })
                    .unwrap()
                },
                |index| {
                    for i in 0..count {
                        index.insert(&format!("habit_{}", i)).unwrap();
                    }
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let index = HabitIndex::new(IndexOptions {
        arena_capacity: 16 * 1024 * 1024,
        buckets: 256,
    })
    .unwrap();
    for i in 0..128 {
        index.insert(&format!("habit_{}", i)).unwrap();
    }

    let mut rng = rand::rng();
    c.bench_function("index_lookup", |b| {
        b.iter(|| {
            let i: u32 = rng.random_range(0..128);
            index.lookup(&format!("habit_{}", i)).unwrap().id()
        });
    });
}

criterion_group!(benches, bench_insert, bench_lookup);
criterion_main!(benches);
