// Allocator microbenchmarks: classification/routing overhead across a
// grid of slab sizes and growth factors.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use smallalloc::{AllocatorConfig, SmallAlloc};

const SLAB_SIZES: [usize; 3] = [4 * 1024 * 1024, 8 * 1024 * 1024, 16 * 1024 * 1024];
const FACTORS: [f64; 6] = [1.01, 1.03, 1.05, 1.1, 1.3, 1.5];

fn make_alloc(slab_size: usize, factor: f64) -> SmallAlloc {
    let config = AllocatorConfig::default()
        .with_slab_orders(vec![slab_size])
        .with_factor(factor);
    SmallAlloc::create(config).0
}

fn bench_alloc_free_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("alloc_free_cycle");

    for &slab_size in &SLAB_SIZES {
        for &factor in &FACTORS {
            let label = format!("slab={}KiB/factor={}", slab_size / 1024, factor);
            group.bench_with_input(BenchmarkId::new("small_object", label), &(slab_size, factor), |b, &(slab_size, factor)| {
                let mut alloc = make_alloc(slab_size, factor);
                b.iter(|| {
                    let ptr = alloc.smalloc(black_box(48)).expect("oom");
                    alloc.smfree(ptr, 48);
                });
            });
        }
    }
    group.finish();
}

fn bench_sustained_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("sustained_churn");

    for &factor in &FACTORS {
        group.bench_with_input(
            BenchmarkId::new("thousand_outstanding", factor),
            &factor,
            |b, &factor| {
                let mut alloc = make_alloc(4 * 1024 * 1024, factor);
                b.iter(|| {
                    let mut ptrs = Vec::with_capacity(1000);
                    for i in 0..1000 {
                        let size = 16 + (i % 64) * 8;
                        ptrs.push((alloc.smalloc(black_box(size)).expect("oom"), size));
                    }
                    for (ptr, size) in ptrs {
                        alloc.smfree(ptr, size);
                    }
                });
            },
        );
    }
    group.finish();
}

fn bench_large_passthrough(c: &mut Criterion) {
    let mut group = c.benchmark_group("large_passthrough");
    let mut alloc = make_alloc(4 * 1024 * 1024, 1.1);
    let big = alloc.objsize_max() * 8;

    group.bench_function("large_alloc_free", |b| {
        b.iter(|| {
            let ptr = alloc.smalloc(black_box(big)).expect("oom");
            alloc.smfree(ptr, big);
        });
    });
    group.finish();
}

criterion_group!(benches, bench_alloc_free_cycle, bench_sustained_churn, bench_large_passthrough);
criterion_main!(benches);
