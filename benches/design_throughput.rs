use bws_core::{ItemPool, RngHandle};
use bws_design::{generate, DesignParams, Strategy};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

fn pool(size: usize) -> ItemPool {
    ItemPool::new((0..size).map(|idx| format!("item{idx:03}")))
}

fn bench_strategies(c: &mut Criterion) {
    let pool = pool(60);
    let mut group = c.benchmark_group("design_throughput");
    for strategy in Strategy::ALL {
        let params = DesignParams::new(pool.len() * 8 / 4, 4, strategy);
        group.bench_with_input(BenchmarkId::from_parameter(strategy), &params, |b, params| {
            b.iter(|| {
                let mut rng = RngHandle::from_seed(7);
                generate(&pool, params, &mut rng).expect("design")
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_strategies);
criterion_main!(benches);
