//! Strategy and cache benchmarks.
//!
//! Run with:
//! ```bash
//! cargo bench --bench engine
//! ```

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use stirling_rs::config::EngineConfig;
use stirling_rs::engine::Engine;
use stirling_rs::triangle::generate_triangle_parallel;
use stirling_rs::types::{Method, Params};

fn bench_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("strategy");
    let params = Params::new(0.5, 0.7).unwrap();

    for (n, k) in [(20, 10), (40, 20), (60, 55)] {
        for method in [
            Method::Triangular,
            Method::BottomUp,
            Method::Explicit,
            Method::Horizontal,
            Method::Vertical,
            Method::Symmetric,
        ] {
            group.bench_with_input(
                BenchmarkId::new(method.tag(), format!("{}-{}", n, k)),
                &(n, k),
                |b, &(n, k)| {
                    b.iter(|| {
                        // Fresh engine so the memory cache does not answer.
                        let engine = Engine::new(params, EngineConfig::default());
                        engine.compute_value(n, k, method).ok()
                    })
                },
            );
        }
    }

    group.finish();
}

fn bench_log_space(c: &mut Criterion) {
    let mut group = c.benchmark_group("log_space");
    let params = Params::lah();

    for n in [200u64, 500, 1000] {
        group.bench_with_input(BenchmarkId::new("bottom_up", n), &n, |b, &n| {
            b.iter(|| {
                let engine = Engine::new(params, EngineConfig::default());
                engine.compute_value(n, 10, Method::BottomUp).unwrap()
            })
        });
    }

    group.finish();
}

fn bench_memory_cache_hit(c: &mut Criterion) {
    let engine = Engine::new(Params::second_kind(), EngineConfig::default());
    engine.compute(80, 30).unwrap();

    c.bench_function("memory_hit", |b| b.iter(|| engine.compute(80, 30).unwrap()));
}

fn bench_triangle(c: &mut Criterion) {
    let mut group = c.benchmark_group("triangle");
    group.sample_size(20);
    let params = Params::new(1.0, 0.5).unwrap();

    for n_max in [30u64, 60] {
        group.throughput(Throughput::Elements((n_max + 1) * (n_max + 2) / 2));
        group.bench_with_input(BenchmarkId::new("sequential", n_max), &n_max, |b, &n_max| {
            b.iter(|| {
                let engine = Engine::new(params, EngineConfig::default());
                engine.generate_triangle(n_max, false).unwrap()
            })
        });
        group.bench_with_input(BenchmarkId::new("parallel", n_max), &n_max, |b, &n_max| {
            b.iter(|| generate_triangle_parallel(params, &EngineConfig::default(), n_max, 4, false).unwrap())
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_strategies,
    bench_log_space,
    bench_memory_cache_hit,
    bench_triangle
);
criterion_main!(benches);
