//! Benchmarks for the parameter search and the full forecast pipeline.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use demand_forecast::core::ModelParameters;
use demand_forecast::detection::detect_and_treat;
use demand_forecast::engine::{ForecastEngine, PartialPeriod};
use demand_forecast::models::fit_and_forecast;
use demand_forecast::utils::search_best_parameters;

fn generate_monthly(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let t = i as f64;
            (1_000.0 + 200.0 * (2.0 * std::f64::consts::PI * t / 12.0).sin())
                * (1.0 + 0.05 * (t * 2.3).sin())
                + 4.0 * t
        })
        .collect()
}

fn bench_single_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("holt_winters_fit");

    for size in [36, 60, 120, 240].iter() {
        let series = generate_monthly(*size);
        group.bench_with_input(BenchmarkId::new("fit_and_forecast", size), size, |b, _| {
            b.iter(|| fit_and_forecast(black_box(&series), 12, 1, ModelParameters::FALLBACK))
        });
    }

    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("parameter_search");

    for size in [36, 60, 120].iter() {
        let series = generate_monthly(*size);
        group.bench_with_input(BenchmarkId::new("grid_441", size), size, |b, _| {
            b.iter(|| search_best_parameters(black_box(&series), 12, 1))
        });
    }

    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    let engine = ForecastEngine::default();

    for size in [36, 60, 120].iter() {
        let mut series = generate_monthly(*size);
        series[size / 2] *= 20.0;

        group.bench_with_input(BenchmarkId::new("outliers", size), size, |b, _| {
            b.iter(|| detect_and_treat(black_box(&series), 2.0))
        });

        group.bench_with_input(BenchmarkId::new("run", size), size, |b, _| {
            b.iter(|| engine.run(black_box(&series), Some(PartialPeriod::new(0.4, 450.0))))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_single_fit, bench_search, bench_pipeline);
criterion_main!(benches);
