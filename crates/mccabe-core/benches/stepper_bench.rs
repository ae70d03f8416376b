//! # Stepper Benchmarks
//!
//! Performance benchmarks for stage stepping, curve fitting and VLE
//! generation.
//!
//! Run with: `cargo bench -p mccabe-core`

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use mccabe_core::{
    Column, ComponentDatabase, Conditions, CurveFit, EquilibriumDataProvider, FeedCondition, Mode,
    PengRobinsonProvider, RelativeVolatility, StageStepper, sample_curve,
};
use std::hint::black_box;

fn feed_column(xb: f64) -> Column {
    let feed = FeedCondition::new(2.0, 1.0, 0.5).expect("feed");
    Column::new(0.95, xb, Mode::Feed(feed)).expect("column")
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_stepping(c: &mut Criterion) {
    let mut group = c.benchmark_group("stepping");
    let curve = RelativeVolatility::new(2.5).expect("alpha");
    let stepper = StageStepper::new();

    for xb in [0.1, 0.01, 0.001].iter() {
        let column = feed_column(*xb);
        group.bench_with_input(BenchmarkId::from_parameter(xb), &column, |b, column| {
            b.iter(|| black_box(stepper.run(&curve, column)));
        });
    }

    group.finish();
}

fn bench_curve_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("curve_fit");
    let curve = RelativeVolatility::new(2.5).expect("alpha");
    let samples = sample_curve(&curve, 101);

    for degree in [5, 15, 30].iter() {
        let fit = CurveFit::Polynomial { degree: *degree };
        group.bench_with_input(BenchmarkId::from_parameter(degree), &fit, |b, fit| {
            b.iter(|| black_box(fit.fit(&samples).is_ok()));
        });
    }

    group.finish();
}

fn bench_fitted_stepping(c: &mut Criterion) {
    let curve = RelativeVolatility::new(2.5).expect("alpha");
    let fitted = CurveFit::default()
        .fit(&sample_curve(&curve, 101))
        .expect("fit");
    let column = feed_column(0.05);
    let stepper = StageStepper::new();

    c.bench_function("fitted_stepping", |b| {
        b.iter(|| black_box(stepper.run(fitted.as_ref(), &column)));
    });
}

fn bench_vle(c: &mut Criterion) {
    let mut group = c.benchmark_group("vle");
    group.sample_size(10);
    let db = ComponentDatabase::builtin().expect("builtin");

    for (name, conditions) in [
        ("isobaric", Conditions::Isobaric { pressure: 101_325.0 }),
        ("isothermal", Conditions::Isothermal { temperature: 360.0 }),
    ] {
        let provider = PengRobinsonProvider::from_database(&db, "benzene", "toluene", conditions)
            .expect("provider");
        group.bench_function(name, |b| {
            b.iter(|| black_box(provider.equilibrium_curve(21).is_ok()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_stepping,
    bench_curve_fit,
    bench_fitted_stepping,
    bench_vle
);
criterion_main!(benches);
