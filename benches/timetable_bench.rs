//! Criterion benchmarks for u-timetable.
//!
//! Uses seeded synthetic instances to measure model building, first-solution
//! search and capped anytime runs.

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use u_timetable::config::{RelaxationLevel, TimetableConfig};
use u_timetable::cp::{Deadline, SearchEngine, TimetableCpBuilder};
use u_timetable::generator::InstanceGenerator;
use u_timetable::models::{Dataset, SlotGrid};

fn instance(classes: usize) -> Dataset {
    InstanceGenerator::new(2024)
        .with_classes(classes)
        .with_courses_per_class(3)
        .with_teachers(classes + 1)
        .with_unavailability_rate(0.05)
        .generate(&SlotGrid::default())
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    let config = TimetableConfig::default();
    let level = RelaxationLevel::strict("full");

    for classes in [1, 2, 4] {
        let dataset = instance(classes);
        group.bench_with_input(BenchmarkId::from_parameter(classes), &dataset, |b, d| {
            b.iter(|| {
                let builder = TimetableCpBuilder::new(d, &config);
                black_box(builder.build(&level).ok())
            })
        });
    }
    group.finish();
}

fn bench_find_first(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_first");
    group.sample_size(10);
    let config = TimetableConfig::default();
    let level = RelaxationLevel::strict("full").without_online_same_day();

    for classes in [1, 2, 3] {
        let dataset = instance(classes);
        let Ok(model) = TimetableCpBuilder::new(&dataset, &config).build(&level) else {
            continue;
        };
        group.bench_with_input(BenchmarkId::from_parameter(classes), &model, |b, m| {
            b.iter(|| {
                let engine = SearchEngine::new(m);
                black_box(engine.find_first(&Deadline::after(Duration::from_secs(2))))
            })
        });
    }
    group.finish();
}

fn bench_cascade(c: &mut Criterion) {
    let mut group = c.benchmark_group("cascade");
    group.sample_size(10);

    for cap in [10, 100] {
        let dataset = instance(2);
        let config = TimetableConfig::default()
            .with_time_budget(Duration::from_secs(2))
            .with_max_solutions(cap);
        group.bench_with_input(BenchmarkId::from_parameter(cap), &config, |b, cfg| {
            b.iter(|| black_box(u_timetable::solve(&dataset, cfg).ok()))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build, bench_find_first, bench_cascade);
criterion_main!(benches);
