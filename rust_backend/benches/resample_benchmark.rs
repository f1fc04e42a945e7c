use chrono::{TimeZone, TimeDelta, Utc};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use eemeter_rust::core::domain::{MeterReading, MeterSeries, TimeSeries, Timestamp};
use eemeter_rust::time::Frequency;
use eemeter_rust::transformations::{as_freq_with_coverage, reconcile_estimated, ResampleOptions};
use std::hint::black_box;

fn start() -> Timestamp {
    Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap()
}

fn hourly_series(hours: usize) -> TimeSeries {
    TimeSeries::from_points((0..hours).map(|h| {
        let value = if h % 97 == 0 { None } else { Some((h % 24) as f64 * 0.5) };
        (start() + TimeDelta::hours(h as i64), value)
    }))
}

fn monthly_billing(periods: usize) -> MeterSeries {
    let timestamps = (0..periods)
        .map(|i| start() + TimeDelta::days(30 * i as i64))
        .collect();
    let readings = (0..periods)
        .map(|i| match i % 5 {
            1 => MeterReading::Estimated(80.0),
            4 => MeterReading::Missing,
            _ => MeterReading::Actual(100.0 + i as f64),
        })
        .collect();
    MeterSeries::new(timestamps, readings).unwrap()
}

fn bench_hourly_to_daily(c: &mut Criterion) {
    let mut group = c.benchmark_group("hourly_to_daily");
    let options = ResampleOptions::cumulative();

    for days in [30usize, 365, 730] {
        let series = hourly_series(days * 24);
        group.bench_with_input(BenchmarkId::from_parameter(days), &series, |b, input| {
            b.iter(|| as_freq_with_coverage(black_box(input), Frequency::Daily, &options));
        });
    }

    group.finish();
}

fn bench_daily_to_monthly(c: &mut Criterion) {
    let mut group = c.benchmark_group("daily_to_monthly");
    let options = ResampleOptions::cumulative().with_atomic(TimeDelta::days(1));
    let series = TimeSeries::from_points(
        (0..730).map(|d| (start() + TimeDelta::days(d), Some(d as f64 % 17.0))),
    );

    group.bench_function("two_years", |b| {
        b.iter(|| as_freq_with_coverage(black_box(&series), Frequency::Monthly, &options));
    });

    group.finish();
}

fn bench_billing_reconciliation(c: &mut Criterion) {
    let mut group = c.benchmark_group("billing_reconciliation");

    for periods in [12usize, 120] {
        let meter = monthly_billing(periods);
        group.bench_with_input(BenchmarkId::new("periods", periods), &meter, |b, input| {
            b.iter(|| reconcile_estimated(black_box(input)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_hourly_to_daily,
    bench_daily_to_monthly,
    bench_billing_reconciliation
);
criterion_main!(benches);
