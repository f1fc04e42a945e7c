use chrono::{TimeDelta, TimeZone, Utc};
use polars::prelude::*;

use crate::core::domain::{TimeSeries, Timestamp};
use crate::error::Error;
use crate::time::Frequency;
use crate::transformations::resample::{as_freq, as_freq_frame, as_freq_with_coverage, ResampleOptions};

fn start() -> Timestamp {
    Utc.with_ymd_and_hms(2018, 1, 1, 0, 0, 0).unwrap()
}

fn hourly(values: &[Option<f64>]) -> TimeSeries {
    TimeSeries::from_points(
        values
            .iter()
            .enumerate()
            .map(|(h, v)| (start() + TimeDelta::hours(h as i64), *v)),
    )
}

fn assert_close(actual: Option<f64>, expected: f64) {
    let actual = actual.expect("expected a value");
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {}, got {}",
        expected,
        actual
    );
}

#[test]
fn test_cumulative_hourly_to_daily() {
    let series = hourly(&[Some(1.0); 48]);
    let table =
        as_freq_with_coverage(&series, Frequency::Daily, &ResampleOptions::cumulative()).unwrap();

    assert_eq!(
        table.timestamps,
        vec![
            start(),
            start() + TimeDelta::days(1),
            start() + TimeDelta::days(2)
        ]
    );
    assert_close(table.values[0], 24.0);
    // The last hour has no known span, so only 23 hours are spread
    assert_close(table.values[1], 23.0);
    assert_eq!(table.values[2], None);

    assert_eq!(table.coverage[0], Some(1.0));
    assert_close(table.coverage[1], 1380.0 / 1440.0);
    assert_eq!(table.coverage[2], None);
}

#[test]
fn test_instantaneous_hourly_to_daily() {
    let values: Vec<Option<f64>> = (0..48).map(|h| Some(h as f64)).collect();
    let table = as_freq_with_coverage(
        &hourly(&values),
        Frequency::Daily,
        &ResampleOptions::instantaneous(),
    )
    .unwrap();

    assert_close(table.values[0], 11.5);
    let day_two = (60.0 * (24..47).map(|h| h as f64).sum::<f64>() + 47.0) / 1381.0;
    assert_close(table.values[1], day_two);
    assert_close(table.coverage[1], 1381.0 / 1440.0);
    assert_eq!(table.values[2], None);
}

#[test]
fn test_cumulative_daily_to_monthly() {
    let series = TimeSeries::from_points((0..60).map(|d| (start() + TimeDelta::days(d), Some(1.0))));
    let options = ResampleOptions::cumulative().with_atomic(TimeDelta::days(1));
    let table = as_freq_with_coverage(&series, Frequency::Monthly, &options).unwrap();

    assert_eq!(table.len(), 3);
    assert_eq!(
        table.timestamps[2],
        Utc.with_ymd_and_hms(2018, 3, 1, 0, 0, 0).unwrap()
    );
    assert_close(table.values[0], 31.0);
    assert_close(table.values[1], 28.0);
    assert_eq!(table.values[2], None);
    assert_eq!(table.coverage[0], Some(1.0));
    assert_eq!(table.coverage[1], Some(1.0));
    assert_eq!(table.coverage[2], Some(0.0));
}

#[test]
fn test_cumulative_bin_with_missing_start_is_null() {
    let mut values = vec![None];
    values.extend(std::iter::repeat(Some(1.0)).take(24));
    let options = ResampleOptions::cumulative().with_atomic(TimeDelta::hours(1));
    let table = as_freq_with_coverage(&hourly(&values), Frequency::Daily, &options).unwrap();

    assert_eq!(table.len(), 2);
    assert_eq!(table.values[0], None);
    assert_close(table.coverage[0], 23.0 / 24.0);
    assert_eq!(table.values[1], None);
    assert_eq!(table.coverage[1], Some(0.0));
}

#[test]
fn test_instantaneous_ignores_missing_points() {
    let values = vec![Some(10.0), None, Some(20.0), Some(20.0)];
    let options = ResampleOptions::instantaneous().with_atomic(TimeDelta::hours(1));
    let series = as_freq(&hourly(&values), Frequency::Daily, &options).unwrap();

    assert_eq!(series.len(), 2);
    assert_close(series.values()[0], 50.0 / 3.0);
    assert_eq!(series.values()[1], None);
}

#[test]
fn test_spread_follows_row_span() {
    // 6 units over two hours, then 1 unit over one hour
    let series = TimeSeries::from_points(vec![
        (start(), Some(6.0)),
        (start() + TimeDelta::hours(2), Some(1.0)),
        (start() + TimeDelta::hours(3), None),
    ]);
    let options = ResampleOptions::cumulative().with_atomic(TimeDelta::minutes(30));
    let table = as_freq_with_coverage(&series, Frequency::Hours(1), &options).unwrap();

    assert_eq!(table.len(), 4);
    assert_close(table.values[0], 3.0);
    assert_close(table.values[1], 3.0);
    assert_close(table.values[2], 1.0);
    assert_eq!(table.values[3], None);
}

#[test]
fn test_duplicates_removed_before_resampling() {
    let series = TimeSeries::from_points(vec![
        (start(), Some(2.0)),
        (start(), Some(500.0)),
        (start() + TimeDelta::hours(1), Some(4.0)),
        (start() + TimeDelta::hours(2), Some(4.0)),
    ]);
    let options = ResampleOptions::instantaneous().with_atomic(TimeDelta::hours(1));
    let series = as_freq(&series, Frequency::Hours(1), &options).unwrap();
    assert_eq!(series.values()[0], Some(2.0));
}

#[test]
fn test_trailing_period_appended() {
    let series = TimeSeries::from_points(vec![
        (start(), Some(1.0)),
        (start() + TimeDelta::hours(30), Some(1.0)),
    ]);
    let options = ResampleOptions::instantaneous().with_atomic(TimeDelta::hours(1));
    let table = as_freq_with_coverage(&series, Frequency::Daily, &options).unwrap();

    assert_eq!(table.timestamps.last(), Some(&(start() + TimeDelta::days(2))));
    assert_eq!(table.values.last(), Some(&None));
    assert_eq!(table.coverage.last(), Some(&None));
}

#[test]
fn test_empty_series() {
    let table = as_freq_with_coverage(
        &TimeSeries::empty(),
        Frequency::Daily,
        &ResampleOptions::default(),
    )
    .unwrap();
    assert!(table.is_empty());
}

#[test]
fn test_single_row() {
    let series = hourly(&[Some(5.0)]);
    let table =
        as_freq_with_coverage(&series, Frequency::Daily, &ResampleOptions::instantaneous()).unwrap();
    assert_eq!(table.timestamps, vec![start()]);
    assert_eq!(table.values, vec![Some(5.0)]);
}

#[test]
fn test_non_positive_atomic_rejected() {
    let options = ResampleOptions::default().with_atomic(TimeDelta::zero());
    let result = as_freq(&hourly(&[Some(1.0)]), Frequency::Daily, &options);
    assert!(matches!(result, Err(Error::InvalidInput(_))));

    let result = as_freq(
        &hourly(&[Some(1.0)]),
        Frequency::Minutes(0),
        &ResampleOptions::default(),
    );
    assert!(matches!(result, Err(Error::InvalidInput(_))));
}

#[test]
fn test_coverage_bounded() {
    let values: Vec<Option<f64>> = (0..100)
        .map(|h| if h % 7 == 0 { None } else { Some(1.0) })
        .collect();
    let options = ResampleOptions::cumulative().with_atomic(TimeDelta::minutes(15));
    let table = as_freq_with_coverage(&hourly(&values), Frequency::Daily, &options).unwrap();

    for coverage in table.coverage.iter().flatten() {
        assert!((0.0..=1.0).contains(coverage));
    }
}

fn hourly_frame(extra_column: bool) -> DataFrame {
    let timestamps: Vec<i64> = (0..48)
        .map(|h| (start() + TimeDelta::hours(h)).timestamp_millis())
        .collect();
    let time = Series::new("timestamp".into(), timestamps)
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
        .unwrap();
    let mut columns = vec![
        time.into_column(),
        Series::new("value".into(), vec![1.0f64; 48]).into_column(),
    ];
    if extra_column {
        columns.push(Series::new("other".into(), vec![0.0f64; 48]).into_column());
    }
    DataFrame::new(columns).unwrap()
}

#[test]
fn test_frame_resampling() {
    let df = hourly_frame(false);
    let out = as_freq_frame(
        &df,
        "timestamp",
        Frequency::Daily,
        &ResampleOptions::cumulative(),
        true,
    )
    .unwrap();

    assert_eq!(out.height(), 3);
    assert_eq!(
        out.get_column_names()
            .iter()
            .map(|n| n.as_str())
            .collect::<Vec<_>>(),
        vec!["timestamp", "value", "coverage"]
    );
    let values = out.column("value").unwrap().f64().unwrap();
    assert!((values.get(0).unwrap() - 24.0).abs() < 1e-9);
}

#[test]
fn test_frame_with_extra_columns_rejected() {
    let df = hourly_frame(true);
    let result = as_freq_frame(
        &df,
        "timestamp",
        Frequency::Daily,
        &ResampleOptions::cumulative(),
        false,
    );
    assert!(matches!(result, Err(Error::TypeMismatch(_))));
}
