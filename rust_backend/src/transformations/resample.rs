//! Frequency conversion through an atomic intermediate grid.
//!
//! Source rows are spread over a fine grid (one minute by default) starting at
//! the first timestamp and ending at or before the last. Each grid point takes
//! the value of the latest source row at or before it, and the grid points are
//! then aggregated into calendar bins of the target [`Frequency`]:
//!
//! - cumulative series are scaled by `atomic / row span` before spreading and
//!   summed per bin; a bin whose first grid point is missing is nulled
//! - instantaneous series are spread unscaled and averaged per bin
//!
//! The grid is walked once without being materialized.

use chrono::TimeDelta;
use log::debug;
use polars::prelude::*;

use crate::core::domain::{CoverageTable, SeriesType, TimeSeries, Timestamp};
use crate::error::{Error, Result};
use crate::io::frames;
use crate::time::Frequency;
use crate::transformations::cleaning::Deduplicate;

/// Atomic interval and aggregation mode of a resampling run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResampleOptions {
    pub atomic: TimeDelta,
    pub series_type: SeriesType,
}

impl Default for ResampleOptions {
    fn default() -> Self {
        Self {
            atomic: TimeDelta::minutes(1),
            series_type: SeriesType::Cumulative,
        }
    }
}

impl ResampleOptions {
    pub fn new(series_type: SeriesType) -> Self {
        Self {
            series_type,
            ..Self::default()
        }
    }

    pub fn cumulative() -> Self {
        Self::new(SeriesType::Cumulative)
    }

    pub fn instantaneous() -> Self {
        Self::new(SeriesType::Instantaneous)
    }

    pub fn with_atomic(mut self, atomic: TimeDelta) -> Self {
        self.atomic = atomic;
        self
    }

    fn atomic_millis(&self, freq: Frequency) -> Result<i64> {
        let atomic_ms = self.atomic.num_milliseconds();
        if atomic_ms <= 0 {
            return Err(Error::InvalidInput(format!(
                "Atomic interval must be positive, got {} ms",
                atomic_ms
            )));
        }
        if let Some(width) = freq.fixed_width() {
            if width.num_milliseconds() <= 0 {
                return Err(Error::InvalidInput(format!(
                    "Target frequency {} has no width",
                    freq
                )));
            }
        }
        Ok(atomic_ms)
    }
}

/// Value each source row contributes to every grid point it covers.
fn atomic_values(series: &TimeSeries, atomic_ms: i64, series_type: SeriesType) -> Vec<Option<f64>> {
    match series_type {
        SeriesType::Instantaneous => series.values().to_vec(),
        SeriesType::Cumulative => {
            let timestamps = series.timestamps();
            series
                .values()
                .iter()
                .enumerate()
                .map(|(i, value)| {
                    let span_ms = timestamps
                        .get(i + 1)
                        .map(|next| (*next - timestamps[i]).num_milliseconds())?;
                    value.map(|v| v * atomic_ms as f64 / span_ms as f64)
                })
                .collect()
        }
    }
}

/// Accumulator for one target bin.
struct Bin {
    start: Timestamp,
    end: Timestamp,
    sum: f64,
    present: usize,
    first_missing: bool,
    points: usize,
}

impl Bin {
    fn new(freq: Frequency, start: Timestamp) -> Self {
        Self {
            start,
            end: freq.next(start),
            sum: 0.0,
            present: 0,
            first_missing: false,
            points: 0,
        }
    }

    fn push(&mut self, value: Option<f64>) {
        if self.points == 0 {
            self.first_missing = value.is_none();
        }
        self.points += 1;
        if let Some(v) = value {
            self.sum += v;
            self.present += 1;
        }
    }

    fn value(&self, series_type: SeriesType) -> Option<f64> {
        match series_type {
            SeriesType::Cumulative if self.points == 0 || self.first_missing => None,
            SeriesType::Cumulative => Some(self.sum),
            SeriesType::Instantaneous if self.present == 0 => None,
            SeriesType::Instantaneous => Some(self.sum / self.present as f64),
        }
    }

    fn coverage(&self, atomic_ms: i64) -> f64 {
        let expected = (self.end - self.start).num_milliseconds() as f64 / atomic_ms as f64;
        (self.present as f64 / expected).min(1.0)
    }

    fn close(&self, table: &mut CoverageTable, series_type: SeriesType, atomic_ms: i64) {
        table.timestamps.push(self.start);
        table.values.push(self.value(series_type));
        table.coverage.push(Some(self.coverage(atomic_ms)));
    }
}

/// Resamples `series` to `freq`, reporting per-period coverage.
///
/// Duplicated timestamps are removed first (first occurrence wins). When the
/// last label falls before the last source timestamp, one more label is
/// appended with a missing value and no coverage, so the index reaches the end
/// of the source.
///
/// # Errors
///
/// [`Error::InvalidInput`] when the atomic interval is not positive.
///
/// # Examples
///
/// ```
/// use eemeter_rust::core::domain::TimeSeries;
/// use eemeter_rust::time::Frequency;
/// use eemeter_rust::transformations::resample::{as_freq_with_coverage, ResampleOptions};
/// use chrono::{TimeDelta, TimeZone, Utc};
///
/// let start = Utc.with_ymd_and_hms(2018, 1, 1, 0, 0, 0).unwrap();
/// let series = TimeSeries::from_points((0..=48).map(|h| (start + TimeDelta::hours(h), Some(1.0))));
///
/// let daily = as_freq_with_coverage(&series, Frequency::Daily, &ResampleOptions::default()).unwrap();
/// assert_eq!(daily.len(), 3);
/// assert!((daily.values[0].unwrap() - 24.0).abs() < 1e-9);
/// assert_eq!(daily.coverage[0], Some(1.0));
/// ```
pub fn as_freq_with_coverage(
    series: &TimeSeries,
    freq: Frequency,
    options: &ResampleOptions,
) -> Result<CoverageTable> {
    let atomic_ms = options.atomic_millis(freq)?;
    let series = series.clone().deduplicated();
    let (Some(first), Some(last)) = (series.first_timestamp(), series.last_timestamp()) else {
        return Ok(CoverageTable::default());
    };

    let spread = atomic_values(&series, atomic_ms, options.series_type);
    let timestamps = series.timestamps();
    let steps = (last - first).num_milliseconds() / atomic_ms;

    let mut table = CoverageTable::default();
    let mut bin = Bin::new(freq, freq.floor(first));
    let mut source = 0usize;

    for step in 0..=steps {
        let point = first + TimeDelta::milliseconds(step * atomic_ms);
        while source + 1 < timestamps.len() && timestamps[source + 1] <= point {
            source += 1;
        }
        while point >= bin.end {
            bin.close(&mut table, options.series_type, atomic_ms);
            bin = Bin::new(freq, bin.end);
        }
        bin.push(spread[source]);
    }
    bin.close(&mut table, options.series_type, atomic_ms);

    if let Some(&label) = table.timestamps.last() {
        if label < last {
            table.timestamps.push(freq.next(label));
            table.values.push(None);
            table.coverage.push(None);
        }
    }

    debug!(
        "Resampled {} rows to {} periods at {} ({:?})",
        series.len(),
        table.len(),
        freq,
        options.series_type
    );
    Ok(table)
}

/// Resamples `series` to `freq`, dropping the coverage column.
pub fn as_freq(series: &TimeSeries, freq: Frequency, options: &ResampleOptions) -> Result<TimeSeries> {
    Ok(as_freq_with_coverage(series, freq, options)?.into_series())
}

/// Resamples a two-column frame (`time_col` plus one value column).
///
/// The output keeps the value column name and gains a `coverage` column when
/// `include_coverage` is set.
///
/// # Errors
///
/// [`Error::TypeMismatch`] unless the frame holds exactly the time column and
/// one numeric value column.
pub fn as_freq_frame(
    df: &DataFrame,
    time_col: &str,
    freq: Frequency,
    options: &ResampleOptions,
    include_coverage: bool,
) -> Result<DataFrame> {
    let value_col = frames::single_value_column(df, time_col)?;
    let series = frames::time_series_from_frame(df, time_col, &value_col)?;
    let table = as_freq_with_coverage(&series, freq, options)?;
    frames::coverage_table_to_frame(&table, time_col, &value_col, include_coverage)
}
