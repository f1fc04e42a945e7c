//! Domain models for meter and temperature time series.
//!
//! Every table is column-oriented around a shared timestamp index and owns its
//! data: each processing stage consumes one table and returns a new one.
//! Missing values are `None`; `NaN` inputs are normalized to `None` on
//! construction so downstream arithmetic only has one notion of "missing".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::time::day_counts;

/// Instant type used throughout the engine.
pub type Timestamp = DateTime<Utc>;

fn normalize(value: Option<f64>) -> Option<f64> {
    value.filter(|v| !v.is_nan())
}

fn check_lengths(what: &str, index: usize, values: usize) -> Result<()> {
    if index != values {
        return Err(Error::InvalidInput(format!(
            "{} has {} timestamps but {} values",
            what, index, values
        )));
    }
    Ok(())
}

/// An ordered sequence of `(timestamp, value)` pairs.
///
/// # Examples
///
/// ```
/// use eemeter_rust::core::domain::TimeSeries;
/// use chrono::{TimeZone, Utc};
///
/// let series = TimeSeries::new(
///     vec![
///         Utc.with_ymd_and_hms(2018, 1, 1, 0, 0, 0).unwrap(),
///         Utc.with_ymd_and_hms(2018, 1, 2, 0, 0, 0).unwrap(),
///     ],
///     vec![Some(1.0), Some(f64::NAN)],
/// )
/// .unwrap();
///
/// assert_eq!(series.len(), 2);
/// assert_eq!(series.values()[1], None);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TimeSeries {
    timestamps: Vec<Timestamp>,
    values: Vec<Option<f64>>,
}

impl TimeSeries {
    pub fn new(timestamps: Vec<Timestamp>, values: Vec<Option<f64>>) -> Result<Self> {
        check_lengths("series", timestamps.len(), values.len())?;
        Ok(Self {
            timestamps,
            values: values.into_iter().map(normalize).collect(),
        })
    }

    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = (Timestamp, Option<f64>)>,
    {
        let (timestamps, values): (Vec<_>, Vec<_>) = points
            .into_iter()
            .map(|(t, v)| (t, normalize(v)))
            .unzip();
        Self { timestamps, values }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> &[Timestamp] {
        &self.timestamps
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (Timestamp, Option<f64>)> + '_ {
        self.timestamps.iter().copied().zip(self.values.iter().copied())
    }

    pub fn first_timestamp(&self) -> Option<Timestamp> {
        self.timestamps.first().copied()
    }

    pub fn last_timestamp(&self) -> Option<Timestamp> {
        self.timestamps.last().copied()
    }

    /// True when the series is empty or every value is missing.
    pub fn all_null(&self) -> bool {
        self.values.iter().all(Option::is_none)
    }

    /// Days to the next sample for each row; the last row is `NaN`.
    pub fn day_counts(&self) -> Vec<f64> {
        day_counts(&self.timestamps)
    }

    pub fn into_parts(self) -> (Vec<Timestamp>, Vec<Option<f64>>) {
        (self.timestamps, self.values)
    }
}

/// A single meter reading.
///
/// Replaces a nullable `estimated` flag: a reading is either an actual
/// measurement, a utility estimate, or missing altogether.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum MeterReading {
    Actual(f64),
    Estimated(f64),
    Missing,
}

impl MeterReading {
    /// Builds a reading from a raw value and an optional estimated flag.
    ///
    /// An absent flag means the reading is actual. A missing or `NaN` value is
    /// always [`MeterReading::Missing`].
    pub fn from_parts(value: Option<f64>, estimated: Option<bool>) -> Self {
        match (normalize(value), estimated) {
            (None, _) => MeterReading::Missing,
            (Some(v), Some(true)) => MeterReading::Estimated(v),
            (Some(v), _) => MeterReading::Actual(v),
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            MeterReading::Actual(v) | MeterReading::Estimated(v) => Some(*v),
            MeterReading::Missing => None,
        }
    }

    /// The value when this is an actual reading.
    pub fn unestimated_value(&self) -> Option<f64> {
        match self {
            MeterReading::Actual(v) => Some(*v),
            _ => None,
        }
    }

    /// The value when this is an estimated reading.
    pub fn estimated_value(&self) -> Option<f64> {
        match self {
            MeterReading::Estimated(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_estimated(&self) -> bool {
        matches!(self, MeterReading::Estimated(_))
    }
}

/// Raw meter data, each row carrying a [`MeterReading`].
///
/// `estimated_flags` records whether the source carried an estimated flag at
/// all. Billing cleaning folds estimates whenever the flag was supplied, even
/// when every read is actual.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MeterSeries {
    timestamps: Vec<Timestamp>,
    readings: Vec<MeterReading>,
    #[serde(default)]
    estimated_flags: bool,
}

impl MeterSeries {
    /// Meter data from explicit readings, which count as flagged.
    pub fn new(timestamps: Vec<Timestamp>, readings: Vec<MeterReading>) -> Result<Self> {
        check_lengths("meter series", timestamps.len(), readings.len())?;
        Ok(Self {
            timestamps,
            readings,
            estimated_flags: true,
        })
    }

    /// Meter data without estimated flags: every present value is actual.
    pub fn from_values(series: TimeSeries) -> Self {
        let (timestamps, values) = series.into_parts();
        let readings = values
            .into_iter()
            .map(|v| MeterReading::from_parts(v, None))
            .collect();
        Self {
            timestamps,
            readings,
            estimated_flags: false,
        }
    }

    /// Marks whether the source supplied estimated flags.
    pub fn with_estimated_flags(mut self, flagged: bool) -> Self {
        self.estimated_flags = flagged;
        self
    }

    pub fn has_estimated_flags(&self) -> bool {
        self.estimated_flags
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> &[Timestamp] {
        &self.timestamps
    }

    pub fn readings(&self) -> &[MeterReading] {
        &self.readings
    }

    pub fn all_missing(&self) -> bool {
        self.readings.iter().all(|r| r.value().is_none())
    }

    /// The reading values, dropping estimated flags.
    pub fn to_values(&self) -> TimeSeries {
        TimeSeries {
            timestamps: self.timestamps.clone(),
            values: self.readings.iter().map(MeterReading::value).collect(),
        }
    }

    pub fn into_parts(self) -> (Vec<Timestamp>, Vec<MeterReading>) {
        (self.timestamps, self.readings)
    }
}

/// Resampled values with the fraction of each period backed by source data.
///
/// `coverage` is `None` only for the trailing period appended so the index
/// reaches the end of the source series; every other period has a coverage in
/// `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CoverageTable {
    pub timestamps: Vec<Timestamp>,
    pub values: Vec<Option<f64>>,
    pub coverage: Vec<Option<f64>>,
}

impl CoverageTable {
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Drops the coverage column.
    pub fn into_series(self) -> TimeSeries {
        TimeSeries {
            timestamps: self.timestamps,
            values: self.values,
        }
    }
}

/// Cleaned meter data with a single canonical `meter_value` column.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MeterTable {
    series: TimeSeries,
}

impl MeterTable {
    pub const VALUE_COLUMN: &'static str = "meter_value";

    pub fn new(series: TimeSeries) -> Self {
        Self { series }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn timestamps(&self) -> &[Timestamp] {
        self.series.timestamps()
    }

    pub fn meter_value(&self) -> &[Option<f64>] {
        self.series.values()
    }

    pub fn as_series(&self) -> &TimeSeries {
        &self.series
    }

    pub fn into_series(self) -> TimeSeries {
        self.series
    }
}

/// One period of the merged meter and temperature table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SufficiencyRow {
    pub timestamp: Timestamp,
    pub meter_value: Option<f64>,
    pub temperature_mean: Option<f64>,
    /// Hourly temperature readings present in the period
    pub temperature_not_null: f64,
    /// Hourly temperature readings missing from the period
    pub temperature_null: f64,
}

impl SufficiencyRow {
    /// Share of the period's hourly temperatures that are present, `NaN` when
    /// the period expects none.
    pub fn temperature_coverage(&self) -> f64 {
        self.temperature_not_null / (self.temperature_not_null + self.temperature_null)
    }

    fn is_complete(&self) -> bool {
        self.meter_value.is_some() && self.temperature_mean.is_some()
    }
}

/// Input of the sufficiency evaluator, one row per meter period.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SufficiencyTable {
    pub rows: Vec<SufficiencyRow>,
}

impl SufficiencyTable {
    pub fn new(rows: Vec<SufficiencyRow>) -> Self {
        Self { rows }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn timestamps(&self) -> Vec<Timestamp> {
        self.rows.iter().map(|r| r.timestamp).collect()
    }

    /// True when no row has both a meter value and a mean temperature.
    pub fn has_no_complete_rows(&self) -> bool {
        !self.rows.iter().any(SufficiencyRow::is_complete)
    }
}

/// How a quantity behaves when a period is split or merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesType {
    /// Totals over a period (energy use): split proportionally, aggregate by sum
    #[default]
    Cumulative,
    /// Point-in-time state (temperature): copy, aggregate by mean
    Instantaneous,
}

impl FromStr for SeriesType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "cumulative" => Ok(SeriesType::Cumulative),
            "instantaneous" => Ok(SeriesType::Instantaneous),
            other => Err(Error::InvalidInput(format!(
                "Invalid series type: {}. Must be 'cumulative' or 'instantaneous'",
                other
            ))),
        }
    }
}

/// Native sampling interval of a meter series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceInterval {
    Hourly,
    Daily,
    BillingMonthly,
    BillingBimonthly,
    Unknown,
}

impl SourceInterval {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceInterval::Hourly => "hourly",
            SourceInterval::Daily => "daily",
            SourceInterval::BillingMonthly => "billing_monthly",
            SourceInterval::BillingBimonthly => "billing_bimonthly",
            SourceInterval::Unknown => "unknown",
        }
    }

    pub fn is_billing(&self) -> bool {
        matches!(
            self,
            SourceInterval::BillingMonthly | SourceInterval::BillingBimonthly
        )
    }

    /// Infers the minimum granularity of an index from its day counts.
    ///
    /// # Examples
    ///
    /// ```
    /// use eemeter_rust::core::domain::SourceInterval;
    /// use chrono::{TimeDelta, TimeZone, Utc};
    ///
    /// let start = Utc.with_ymd_and_hms(2018, 1, 1, 0, 0, 0).unwrap();
    /// let daily: Vec<_> = (0..5).map(|d| start + TimeDelta::days(d)).collect();
    /// assert_eq!(SourceInterval::infer(&daily), SourceInterval::Daily);
    /// ```
    pub fn infer(index: &[Timestamp]) -> Self {
        let counts: Vec<f64> = day_counts(index)
            .into_iter()
            .filter(|c| !c.is_nan())
            .collect();
        if counts.is_empty() {
            return SourceInterval::Unknown;
        }

        let max = counts.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = counts.iter().copied().fold(f64::INFINITY, f64::min);

        if max == 1.0 && min == 1.0 {
            SourceInterval::Daily
        } else if max < 1.0 {
            SourceInterval::Hourly
        } else if max >= 60.0 {
            SourceInterval::BillingBimonthly
        } else if max >= 30.0 {
            SourceInterval::BillingMonthly
        } else {
            SourceInterval::Unknown
        }
    }
}

impl fmt::Display for SourceInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceInterval {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "hourly" | "15min" | "30min" => Ok(SourceInterval::Hourly),
            "daily" => Ok(SourceInterval::Daily),
            "billing_monthly" => Ok(SourceInterval::BillingMonthly),
            "billing_bimonthly" => Ok(SourceInterval::BillingBimonthly),
            "unknown" => Ok(SourceInterval::Unknown),
            other => Err(Error::InvalidInput(format!(
                "Unknown source interval: {}",
                other
            ))),
        }
    }
}
