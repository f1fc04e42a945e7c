use pyo3::prelude::*;

use crate::core::domain::{MeterReading, MeterSeries, SeriesType, SourceInterval, TimeSeries};
use crate::config::BillingSettings;
use crate::python::{millis_from_timestamps, timestamps_from_millis};
use crate::time::Frequency;
use crate::transformations::{as_freq_with_coverage, clean_billing_data, ResampleOptions};

/// Resample a series given as epoch milliseconds and values
///
/// Returns `(timestamps_ms, values, coverage)`.
#[pyfunction]
#[pyo3(name = "as_freq", signature = (timestamps_ms, values, freq, series_type="cumulative", atomic_minutes=1))]
pub fn py_as_freq(
    timestamps_ms: Vec<i64>,
    values: Vec<Option<f64>>,
    freq: &str,
    series_type: &str,
    atomic_minutes: i64,
) -> PyResult<(Vec<i64>, Vec<Option<f64>>, Vec<Option<f64>>)> {
    let freq: Frequency = freq.parse()?;
    let series_type: SeriesType = series_type.parse()?;
    let series = TimeSeries::new(timestamps_from_millis(timestamps_ms)?, values)?;
    let options = ResampleOptions::new(series_type)
        .with_atomic(chrono::TimeDelta::minutes(atomic_minutes));

    let table = as_freq_with_coverage(&series, freq, &options)?;
    Ok((
        millis_from_timestamps(&table.timestamps),
        table.values,
        table.coverage,
    ))
}

/// Clean billing reads, folding estimated reads into the following actual read
///
/// Folding runs whenever `estimated` is given, even if every flag is false.
///
/// Returns `(timestamps_ms, meter_value)`.
#[pyfunction]
#[pyo3(name = "clean_billing_data", signature = (timestamps_ms, values, source_interval, estimated=None))]
pub fn py_clean_billing_data(
    timestamps_ms: Vec<i64>,
    values: Vec<Option<f64>>,
    source_interval: &str,
    estimated: Option<Vec<Option<bool>>>,
) -> PyResult<(Vec<i64>, Vec<Option<f64>>)> {
    let interval: SourceInterval = source_interval.parse()?;
    let flagged = estimated.is_some();
    let estimated = estimated.unwrap_or_else(|| vec![None; values.len()]);
    if estimated.len() != values.len() {
        return Err(pyo3::exceptions::PyValueError::new_err(format!(
            "estimated has {} entries but values has {}",
            estimated.len(),
            values.len()
        )));
    }

    let readings = values
        .into_iter()
        .zip(estimated)
        .map(|(value, flag)| MeterReading::from_parts(value, flag))
        .collect();
    let meter = MeterSeries::new(timestamps_from_millis(timestamps_ms)?, readings)?
        .with_estimated_flags(flagged);

    let table = clean_billing_data(meter, interval, &BillingSettings::default())?;
    Ok((
        millis_from_timestamps(table.timestamps()),
        table.meter_value().to_vec(),
    ))
}

pub fn register_transformation_functions(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(py_as_freq, m)?)?;
    m.add_function(wrap_pyfunction!(py_clean_billing_data, m)?)?;
    Ok(())
}
