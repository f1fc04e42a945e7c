use pyo3::prelude::*;

use crate::algorithms::caltrack_sufficiency_criteria;
use crate::config::SufficiencyConfig;
use crate::core::domain::{SufficiencyRow, SufficiencyTable};
use crate::core::warning::Warning;
use crate::python::timestamps_from_millis;

/// Python wrapper for Warning
#[pyclass(name = "Warning")]
#[derive(Clone)]
pub struct PyWarning {
    #[pyo3(get)]
    pub qualified_name: String,
    #[pyo3(get)]
    pub description: String,
    /// Diagnostic fields as a JSON object
    #[pyo3(get)]
    pub data_json: String,
}

#[pymethods]
impl PyWarning {
    fn __repr__(&self) -> String {
        format!(
            "Warning(qualified_name={}, data={})",
            self.qualified_name, self.data_json
        )
    }
}

impl From<Warning> for PyWarning {
    fn from(warning: Warning) -> Self {
        PyWarning {
            qualified_name: warning.qualified_name().to_string(),
            description: warning.description().to_string(),
            data_json: serde_json::Value::Object(warning.data().clone()).to_string(),
        }
    }
}

/// Evaluate the CalTRACK sufficiency criteria over merged columns
///
/// Returns `(critical_warnings, non_critical_warnings)`.
#[pyfunction]
#[pyo3(
    name = "sufficiency_criteria",
    signature = (
        timestamps_ms,
        meter_value,
        temperature_mean,
        temperature_not_null,
        temperature_null,
        requested_start_ms=None,
        requested_end_ms=None,
        num_days=365,
        min_fraction_daily_coverage=0.9,
        min_fraction_hourly_temperature_coverage_per_period=0.9,
        is_reporting_data=false,
    )
)]
#[allow(clippy::too_many_arguments)]
pub fn py_sufficiency_criteria(
    timestamps_ms: Vec<i64>,
    meter_value: Vec<Option<f64>>,
    temperature_mean: Vec<Option<f64>>,
    temperature_not_null: Vec<f64>,
    temperature_null: Vec<f64>,
    requested_start_ms: Option<i64>,
    requested_end_ms: Option<i64>,
    num_days: i64,
    min_fraction_daily_coverage: f64,
    min_fraction_hourly_temperature_coverage_per_period: f64,
    is_reporting_data: bool,
) -> PyResult<(Vec<PyWarning>, Vec<PyWarning>)> {
    let n = timestamps_ms.len();
    let lengths = [
        meter_value.len(),
        temperature_mean.len(),
        temperature_not_null.len(),
        temperature_null.len(),
    ];
    if lengths.iter().any(|len| *len != n) {
        return Err(pyo3::exceptions::PyValueError::new_err(format!(
            "All columns must have {} entries, got {:?}",
            n, lengths
        )));
    }

    let timestamps = timestamps_from_millis(timestamps_ms)?;
    let rows = (0..n)
        .map(|i| SufficiencyRow {
            timestamp: timestamps[i],
            meter_value: meter_value[i].filter(|v| !v.is_nan()),
            temperature_mean: temperature_mean[i].filter(|v| !v.is_nan()),
            temperature_not_null: temperature_not_null[i],
            temperature_null: temperature_null[i],
        })
        .collect();

    let requested_start = requested_start_ms
        .map(|ms| timestamps_from_millis(vec![ms]).map(|t| t[0]))
        .transpose()?;
    let requested_end = requested_end_ms
        .map(|ms| timestamps_from_millis(vec![ms]).map(|t| t[0]))
        .transpose()?;

    let config = SufficiencyConfig {
        num_days,
        min_fraction_daily_coverage,
        min_fraction_hourly_temperature_coverage_per_period,
        is_reporting_data,
    };
    let report = caltrack_sufficiency_criteria(
        SufficiencyTable::new(rows),
        requested_start,
        requested_end,
        &config,
    )?;

    Ok((
        report.critical_warnings.into_iter().map(PyWarning::from).collect(),
        report
            .non_critical_warnings
            .into_iter()
            .map(PyWarning::from)
            .collect(),
    ))
}

pub fn register_algorithm_functions(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyWarning>()?;
    m.add_function(wrap_pyfunction!(py_sufficiency_criteria, m)?)?;
    Ok(())
}
