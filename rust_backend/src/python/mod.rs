//! Python bindings for the resampling and sufficiency engine.
//!
//! Timestamps cross the boundary as epoch milliseconds (UTC) and values as
//! lists of optional floats, so callers can pass pandas columns through
//! `.astype("int64") // 10**6` and `.tolist()` without extra dependencies.
//!
//! # Modules
//!
//! - [`transformations`]: `as_freq` and `clean_billing_data`
//! - [`algorithms`]: `sufficiency_criteria` and the `Warning` class
//!
//! # Python API
//!
//! All functions are available in the `eemeter_rust` Python module after
//! installation with the `python` feature enabled.

pub mod algorithms;
pub mod transformations;

pub use algorithms::*;
pub use transformations::*;

use chrono::DateTime;
use pyo3::exceptions::{PyRuntimeError, PyTypeError, PyValueError};
use pyo3::prelude::*;

use crate::core::domain::Timestamp;
use crate::error::Error;

impl From<Error> for PyErr {
    fn from(err: Error) -> PyErr {
        match err {
            Error::TypeMismatch(_) => PyTypeError::new_err(err.to_string()),
            Error::Polars(_) => PyRuntimeError::new_err(err.to_string()),
            _ => PyValueError::new_err(err.to_string()),
        }
    }
}

pub(crate) fn timestamps_from_millis(millis: Vec<i64>) -> PyResult<Vec<Timestamp>> {
    millis
        .into_iter()
        .map(|ms| {
            DateTime::from_timestamp_millis(ms).ok_or_else(|| {
                PyValueError::new_err(format!("Timestamp out of range: {} ms", ms))
            })
        })
        .collect()
}

pub(crate) fn millis_from_timestamps(timestamps: &[Timestamp]) -> Vec<i64> {
    timestamps.iter().map(|t| t.timestamp_millis()).collect()
}

/// eemeter Rust backend - meter data resampling and sufficiency checks
#[pymodule]
fn eemeter_rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    register_transformation_functions(m)?;
    register_algorithm_functions(m)?;
    Ok(())
}
