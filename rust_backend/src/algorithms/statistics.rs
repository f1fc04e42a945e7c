use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Robust summary of meter values used to flag extreme readings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quartiles {
    pub median: f64,
    pub lower_quantile: f64,
    pub upper_quantile: f64,
    pub max_value: f64,
}

impl Quartiles {
    /// Median, 25th and 75th percentile (linear interpolation) and maximum of
    /// the present values. `None` when no value is present.
    pub fn of(values: &[Option<f64>]) -> Result<Option<Self>> {
        let present: Vec<f64> = values.iter().flatten().copied().collect();
        let ca = Float64Chunked::from_vec("meter_value".into(), present);

        let stats = (
            ca.median(),
            ca.quantile(0.25, QuantileMethod::Linear)?,
            ca.quantile(0.75, QuantileMethod::Linear)?,
            ca.max(),
        );
        Ok(match stats {
            (Some(median), Some(lower_quantile), Some(upper_quantile), Some(max_value)) => {
                Some(Self {
                    median,
                    lower_quantile,
                    upper_quantile,
                    max_value,
                })
            }
            _ => None,
        })
    }

    pub fn iqr(&self) -> f64 {
        self.upper_quantile - self.lower_quantile
    }

    /// Values above `median + 3 * IQR` are extreme.
    pub fn extreme_value_limit(&self) -> f64 {
        self.median + 3.0 * self.iqr()
    }

    pub fn count_extreme(&self, values: &[Option<f64>]) -> usize {
        let limit = self.extreme_value_limit();
        values.iter().flatten().filter(|v| **v > limit).count()
    }
}
