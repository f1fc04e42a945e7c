//! Engine configuration file support.
//!
//! Thresholds for the sufficiency criteria, the atomic resampling interval and
//! the billing/daily cleaning limits can be read from a TOML file. Every field
//! has a default, so an empty file is a valid configuration.
//!
//! ```toml
//! [sufficiency]
//! num_days = 365
//! min_fraction_daily_coverage = 0.9
//!
//! [resample]
//! atomic_minutes = 1
//! ```

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Full engine configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub sufficiency: SufficiencyConfig,
    #[serde(default)]
    pub resample: ResampleSettings,
    #[serde(default)]
    pub billing: BillingSettings,
    #[serde(default)]
    pub daily: DailySettings,
}

/// Thresholds of the sufficiency criteria.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SufficiencyConfig {
    #[serde(default = "default_num_days")]
    pub num_days: i64,
    #[serde(default = "default_min_fraction")]
    pub min_fraction_daily_coverage: f64,
    #[serde(default = "default_min_fraction")]
    pub min_fraction_hourly_temperature_coverage_per_period: f64,
    /// Skip every meter-value check (reporting periods carry no baseline usage)
    #[serde(default)]
    pub is_reporting_data: bool,
}

/// Intermediate granularity of the resampler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResampleSettings {
    #[serde(default = "default_atomic_minutes")]
    pub atomic_minutes: i64,
}

/// Accepted day gaps between consecutive billing reads, inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingSettings {
    #[serde(default = "default_min_gap_days")]
    pub monthly_min_gap_days: i64,
    #[serde(default = "default_monthly_max_gap_days")]
    pub monthly_max_gap_days: i64,
    #[serde(default = "default_min_gap_days")]
    pub bimonthly_min_gap_days: i64,
    #[serde(default = "default_bimonthly_max_gap_days")]
    pub bimonthly_max_gap_days: i64,
}

/// Daily downsampling limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySettings {
    /// Days at or below this coverage are dropped
    #[serde(default = "default_min_daily_coverage")]
    pub min_coverage: f64,
}

fn default_num_days() -> i64 {
    365
}

fn default_min_fraction() -> f64 {
    0.9
}

fn default_atomic_minutes() -> i64 {
    1
}

fn default_min_gap_days() -> i64 {
    25
}

fn default_monthly_max_gap_days() -> i64 {
    35
}

fn default_bimonthly_max_gap_days() -> i64 {
    70
}

fn default_min_daily_coverage() -> f64 {
    0.5
}

impl Default for SufficiencyConfig {
    fn default() -> Self {
        Self {
            num_days: default_num_days(),
            min_fraction_daily_coverage: default_min_fraction(),
            min_fraction_hourly_temperature_coverage_per_period: default_min_fraction(),
            is_reporting_data: false,
        }
    }
}

impl SufficiencyConfig {
    /// Default thresholds for a reporting period.
    pub fn reporting() -> Self {
        Self {
            is_reporting_data: true,
            ..Self::default()
        }
    }
}

impl Default for ResampleSettings {
    fn default() -> Self {
        Self {
            atomic_minutes: default_atomic_minutes(),
        }
    }
}

impl ResampleSettings {
    pub fn atomic_interval(&self) -> TimeDelta {
        TimeDelta::minutes(self.atomic_minutes)
    }
}

impl Default for BillingSettings {
    fn default() -> Self {
        Self {
            monthly_min_gap_days: default_min_gap_days(),
            monthly_max_gap_days: default_monthly_max_gap_days(),
            bimonthly_min_gap_days: default_min_gap_days(),
            bimonthly_max_gap_days: default_bimonthly_max_gap_days(),
        }
    }
}

impl Default for DailySettings {
    fn default() -> Self {
        Self {
            min_coverage: default_min_daily_coverage(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(EngineConfig)` if the file was read, parsed and validated
    /// * `Err(Error::Configuration)` otherwise
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::Configuration(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(content)
            .map_err(|e| Error::Configuration(format!("Failed to parse config file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the default location.
    ///
    /// Searches for `eemeter.toml` in:
    /// 1. Current directory
    /// 2. `rust_backend/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> Result<Self> {
        let search_paths = [
            PathBuf::from("eemeter.toml"),
            PathBuf::from("rust_backend/eemeter.toml"),
            PathBuf::from("../eemeter.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(Error::Configuration(
            "No eemeter.toml found in standard locations".to_string(),
        ))
    }

    /// Check ranges that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        let fractions = [
            (
                "sufficiency.min_fraction_daily_coverage",
                self.sufficiency.min_fraction_daily_coverage,
            ),
            (
                "sufficiency.min_fraction_hourly_temperature_coverage_per_period",
                self.sufficiency.min_fraction_hourly_temperature_coverage_per_period,
            ),
            ("daily.min_coverage", self.daily.min_coverage),
        ];
        for (name, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::Configuration(format!(
                    "'{}' must be within [0, 1], got {}",
                    name, value
                )));
            }
        }

        if self.sufficiency.num_days <= 0 {
            return Err(Error::Configuration(
                "'sufficiency.num_days' must be positive".to_string(),
            ));
        }

        if self.resample.atomic_minutes <= 0 {
            return Err(Error::Configuration(
                "'resample.atomic_minutes' must be positive".to_string(),
            ));
        }

        let gaps = [
            (
                "monthly",
                self.billing.monthly_min_gap_days,
                self.billing.monthly_max_gap_days,
            ),
            (
                "bimonthly",
                self.billing.bimonthly_min_gap_days,
                self.billing.bimonthly_max_gap_days,
            ),
        ];
        for (name, min, max) in gaps {
            if min > max {
                return Err(Error::Configuration(format!(
                    "billing.{0}_min_gap_days ({1}) exceeds billing.{0}_max_gap_days ({2})",
                    name, min, max
                )));
            }
        }

        Ok(())
    }
}
