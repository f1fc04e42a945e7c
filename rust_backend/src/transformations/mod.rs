//! Meter data transformations.
//!
//! Each stage consumes a series and returns a new one:
//!
//! - [`cleaning`]: duplicate timestamp removal
//! - [`resample`]: frequency conversion with coverage
//! - [`billing`]: billing-period gap filtering and estimated-read folding
//! - [`daily`]: daily downsampling and dispatch by source interval
//!
//! # Example
//!
//! ```
//! use eemeter_rust::core::domain::TimeSeries;
//! use eemeter_rust::time::Frequency;
//! use eemeter_rust::transformations::{as_freq, remove_duplicates, ResampleOptions};
//! use chrono::{TimeDelta, TimeZone, Utc};
//!
//! let start = Utc.with_ymd_and_hms(2018, 1, 1, 0, 0, 0).unwrap();
//! let series = TimeSeries::from_points((0..72).map(|h| (start + TimeDelta::hours(h), Some(60.0))));
//!
//! let temperature = as_freq(
//!     &remove_duplicates(series),
//!     Frequency::Daily,
//!     &ResampleOptions::instantaneous(),
//! )
//! .unwrap();
//! assert_eq!(temperature.values()[0], Some(60.0));
//! ```

pub mod billing;
pub mod cleaning;
pub mod daily;
pub mod resample;

#[cfg(test)]
mod resample_tests;

pub use billing::{clean_billing_data, filter_billing_gaps, reconcile_estimated};
pub use cleaning::{remove_duplicates, Deduplicate};
pub use daily::{clean_billing_daily_data, downsample_and_clean_daily, CleaningSettings, DailyCleaning};
pub use resample::{as_freq, as_freq_frame, as_freq_with_coverage, ResampleOptions};
