//! eemeter Rust backend: meter data resampling and CalTRACK sufficiency checks.
//!
//! Raw meter reads and hourly temperatures go through these stages:
//!
//! 1. [`transformations::cleaning`] removes repeated timestamps
//! 2. [`transformations::daily`] cleans billing data or downsamples interval
//!    data to days, using [`transformations::resample`]
//! 3. [`preprocessing::merge`] joins meter periods with temperatures
//! 4. [`algorithms::sufficiency`] reports critical and non-critical warnings
//!
//! [`preprocessing::SufficiencyPipeline`] runs all of them. Python bindings are
//! built with the `python` feature.

pub mod algorithms;
pub mod config;
pub mod core;
pub mod error;
pub mod io;
pub mod preprocessing;
pub mod time;
pub mod transformations;

#[cfg(feature = "python")]
pub mod python;

pub use error::{Error, Result};
