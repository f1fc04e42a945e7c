//! Core domain models for meter data preparation.
//!
//! This module defines the tables passed between processing stages and the
//! warning records the stages emit.

pub mod domain;
pub mod warning;

pub use domain::{
    CoverageTable, MeterReading, MeterSeries, MeterTable, SeriesType, SourceInterval,
    SufficiencyRow, SufficiencyTable, TimeSeries, Timestamp,
};
pub use warning::{Warning, WarningSet};
