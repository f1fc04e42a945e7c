use anyhow::{Context, Result};
use log::info;
use polars::prelude::*;

use crate::algorithms::sufficiency::{caltrack_sufficiency_criteria, SufficiencyReport};
use crate::config::EngineConfig;
use crate::core::domain::{MeterSeries, SourceInterval, TimeSeries, Timestamp};
use crate::io::frames;
use crate::preprocessing::merge::merge_meter_temperature;
use crate::transformations::cleaning::Deduplicate;
use crate::transformations::daily::{clean_billing_daily_data, CleaningSettings};

/// Window the data is expected to cover. Either end may be open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RequestedWindow {
    pub start: Option<Timestamp>,
    pub end: Option<Timestamp>,
}

impl RequestedWindow {
    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn unbounded() -> Self {
        Self::default()
    }
}

/// Result of a pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineResult {
    pub source_interval: SourceInterval,
    pub report: SufficiencyReport,
}

impl PipelineResult {
    pub fn is_sufficient(&self) -> bool {
        self.report.is_sufficient()
    }
}

/// End-to-end preparation of meter data for modeling
pub struct SufficiencyPipeline {
    config: EngineConfig,
}

impl SufficiencyPipeline {
    /// Create a new pipeline with default configuration
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
        }
    }

    /// Create a pipeline with custom configuration
    pub fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Clean meter data, merge it with temperatures and evaluate sufficiency
    ///
    /// # Arguments
    /// * `meter` - Raw meter reads, possibly with estimated flags
    /// * `temperature` - Hourly temperatures
    /// * `source_interval` - Native interval of `meter`, inferred when `None`
    /// * `window` - Requested start and end of the data
    ///
    /// # Returns
    /// PipelineResult with the evaluated table and all warnings. Warnings
    /// raised while cleaning follow the evaluator's non-critical warnings.
    pub fn run(
        &self,
        meter: MeterSeries,
        temperature: &TimeSeries,
        source_interval: Option<SourceInterval>,
        window: RequestedWindow,
    ) -> Result<PipelineResult> {
        // Step 1: Deduplicate
        let meter = meter.deduplicated();

        // Step 2: Resolve the source interval
        let source_interval =
            source_interval.unwrap_or_else(|| SourceInterval::infer(meter.timestamps()));

        // Step 3: Clean according to the interval
        let settings = CleaningSettings {
            resample: self.config.resample.clone(),
            billing: self.config.billing.clone(),
            daily: self.config.daily.clone(),
        };
        let cleaned = clean_billing_daily_data(meter, source_interval, &settings)
            .with_context(|| format!("Failed to clean {} meter data", source_interval))?;

        // Step 4: Merge with temperature
        let merged = merge_meter_temperature(&cleaned.table, temperature);

        // Step 5: Evaluate
        let report = caltrack_sufficiency_criteria(
            merged,
            window.start,
            window.end,
            &self.config.sufficiency,
        )
        .context("Failed to evaluate sufficiency criteria")?
        .with_non_critical(cleaned.warnings.non_critical);

        info!(
            "Sufficiency of {} data: {} critical, {} non-critical warnings",
            source_interval,
            report.critical_warnings.len(),
            report.non_critical_warnings.len()
        );

        Ok(PipelineResult {
            source_interval,
            report,
        })
    }

    /// Run from DataFrames
    ///
    /// `meter_df` holds `timestamp`, `value` and optionally `estimated`;
    /// `temperature_df` holds `timestamp` and one value column.
    pub fn run_frame(
        &self,
        meter_df: &DataFrame,
        temperature_df: &DataFrame,
        source_interval: Option<SourceInterval>,
        window: RequestedWindow,
    ) -> Result<PipelineResult> {
        let meter = frames::meter_series_from_frame(meter_df)
            .context("Failed to read meter DataFrame")?;

        let temperature_col = frames::single_value_column(temperature_df, frames::TIMESTAMP_COLUMN)
            .context("Failed to read temperature DataFrame")?;
        let temperature = frames::time_series_from_frame(
            temperature_df,
            frames::TIMESTAMP_COLUMN,
            &temperature_col,
        )
        .context("Failed to read temperature DataFrame")?;

        self.run(meter, &temperature, source_interval, window)
    }
}

impl Default for SufficiencyPipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience function for a default pipeline run
pub fn evaluate_meter_data(
    meter: MeterSeries,
    temperature: &TimeSeries,
    window: RequestedWindow,
) -> Result<PipelineResult> {
    SufficiencyPipeline::new().run(meter, temperature, None, window)
}
