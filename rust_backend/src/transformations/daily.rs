//! Daily downsampling and dispatch of meter cleaning by source interval.

use log::{debug, warn};
use serde_json::json;

use crate::config::{BillingSettings, DailySettings, ResampleSettings};
use crate::core::domain::{MeterSeries, MeterTable, SourceInterval, TimeSeries};
use crate::core::warning::{names, Warning, WarningSet};
use crate::error::Result;
use crate::time::Frequency;
use crate::transformations::billing::clean_billing_data;
use crate::transformations::resample::{as_freq_with_coverage, ResampleOptions};

/// A cleaned meter table together with the warnings raised while cleaning it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DailyCleaning {
    pub table: MeterTable,
    pub warnings: WarningSet,
}

/// Resamples sub-daily cumulative data to days and drops poorly covered days.
///
/// A day whose coverage is above `settings.min_coverage` is scaled up by
/// `1 / coverage`. A day at or below it is blanked and listed in a
/// `missing_high_frequency_meter_data` warning. The trailing period appended
/// by the resampler carries no coverage and is left blank without a warning.
pub fn downsample_and_clean_daily(
    series: &TimeSeries,
    resample: &ResampleSettings,
    settings: &DailySettings,
) -> Result<DailyCleaning> {
    let options = ResampleOptions::cumulative().with_atomic(resample.atomic_interval());
    let table = as_freq_with_coverage(series, Frequency::Daily, &options)?;

    let mut dropped = Vec::new();
    let values: Vec<Option<f64>> = table
        .timestamps
        .iter()
        .zip(table.values.iter().zip(&table.coverage))
        .map(|(day, (value, coverage))| match coverage {
            Some(c) if *c > settings.min_coverage => value.map(|v| v / c),
            Some(_) => {
                dropped.push(*day);
                None
            }
            None => None,
        })
        .collect();

    let mut warnings = WarningSet::new();
    if !dropped.is_empty() {
        warn!(
            "{} days at or below {:.0}% coverage were blanked",
            dropped.len(),
            settings.min_coverage * 100.0
        );
        let dates: Vec<String> = dropped.iter().map(|d| d.to_rfc3339()).collect();
        warnings.non_critical.push(Warning::sufficiency(
            names::MISSING_HIGH_FREQUENCY_METER_DATA,
            format!(
                "More than {:.0}% of the high frequency Meter data is missing.",
                (1.0 - settings.min_coverage) * 100.0
            ),
            json!({ "dates": dates }),
        ));
    }

    let series = TimeSeries::new(table.timestamps, values)?;
    Ok(DailyCleaning {
        table: MeterTable::new(series),
        warnings,
    })
}

/// Settings used by [`clean_billing_daily_data`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CleaningSettings {
    pub resample: ResampleSettings,
    pub billing: BillingSettings,
    pub daily: DailySettings,
}

/// Cleans meter data according to its source interval.
///
/// Billing data goes through the billing cleaner, daily data passes through
/// unchanged and anything finer or irregular is downsampled to days.
pub fn clean_billing_daily_data(
    meter: MeterSeries,
    interval: SourceInterval,
    settings: &CleaningSettings,
) -> Result<DailyCleaning> {
    debug!("Cleaning {} meter rows as {}", meter.len(), interval);
    match interval {
        SourceInterval::BillingMonthly | SourceInterval::BillingBimonthly => Ok(DailyCleaning {
            table: clean_billing_data(meter, interval, &settings.billing)?,
            warnings: WarningSet::new(),
        }),
        SourceInterval::Daily => Ok(DailyCleaning {
            table: MeterTable::new(meter.to_values()),
            warnings: WarningSet::new(),
        }),
        SourceInterval::Hourly | SourceInterval::Unknown => {
            downsample_and_clean_daily(&meter.to_values(), &settings.resample, &settings.daily)
        }
    }
}
