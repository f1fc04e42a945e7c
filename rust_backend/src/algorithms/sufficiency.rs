//! CalTRACK data sufficiency criteria.
//!
//! The evaluator never fails on poor data. Every finding is a [`Warning`] in
//! either the critical list (the data should not be used for modeling) or the
//! non-critical list (flag for manual review). Checks run in a fixed order and
//! each returns its own [`WarningSet`], so the order of the report is stable.

use chrono::Datelike;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;

use crate::algorithms::statistics::Quartiles;
use crate::config::SufficiencyConfig;
use crate::core::domain::{SufficiencyRow, SufficiencyTable, Timestamp};
use crate::core::warning::{names, Warning, WarningSet};
use crate::error::Result;
use crate::time::{day_counts, floor_days};

/// Outcome of a sufficiency evaluation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SufficiencyReport {
    pub data: SufficiencyTable,
    pub critical_warnings: Vec<Warning>,
    pub non_critical_warnings: Vec<Warning>,
}

impl SufficiencyReport {
    fn new(data: SufficiencyTable, warnings: WarningSet) -> Self {
        Self {
            data,
            critical_warnings: warnings.critical,
            non_critical_warnings: warnings.non_critical,
        }
    }

    /// True when no critical warning was raised.
    pub fn is_sufficient(&self) -> bool {
        self.critical_warnings.is_empty()
    }

    /// Appends advisory findings raised outside the evaluator.
    pub fn with_non_critical(mut self, warnings: Vec<Warning>) -> Self {
        self.non_critical_warnings.extend(warnings);
        self
    }

    pub fn has_warning(&self, name: &str) -> bool {
        self.critical_warnings
            .iter()
            .chain(&self.non_critical_warnings)
            .any(|w| w.is(name))
    }
}

/// Day span of the data after reconciling it with the requested window.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Span {
    n_days_total: i64,
}

fn span_checks(
    data: &SufficiencyTable,
    requested_start: Option<Timestamp>,
    requested_end: Option<Timestamp>,
) -> (Span, WarningSet) {
    let index = data.timestamps();
    let (Some(&data_start), Some(&data_end)) = (index.iter().min(), index.iter().max()) else {
        return (Span { n_days_total: 0 }, WarningSet::new());
    };
    let n_days_data = floor_days(data_end - data_start);
    let mut n_days_start_gap = requested_start.map_or(0, |start| floor_days(data_start - start));
    let mut n_days_end_gap = requested_end.map_or(0, |end| floor_days(end - data_end));

    let mut warnings = WarningSet::new();
    if let Some(requested_end) = requested_end.filter(|_| n_days_end_gap < 0) {
        warnings.critical.push(Warning::sufficiency(
            names::EXTRA_DATA_AFTER_REQUESTED_END_DATE,
            "Extra data found after requested end date.",
            json!({
                "requested_end": requested_end.to_rfc3339(),
                "data_end": data_end.to_rfc3339(),
            }),
        ));
        n_days_end_gap = 0;
    }
    if let Some(requested_start) = requested_start.filter(|_| n_days_start_gap < 0) {
        warnings.critical.push(Warning::sufficiency(
            names::EXTRA_DATA_BEFORE_REQUESTED_START_DATE,
            "Extra data found before requested start date.",
            json!({
                "requested_start": requested_start.to_rfc3339(),
                "data_start": data_start.to_rfc3339(),
            }),
        ));
        n_days_start_gap = 0;
    }

    let span = Span {
        n_days_total: n_days_data + n_days_start_gap + n_days_end_gap,
    };
    (span, warnings)
}

fn negative_value_check(data: &SufficiencyTable) -> WarningSet {
    let n_negative = data
        .rows
        .iter()
        .filter_map(|r| r.meter_value)
        .filter(|v| *v < 0.0)
        .count();
    if n_negative == 0 {
        return WarningSet::new();
    }
    WarningSet::critical(Warning::sufficiency(
        names::NEGATIVE_METER_VALUES,
        "Found negative meter data values",
        json!({ "n_negative_meter_values": n_negative }),
    ))
}

/// Sum of day counts over the rows matching `valid`, truncated to whole days.
fn valid_days(data: &SufficiencyTable, counts: &[f64], valid: impl Fn(&SufficiencyRow) -> bool) -> i64 {
    data.rows
        .iter()
        .zip(counts)
        .filter(|(row, count)| !count.is_nan() && valid(*row))
        .map(|(_, count)| *count)
        .sum::<f64>() as i64
}

fn fraction(n_valid: i64, n_days_total: i64) -> f64 {
    if n_days_total > 0 {
        n_valid as f64 / n_days_total as f64
    } else {
        0.0
    }
}

fn coverage_checks(data: &SufficiencyTable, span: Span, config: &SufficiencyConfig) -> WarningSet {
    let threshold = config.min_fraction_hourly_temperature_coverage_per_period;
    let valid_temperature = |row: &SufficiencyRow| row.temperature_coverage() > threshold;
    let valid_meter = |row: &SufficiencyRow| row.meter_value.is_some();

    let counts = day_counts(&data.timestamps());
    let n_valid_temperature_days = valid_days(data, &counts, valid_temperature);
    let n_valid_meter_value_days = valid_days(data, &counts, valid_meter);
    let n_valid_days = if config.is_reporting_data {
        n_valid_temperature_days
    } else {
        valid_days(data, &counts, |row| valid_meter(row) && valid_temperature(row))
    };

    let total = span.n_days_total;
    let min_fraction = config.min_fraction_daily_coverage;
    debug!(
        "Valid days: {} combined, {} meter, {} temperature of {} total",
        n_valid_days, n_valid_meter_value_days, n_valid_temperature_days, total
    );

    let mut warnings = WarningSet::new();
    if total != config.num_days {
        warnings.critical.push(Warning::sufficiency(
            names::INCORRECT_NUMBER_OF_TOTAL_DAYS,
            "Total data span does not match the required value.",
            json!({ "num_days": config.num_days, "n_days_total": total }),
        ));
    }

    if fraction(n_valid_days, total) < min_fraction {
        warnings.critical.push(Warning::sufficiency(
            names::TOO_MANY_DAYS_WITH_MISSING_DATA,
            "Too many days in data have missing meter data or temperature data.",
            json!({ "n_valid_days": n_valid_days, "n_days_total": total }),
        ));
    }

    if !config.is_reporting_data && fraction(n_valid_meter_value_days, total) < min_fraction {
        warnings.critical.push(Warning::sufficiency(
            names::TOO_MANY_DAYS_WITH_MISSING_METER_DATA,
            "Too many days in data have missing meter data.",
            json!({
                "n_valid_meter_data_days": n_valid_meter_value_days,
                "n_days_total": total,
            }),
        ));
    }

    if fraction(n_valid_temperature_days, total) < min_fraction {
        warnings.critical.push(Warning::sufficiency(
            names::TOO_MANY_DAYS_WITH_MISSING_TEMPERATURE_DATA,
            "Too many days in data have missing temperature data.",
            json!({
                "n_valid_temperature_data_days": n_valid_temperature_days,
                "n_days_total": total,
            }),
        ));
    }

    warnings
}

/// Whether any month of the year has a present share below `min_fraction`.
///
/// Rows are grouped by calendar month regardless of year.
fn any_month_below(
    data: &SufficiencyTable,
    present: impl Fn(&SufficiencyRow) -> bool,
    min_fraction: f64,
) -> bool {
    let mut months: BTreeMap<u32, (usize, usize)> = BTreeMap::new();
    for row in &data.rows {
        let entry = months.entry(row.timestamp.month()).or_default();
        entry.1 += 1;
        if present(row) {
            entry.0 += 1;
        }
    }
    months
        .values()
        .any(|&(n_present, n_rows)| (n_present as f64 / n_rows as f64) < min_fraction)
}

fn monthly_checks(data: &SufficiencyTable, config: &SufficiencyConfig) -> WarningSet {
    let min_fraction = config.min_fraction_daily_coverage;
    let mut warnings = WarningSet::new();

    if any_month_below(data, |row| row.temperature_mean.is_some(), min_fraction) {
        warnings.critical.push(Warning::sufficiency(
            names::MISSING_TEMPERATURE_DATA,
            "More than 10% of the monthly temperature data is missing.",
            json!({}),
        ));
    }

    if !config.is_reporting_data
        && any_month_below(data, |row| row.meter_value.is_some(), min_fraction)
    {
        warnings.critical.push(Warning::sufficiency(
            names::MISSING_METER_DATA,
            "More than 10% of the monthly meter data is missing.",
            json!({}),
        ));
    }

    warnings
}

fn extreme_value_check(data: &SufficiencyTable) -> Result<WarningSet> {
    let values: Vec<Option<f64>> = data.rows.iter().map(|r| r.meter_value).collect();
    let Some(quartiles) = Quartiles::of(&values)? else {
        return Ok(WarningSet::new());
    };

    let n_extreme_values = quartiles.count_extreme(&values);
    if n_extreme_values == 0 {
        return Ok(WarningSet::new());
    }

    Ok(WarningSet::non_critical(Warning::sufficiency(
        names::EXTREME_VALUES_DETECTED,
        "Extreme values (greater than (median + (3 * IQR)), must be flagged for manual review.",
        json!({
            "n_extreme_values": n_extreme_values,
            "median": quartiles.median,
            "upper_quantile": quartiles.upper_quantile,
            "lower_quantile": quartiles.lower_quantile,
            "extreme_value_limit": quartiles.extreme_value_limit(),
            "max_value": quartiles.max_value,
        }),
    )))
}

/// Evaluates the CalTRACK sufficiency criteria over a merged table.
///
/// When no row has both a meter value and a mean temperature the report holds
/// an empty table and a single critical `no_data` warning. Otherwise the table
/// is returned unchanged with the findings of every check.
///
/// # Arguments
/// * `data` - Merged meter and temperature periods
/// * `requested_start` / `requested_end` - Window the data should cover
/// * `config` - Thresholds and the reporting-period switch
///
/// # Errors
///
/// Only when computing quantiles fails; data quality never produces an error.
pub fn caltrack_sufficiency_criteria(
    data: SufficiencyTable,
    requested_start: Option<Timestamp>,
    requested_end: Option<Timestamp>,
    config: &SufficiencyConfig,
) -> Result<SufficiencyReport> {
    if data.has_no_complete_rows() {
        warn!(
            "No complete meter and temperature rows among {} periods",
            data.len()
        );
        return Ok(SufficiencyReport::new(
            SufficiencyTable::empty(),
            WarningSet::critical(Warning::sufficiency(
                names::NO_DATA,
                "No data available.",
                json!({}),
            )),
        ));
    }

    let (span, mut warnings) = span_checks(&data, requested_start, requested_end);
    if !config.is_reporting_data {
        warnings.extend(negative_value_check(&data));
    }
    warnings.extend(coverage_checks(&data, span, config));
    warnings.extend(monthly_checks(&data, config));
    if !config.is_reporting_data {
        warnings.extend(extreme_value_check(&data)?);
    }

    Ok(SufficiencyReport::new(data, warnings))
}
