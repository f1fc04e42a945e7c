//! Billing-period cleaning.
//!
//! Billing reads arrive roughly monthly or bimonthly with irregular lengths.
//! Two passes turn them into a usable `meter_value` table:
//!
//! 1. rows whose gap to the next read is implausible for the billing cycle are
//!    blanked in place, so the index keeps its shape;
//! 2. estimated reads are folded into the actual read that follows them.

use log::debug;

use crate::config::BillingSettings;
use crate::core::domain::{MeterReading, MeterSeries, MeterTable, SourceInterval, TimeSeries};
use crate::error::{Error, Result};
use crate::time::floor_days;
use crate::transformations::cleaning::Deduplicate;

impl BillingSettings {
    /// Inclusive range of accepted day gaps for `interval`.
    pub fn gap_range(&self, interval: SourceInterval) -> Option<(i64, i64)> {
        match interval {
            SourceInterval::BillingMonthly => {
                Some((self.monthly_min_gap_days, self.monthly_max_gap_days))
            }
            SourceInterval::BillingBimonthly => {
                Some((self.bimonthly_min_gap_days, self.bimonthly_max_gap_days))
            }
            _ => None,
        }
    }
}

/// Blanks every row whose whole-day gap to the next row falls outside
/// `[min_days, max_days]`. The last row has no gap and is always blanked.
pub fn filter_billing_gaps(meter: MeterSeries, min_days: i64, max_days: i64) -> MeterSeries {
    let flagged = meter.has_estimated_flags();
    let (timestamps, mut readings) = meter.into_parts();
    let mut discarded = 0usize;

    for (i, reading) in readings.iter_mut().enumerate() {
        let keep = timestamps
            .get(i + 1)
            .map(|next| floor_days(*next - timestamps[i]))
            .is_some_and(|gap| (min_days..=max_days).contains(&gap));
        if !keep {
            if reading.value().is_some() {
                discarded += 1;
            }
            *reading = MeterReading::Missing;
        }
    }

    debug!(
        "Billing gap filter [{}, {}] days blanked {} of {} rows",
        min_days,
        max_days,
        discarded,
        timestamps.len()
    );
    MeterSeries::new(timestamps, readings)
        .unwrap_or_default()
        .with_estimated_flags(flagged)
}

/// State carried from one row to the next while folding estimates.
#[derive(Debug, Default)]
struct Carry {
    previous: Option<(usize, Option<f64>, Option<f64>)>,
    removals: Vec<usize>,
    values: Vec<Option<f64>>,
}

impl Carry {
    fn step(mut self, (index, reading): (usize, &MeterReading)) -> Self {
        let unestimated = reading.unestimated_value();
        let carried = match self.previous {
            Some((previous_index, None, previous_estimated)) => {
                if unestimated.is_some() {
                    self.removals.push(previous_index);
                }
                previous_estimated
            }
            _ => Some(0.0),
        };

        self.values.push(unestimated.zip(carried).map(|(v, c)| v + c));
        self.previous = Some((index, unestimated, reading.estimated_value()));
        self
    }
}

/// Folds each estimated read into the next actual read.
///
/// Walking every row but the last, a row whose predecessor was not an actual
/// read receives the predecessor's estimated value on top of its own actual
/// value, and the predecessor is dropped when the current row is actual. The
/// carry looks one row back only. The last row keeps a missing value.
///
/// # Examples
///
/// ```
/// use eemeter_rust::core::domain::{MeterReading::*, MeterSeries};
/// use eemeter_rust::transformations::billing::reconcile_estimated;
/// use chrono::{TimeDelta, TimeZone, Utc};
///
/// let start = Utc.with_ymd_and_hms(2018, 1, 1, 0, 0, 0).unwrap();
/// let index = (0..4).map(|m| start + TimeDelta::days(30 * m)).collect();
/// let meter = MeterSeries::new(index, vec![Actual(2.0), Estimated(5.0), Actual(4.0), Missing]).unwrap();
///
/// let reconciled = reconcile_estimated(&meter);
/// assert_eq!(reconciled.values(), &[Some(2.0), Some(9.0), None]);
/// ```
pub fn reconcile_estimated(meter: &MeterSeries) -> TimeSeries {
    let readings = meter.readings();
    let Some(body) = readings.len().checked_sub(1) else {
        return TimeSeries::empty();
    };

    let Carry {
        removals,
        mut values,
        ..
    } = readings[..body].iter().enumerate().fold(Carry::default(), Carry::step);
    values.push(None);

    debug!(
        "Folded {} estimated reads into following actual reads",
        removals.len()
    );
    TimeSeries::from_points(
        meter
            .timestamps()
            .iter()
            .copied()
            .zip(values)
            .enumerate()
            .filter(|(i, _)| !removals.contains(i))
            .map(|(_, point)| point),
    )
}

/// Cleans billing meter data into a `meter_value` table.
///
/// Repeated timestamps are dropped first (first occurrence wins). Returns an
/// empty table when nothing survives the gap filter. Estimated reconciliation
/// runs whenever the series carries estimated flags, so a blanked row is
/// removed and its successor nulled even when every flag is false.
///
/// # Errors
///
/// [`Error::InvalidInput`] when `interval` is not a billing interval.
pub fn clean_billing_data(
    meter: MeterSeries,
    interval: SourceInterval,
    settings: &BillingSettings,
) -> Result<MeterTable> {
    let (min_days, max_days) = settings.gap_range(interval).ok_or_else(|| {
        Error::InvalidInput(format!(
            "Billing cleaning needs a billing interval, got {}",
            interval
        ))
    })?;

    let meter = meter.deduplicated();
    if meter.all_missing() {
        return Ok(MeterTable::empty());
    }

    let filtered = filter_billing_gaps(meter, min_days, max_days);
    if filtered.all_missing() {
        return Ok(MeterTable::empty());
    }

    if !filtered.has_estimated_flags() {
        return Ok(MeterTable::new(filtered.to_values()));
    }

    let reconciled = reconcile_estimated(&filtered);
    if reconciled.all_null() {
        return Ok(MeterTable::empty());
    }
    Ok(MeterTable::new(reconciled))
}
