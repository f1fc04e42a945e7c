use log::debug;

use crate::core::domain::{MeterTable, SufficiencyRow, SufficiencyTable, TimeSeries};
use crate::time::floor_hours;
use crate::transformations::cleaning::Deduplicate;

/// Joins cleaned meter data with hourly temperatures.
///
/// Each meter row `i` covers `[t_i, t_{i+1})`. Its temperature columns
/// summarize the readings inside that period: the count of present readings,
/// the hours of the period without a reading, and the mean of the present
/// readings. The last meter row has no end, so its counts are zero and its
/// mean is missing.
///
/// # Examples
///
/// ```
/// use eemeter_rust::core::domain::{MeterTable, TimeSeries};
/// use eemeter_rust::preprocessing::merge_meter_temperature;
/// use chrono::{TimeDelta, TimeZone, Utc};
///
/// let start = Utc.with_ymd_and_hms(2018, 1, 1, 0, 0, 0).unwrap();
/// let meter = MeterTable::new(TimeSeries::from_points(vec![
///     (start, Some(10.0)),
///     (start + TimeDelta::days(1), None),
/// ]));
/// let temperature =
///     TimeSeries::from_points((0..12).map(|h| (start + TimeDelta::hours(h), Some(50.0))));
///
/// let table = merge_meter_temperature(&meter, &temperature);
/// assert_eq!(table.rows[0].temperature_not_null, 12.0);
/// assert_eq!(table.rows[0].temperature_null, 12.0);
/// assert_eq!(table.rows[0].temperature_mean, Some(50.0));
/// ```
pub fn merge_meter_temperature(meter: &MeterTable, temperature: &TimeSeries) -> SufficiencyTable {
    let temperature = temperature.clone().deduplicated();
    let temp_index = temperature.timestamps();
    let temp_values = temperature.values();
    let index = meter.timestamps();

    let rows: Vec<SufficiencyRow> = index
        .iter()
        .zip(meter.meter_value())
        .enumerate()
        .map(|(i, (&start, &meter_value))| {
            let Some(&end) = index.get(i + 1) else {
                return SufficiencyRow {
                    timestamp: start,
                    meter_value,
                    temperature_mean: None,
                    temperature_not_null: 0.0,
                    temperature_null: 0.0,
                };
            };

            let lo = temp_index.partition_point(|t| *t < start);
            let hi = temp_index.partition_point(|t| *t < end);
            let present: Vec<f64> = temp_values[lo..hi].iter().flatten().copied().collect();
            let not_null = present.len() as i64;
            let null = (floor_hours(end - start) - not_null).max(0);
            let mean = if present.is_empty() {
                None
            } else {
                Some(present.iter().sum::<f64>() / present.len() as f64)
            };

            SufficiencyRow {
                timestamp: start,
                meter_value,
                temperature_mean: mean,
                temperature_not_null: not_null as f64,
                temperature_null: null as f64,
            }
        })
        .collect();

    debug!(
        "Merged {} meter periods with {} temperature readings",
        rows.len(),
        temperature.len()
    );
    SufficiencyTable::new(rows)
}
