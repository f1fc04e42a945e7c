use log::debug;

use crate::core::domain::{MeterSeries, TimeSeries, Timestamp};

/// Removal of repeated timestamps.
///
/// The first occurrence of each timestamp is kept and the result is in
/// chronological order. Applying it twice is the same as applying it once.
pub trait Deduplicate: Sized {
    fn deduplicated(self) -> Self;
}

/// Row positions to keep, in chronological order.
///
/// The sort is stable, so among equal timestamps the earliest row comes first
/// and survives the dedup.
pub fn first_occurrences(index: &[Timestamp]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..index.len()).collect();
    order.sort_by_key(|&i| index[i]);
    order.dedup_by_key(|i| index[*i]);
    order
}

fn is_identity(order: &[usize], len: usize) -> bool {
    order.len() == len && order.iter().enumerate().all(|(pos, &i)| pos == i)
}

fn pick<T: Copy>(items: &[T], order: &[usize]) -> Vec<T> {
    order.iter().map(|&i| items[i]).collect()
}

impl Deduplicate for TimeSeries {
    fn deduplicated(self) -> Self {
        let order = first_occurrences(self.timestamps());
        if is_identity(&order, self.len()) {
            return self;
        }

        debug!(
            "Removed {} duplicate timestamps from series of {} rows",
            self.len() - order.len(),
            self.len()
        );
        TimeSeries::from_points(
            order
                .iter()
                .map(|&i| (self.timestamps()[i], self.values()[i])),
        )
    }
}

impl Deduplicate for MeterSeries {
    fn deduplicated(self) -> Self {
        let order = first_occurrences(self.timestamps());
        if is_identity(&order, self.len()) {
            return self;
        }

        debug!(
            "Removed {} duplicate timestamps from meter series of {} rows",
            self.len() - order.len(),
            self.len()
        );
        let flagged = self.has_estimated_flags();
        let (timestamps, readings) = self.into_parts();
        let timestamps = pick(&timestamps, &order);
        let readings = pick(&readings, &order);
        MeterSeries::new(timestamps, readings)
            .unwrap_or_default()
            .with_estimated_flags(flagged)
    }
}

/// Convenience wrapper over [`Deduplicate::deduplicated`].
pub fn remove_duplicates<T: Deduplicate>(data: T) -> T {
    data.deduplicated()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain::MeterReading;
    use chrono::{TimeDelta, TimeZone, Utc};

    fn t(hour: i64) -> Timestamp {
        Utc.with_ymd_and_hms(2018, 1, 1, 0, 0, 0).unwrap() + TimeDelta::hours(hour)
    }

    #[test]
    fn test_remove_duplicates_keeps_first() {
        let series = TimeSeries::from_points(vec![
            (t(0), Some(1.0)),
            (t(1), Some(2.0)),
            (t(1), Some(99.0)),
            (t(2), Some(3.0)),
        ]);

        let cleaned = remove_duplicates(series);
        assert_eq!(cleaned.timestamps(), &[t(0), t(1), t(2)]);
        assert_eq!(cleaned.values(), &[Some(1.0), Some(2.0), Some(3.0)]);
    }

    #[test]
    fn test_remove_duplicates_sorts() {
        let series = TimeSeries::from_points(vec![
            (t(2), Some(3.0)),
            (t(0), Some(1.0)),
            (t(2), Some(30.0)),
        ]);

        let cleaned = series.deduplicated();
        assert_eq!(cleaned.timestamps(), &[t(0), t(2)]);
        assert_eq!(cleaned.values(), &[Some(1.0), Some(3.0)]);
    }

    #[test]
    fn test_meter_series_keeps_first_reading() {
        let meter = MeterSeries::new(
            vec![t(0), t(0), t(1)],
            vec![
                MeterReading::Estimated(5.0),
                MeterReading::Actual(6.0),
                MeterReading::Missing,
            ],
        )
        .unwrap();

        let cleaned = meter.deduplicated();
        assert_eq!(cleaned.len(), 2);
        assert_eq!(cleaned.readings()[0], MeterReading::Estimated(5.0));
        assert!(cleaned.has_estimated_flags());

        let unflagged = MeterSeries::from_values(TimeSeries::from_points(vec![
            (t(1), Some(1.0)),
            (t(0), Some(2.0)),
            (t(1), Some(3.0)),
        ]))
        .deduplicated();
        assert_eq!(unflagged.len(), 2);
        assert!(!unflagged.has_estimated_flags());
    }

    #[test]
    fn test_clean_series_untouched() {
        let series = TimeSeries::from_points((0..5).map(|h| (t(h), Some(h as f64))));
        assert_eq!(series.clone().deduplicated(), series);
        assert!(TimeSeries::empty().deduplicated().is_empty());
    }
}
