use chrono::{DateTime, TimeDelta, Utc};

/// Milliseconds in one day.
pub const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Days from each timestamp to the next one.
///
/// Counts are reported on the start of each period, so the last entry has no
/// successor and is `NaN`. An empty index yields an empty vector.
///
/// # Examples
///
/// ```
/// use eemeter_rust::time::day_counts;
/// use chrono::{TimeZone, Utc};
///
/// let index = vec![
///     Utc.with_ymd_and_hms(2018, 1, 1, 0, 0, 0).unwrap(),
///     Utc.with_ymd_and_hms(2018, 1, 2, 12, 0, 0).unwrap(),
///     Utc.with_ymd_and_hms(2018, 1, 4, 12, 0, 0).unwrap(),
/// ];
/// let counts = day_counts(&index);
/// assert_eq!(counts[0], 1.5);
/// assert_eq!(counts[1], 2.0);
/// assert!(counts[2].is_nan());
/// ```
pub fn day_counts(index: &[DateTime<Utc>]) -> Vec<f64> {
    if index.is_empty() {
        return Vec::new();
    }

    index
        .windows(2)
        .map(|pair| elapsed_days(pair[0], pair[1]))
        .chain(std::iter::once(f64::NAN))
        .collect()
}

/// Fractional days between two instants.
pub fn elapsed_days(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    (end - start).num_milliseconds() as f64 / MILLIS_PER_DAY
}

/// Whole days in `delta`, rounded toward negative infinity.
///
/// Matches the convention of timedelta day counts: `-1h` is `-1` days,
/// `47h` is `1` day.
pub fn floor_days(delta: TimeDelta) -> i64 {
    delta.num_milliseconds().div_euclid(MILLIS_PER_DAY as i64)
}

/// Whole hours in `delta`, rounded toward negative infinity.
pub fn floor_hours(delta: TimeDelta) -> i64 {
    delta.num_milliseconds().div_euclid(3_600_000)
}
