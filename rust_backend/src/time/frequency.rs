use chrono::{DateTime, Datelike, Days, Months, NaiveTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

const MILLIS_PER_MINUTE: i64 = 60_000;
const MILLIS_PER_HOUR: i64 = 3_600_000;
const MILLIS_PER_DAY: i64 = 86_400_000;

/// Calendar granularity of a resampled series.
///
/// Every variant describes left-closed, left-labelled bins in UTC. Fixed-width
/// bins are anchored on the Unix epoch, so any width that divides a day lines
/// up with midnight. Monthly bins run from the first of a month to the first
/// of the next.
///
/// # Examples
///
/// ```
/// use eemeter_rust::time::Frequency;
/// use chrono::{TimeZone, Utc};
///
/// let t = Utc.with_ymd_and_hms(2018, 2, 14, 13, 47, 0).unwrap();
/// assert_eq!(
///     Frequency::Daily.floor(t),
///     Utc.with_ymd_and_hms(2018, 2, 14, 0, 0, 0).unwrap()
/// );
/// assert_eq!(
///     Frequency::Monthly.next(Frequency::Monthly.floor(t)),
///     Utc.with_ymd_and_hms(2018, 3, 1, 0, 0, 0).unwrap()
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Frequency {
    Minutes(u32),
    Hours(u32),
    Daily,
    Monthly,
}

impl Frequency {
    /// Width of the bin when it does not depend on the calendar.
    pub fn fixed_width(&self) -> Option<TimeDelta> {
        match self {
            Frequency::Minutes(n) => Some(TimeDelta::milliseconds(*n as i64 * MILLIS_PER_MINUTE)),
            Frequency::Hours(n) => Some(TimeDelta::milliseconds(*n as i64 * MILLIS_PER_HOUR)),
            Frequency::Daily => Some(TimeDelta::milliseconds(MILLIS_PER_DAY)),
            Frequency::Monthly => None,
        }
    }

    /// Start of the bin containing `t`.
    pub fn floor(&self, t: DateTime<Utc>) -> DateTime<Utc> {
        match self.fixed_width() {
            Some(width) => {
                let width_ms = width.num_milliseconds().max(1);
                let excess_ms = t.timestamp_millis().rem_euclid(width_ms);
                let excess_ns = (t.timestamp_subsec_nanos() % 1_000_000) as i64;
                t - TimeDelta::milliseconds(excess_ms) - TimeDelta::nanoseconds(excess_ns)
            }
            None => {
                let first = t.date_naive() - Days::new(t.day0() as u64);
                first.and_time(NaiveTime::MIN).and_utc()
            }
        }
    }

    /// Start of the bin following the one that starts at `bin_start`.
    ///
    /// `bin_start` must already be floored.
    pub fn next(&self, bin_start: DateTime<Utc>) -> DateTime<Utc> {
        match self.fixed_width() {
            Some(width) => bin_start + width,
            None => (bin_start.date_naive() + Months::new(1))
                .and_time(NaiveTime::MIN)
                .and_utc(),
        }
    }

    /// Whether `t` sits exactly on a bin boundary.
    pub fn is_aligned(&self, t: DateTime<Utc>) -> bool {
        self.floor(t) == t
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frequency::Minutes(n) => write!(f, "{}min", n),
            Frequency::Hours(n) => write!(f, "{}H", n),
            Frequency::Daily => write!(f, "D"),
            Frequency::Monthly => write!(f, "MS"),
        }
    }
}

impl FromStr for Frequency {
    type Err = Error;

    /// Parses pandas-style aliases: `15min`, `1T`, `H`, `2h`, `D`, `daily`, `MS`, `M`, `monthly`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let lower = trimmed.to_lowercase();
        match lower.as_str() {
            "d" | "1d" | "day" | "daily" => return Ok(Frequency::Daily),
            "m" | "ms" | "me" | "month" | "monthly" => return Ok(Frequency::Monthly),
            "h" | "hour" | "hourly" => return Ok(Frequency::Hours(1)),
            _ => {}
        }

        let digits_end = lower
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(lower.len());
        let (count, unit) = lower.split_at(digits_end);
        let count: u32 = if count.is_empty() {
            1
        } else {
            count
                .parse()
                .map_err(|_| Error::InvalidInput(format!("Invalid frequency: {}", trimmed)))?
        };
        if count == 0 {
            return Err(Error::InvalidInput(format!(
                "Frequency must be positive: {}",
                trimmed
            )));
        }

        match unit.trim() {
            "min" | "t" | "minute" | "minutes" => Ok(Frequency::Minutes(count)),
            "h" | "hour" | "hours" => Ok(Frequency::Hours(count)),
            "d" if count == 1 => Ok(Frequency::Daily),
            _ => Err(Error::InvalidInput(format!(
                "Unsupported frequency: {}. Use minutes, hours, 'D' or 'MS'",
                trimmed
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_floor_fixed_width() {
        let t = utc(2019, 6, 3, 10, 47);
        assert_eq!(Frequency::Minutes(15).floor(t), utc(2019, 6, 3, 10, 45));
        assert_eq!(Frequency::Hours(1).floor(t), utc(2019, 6, 3, 10, 0));
        assert_eq!(Frequency::Daily.floor(t), utc(2019, 6, 3, 0, 0));
    }

    #[test]
    fn test_floor_before_epoch() {
        let t = utc(1969, 12, 31, 23, 30);
        assert_eq!(Frequency::Daily.floor(t), utc(1969, 12, 31, 0, 0));
    }

    #[test]
    fn test_monthly_bins() {
        let t = utc(2020, 2, 29, 23, 59);
        let start = Frequency::Monthly.floor(t);
        assert_eq!(start, utc(2020, 2, 1, 0, 0));
        assert_eq!(Frequency::Monthly.next(start), utc(2020, 3, 1, 0, 0));
        assert_eq!(
            Frequency::Monthly.next(utc(2019, 12, 1, 0, 0)),
            utc(2020, 1, 1, 0, 0)
        );
    }

    #[test]
    fn test_is_aligned() {
        assert!(Frequency::Daily.is_aligned(utc(2018, 1, 1, 0, 0)));
        assert!(!Frequency::Daily.is_aligned(utc(2018, 1, 1, 0, 1)));
        assert!(Frequency::Monthly.is_aligned(utc(2018, 7, 1, 0, 0)));
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!("15min".parse::<Frequency>().unwrap(), Frequency::Minutes(15));
        assert_eq!("H".parse::<Frequency>().unwrap(), Frequency::Hours(1));
        assert_eq!("2h".parse::<Frequency>().unwrap(), Frequency::Hours(2));
        assert_eq!("D".parse::<Frequency>().unwrap(), Frequency::Daily);
        assert_eq!("M".parse::<Frequency>().unwrap(), Frequency::Monthly);
        assert_eq!("MS".parse::<Frequency>().unwrap(), Frequency::Monthly);
        assert!("0min".parse::<Frequency>().is_err());
        assert!("3W".parse::<Frequency>().is_err());
    }

    #[test]
    fn test_display_roundtrip() {
        for freq in [
            Frequency::Minutes(30),
            Frequency::Hours(1),
            Frequency::Daily,
            Frequency::Monthly,
        ] {
            assert_eq!(freq.to_string().parse::<Frequency>().unwrap(), freq);
        }
    }
}
