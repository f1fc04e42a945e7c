//! Calendar and elapsed-time arithmetic.
//!
//! All instants are `DateTime<Utc>` and all day quantities come from exact
//! elapsed milliseconds divided by the length of a day.
//!
//! - [`frequency`]: calendar bins used by the resampler
//! - [`intervals`]: elapsed days between consecutive samples

pub mod frequency;
pub mod intervals;

pub use frequency::Frequency;
pub use intervals::{day_counts, elapsed_days, floor_days, floor_hours};
