use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::Path;

use crate::core::domain::{MeterReading, MeterSeries, TimeSeries};
use crate::error::Error;

/// One meter read as found in JSON input.
#[derive(Debug, Deserialize)]
struct RawMeterRecord {
    start: DateTime<FixedOffset>,
    value: Option<f64>,
    #[serde(default)]
    estimated: Option<bool>,
}

/// One temperature observation as found in JSON input.
#[derive(Debug, Deserialize)]
struct RawTemperatureRecord {
    dt: DateTime<FixedOffset>,
    temp: Option<f64>,
}

fn parse_records<T: DeserializeOwned>(json_str: &str) -> std::result::Result<Vec<T>, Error> {
    let de = &mut serde_json::Deserializer::from_str(json_str);
    Ok(serde_path_to_error::deserialize(de)?)
}

/// Parse meter reads from a JSON array of `{start, value, estimated?}`.
///
/// Offsets are normalized to UTC. A missing `estimated` field means the read
/// is actual; the series carries estimated flags when any record has one.
pub fn load_meter_json_str(json_str: &str) -> Result<MeterSeries> {
    let records: Vec<RawMeterRecord> =
        parse_records(json_str).context("Failed to parse meter JSON")?;
    let flagged = records.iter().any(|r| r.estimated.is_some());

    let (timestamps, readings) = records
        .into_iter()
        .map(|r| {
            (
                r.start.with_timezone(&Utc),
                MeterReading::from_parts(r.value, r.estimated),
            )
        })
        .unzip();

    Ok(MeterSeries::new(timestamps, readings)
        .context("Failed to build meter series")?
        .with_estimated_flags(flagged))
}

/// Load meter reads from a JSON file
pub fn load_meter_json(path: &Path) -> Result<MeterSeries> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read meter file: {}", path.display()))?;

    load_meter_json_str(&content)
}

/// Parse temperatures from a JSON array of `{dt, temp}`.
pub fn load_temperature_json_str(json_str: &str) -> Result<TimeSeries> {
    let records: Vec<RawTemperatureRecord> =
        parse_records(json_str).context("Failed to parse temperature JSON")?;

    Ok(TimeSeries::from_points(
        records
            .into_iter()
            .map(|r| (r.dt.with_timezone(&Utc), r.temp)),
    ))
}

/// Load temperatures from a JSON file
pub fn load_temperature_json(path: &Path) -> Result<TimeSeries> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read temperature file: {}", path.display()))?;

    load_temperature_json_str(&content)
}
