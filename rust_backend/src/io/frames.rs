//! Conversions between polars `DataFrame`s and the engine's tables.
//!
//! Frames carry timestamps as a `Datetime` column interpreted as UTC; any time
//! unit is accepted on input and milliseconds are written on output. Value
//! columns may be any float or integer type and are read as `f64`.

use chrono::{DateTime, Utc};
use polars::prelude::*;

use crate::core::domain::{
    CoverageTable, MeterReading, MeterSeries, MeterTable, SufficiencyRow, SufficiencyTable,
    TimeSeries, Timestamp,
};
use crate::error::{Error, Result};

pub const TIMESTAMP_COLUMN: &str = "timestamp";
pub const VALUE_COLUMN: &str = "value";
pub const ESTIMATED_COLUMN: &str = "estimated";
pub const COVERAGE_COLUMN: &str = "coverage";
pub const TEMPERATURE_MEAN_COLUMN: &str = "temperature_mean";
pub const TEMPERATURE_NOT_NULL_COLUMN: &str = "temperature_not_null";
pub const TEMPERATURE_NULL_COLUMN: &str = "temperature_null";

fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    df.column(name)
        .map_err(|_| Error::type_mismatch(&format!("column '{}'", name), "no such column"))
}

fn to_timestamp(raw: i64, unit: TimeUnit) -> Option<Timestamp> {
    match unit {
        TimeUnit::Nanoseconds => Some(DateTime::<Utc>::from_timestamp_nanos(raw)),
        TimeUnit::Microseconds => DateTime::<Utc>::from_timestamp_micros(raw),
        TimeUnit::Milliseconds => DateTime::<Utc>::from_timestamp_millis(raw),
    }
}

/// Reads a `Datetime` column as UTC instants. Nulls are rejected.
pub fn timestamps_from_frame(df: &DataFrame, name: &str) -> Result<Vec<Timestamp>> {
    let col = column(df, name)?;
    let unit = match col.dtype() {
        DataType::Datetime(unit, _) => *unit,
        other => {
            return Err(Error::type_mismatch(
                &format!("datetime column '{}'", name),
                other,
            ))
        }
    };

    let raw = col.cast(&DataType::Int64)?;
    raw.i64()?
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            value.and_then(|v| to_timestamp(v, unit)).ok_or_else(|| {
                Error::InvalidInput(format!("Null or out of range timestamp at row {}", row))
            })
        })
        .collect()
}

/// Reads a numeric column as `f64`, nulls kept as `None`.
pub fn values_from_frame(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let col = column(df, name)?;
    match col.dtype() {
        DataType::Float64
        | DataType::Float32
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt32
        | DataType::UInt64 => {}
        other => {
            return Err(Error::type_mismatch(
                &format!("numeric column '{}'", name),
                other,
            ))
        }
    }

    let values = col.cast(&DataType::Float64)?;
    Ok(values.f64()?.into_iter().collect())
}

/// Name of the only column besides `time_col`.
pub fn single_value_column(df: &DataFrame, time_col: &str) -> Result<String> {
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|n| n.to_string())
        .collect();
    let others: Vec<&String> = names.iter().filter(|n| n.as_str() != time_col).collect();

    if others.len() != 1 || others.len() == names.len() {
        return Err(Error::type_mismatch(
            &format!("'{}' and a single value column", time_col),
            format!("columns {:?}", names),
        ));
    }
    Ok(others[0].clone())
}

pub fn time_series_from_frame(df: &DataFrame, time_col: &str, value_col: &str) -> Result<TimeSeries> {
    TimeSeries::new(
        timestamps_from_frame(df, time_col)?,
        values_from_frame(df, value_col)?,
    )
}

/// Reads raw meter data from `timestamp`, `value` and optional `estimated`.
///
/// Without an `estimated` column every present value is an actual reading
/// and the series carries no estimated flags.
/// Any other column is a [`Error::TypeMismatch`].
pub fn meter_series_from_frame(df: &DataFrame) -> Result<MeterSeries> {
    let unexpected: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|n| n.to_string())
        .filter(|n| ![TIMESTAMP_COLUMN, VALUE_COLUMN, ESTIMATED_COLUMN].contains(&n.as_str()))
        .collect();
    if !unexpected.is_empty() {
        return Err(Error::type_mismatch(
            "meter frame with timestamp, value and estimated columns",
            format!("extra columns {:?}", unexpected),
        ));
    }

    let timestamps = timestamps_from_frame(df, TIMESTAMP_COLUMN)?;
    let values = values_from_frame(df, VALUE_COLUMN)?;
    let (estimated, flagged): (Vec<Option<bool>>, bool) = match df.column(ESTIMATED_COLUMN) {
        Ok(col) if col.dtype() == &DataType::Boolean => (col.bool()?.into_iter().collect(), true),
        Ok(col) => {
            return Err(Error::type_mismatch(
                "boolean column 'estimated'",
                col.dtype(),
            ))
        }
        Err(_) => (vec![None; values.len()], false),
    };

    let readings = values
        .into_iter()
        .zip(estimated)
        .map(|(value, flag)| MeterReading::from_parts(value, flag))
        .collect();
    Ok(MeterSeries::new(timestamps, readings)?.with_estimated_flags(flagged))
}

fn datetime_column(name: &str, timestamps: &[Timestamp]) -> Result<Column> {
    let millis: Vec<i64> = timestamps.iter().map(|t| t.timestamp_millis()).collect();
    let series = Series::new(name.into(), millis)
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?;
    Ok(series.into_column())
}

fn float_column(name: &str, values: Vec<Option<f64>>) -> Column {
    Series::new(name.into(), values).into_column()
}

pub fn time_series_to_frame(series: &TimeSeries, time_col: &str, value_col: &str) -> Result<DataFrame> {
    Ok(DataFrame::new(vec![
        datetime_column(time_col, series.timestamps())?,
        float_column(value_col, series.values().to_vec()),
    ])?)
}

pub fn coverage_table_to_frame(
    table: &CoverageTable,
    time_col: &str,
    value_col: &str,
    include_coverage: bool,
) -> Result<DataFrame> {
    let mut columns = vec![
        datetime_column(time_col, &table.timestamps)?,
        float_column(value_col, table.values.clone()),
    ];
    if include_coverage {
        columns.push(float_column(COVERAGE_COLUMN, table.coverage.clone()));
    }
    Ok(DataFrame::new(columns)?)
}

pub fn meter_table_to_frame(table: &MeterTable) -> Result<DataFrame> {
    time_series_to_frame(table.as_series(), TIMESTAMP_COLUMN, MeterTable::VALUE_COLUMN)
}

pub fn sufficiency_table_to_frame(table: &SufficiencyTable) -> Result<DataFrame> {
    let rows = &table.rows;
    Ok(DataFrame::new(vec![
        datetime_column(TIMESTAMP_COLUMN, &table.timestamps())?,
        float_column(
            MeterTable::VALUE_COLUMN,
            rows.iter().map(|r| r.meter_value).collect(),
        ),
        float_column(
            TEMPERATURE_MEAN_COLUMN,
            rows.iter().map(|r| r.temperature_mean).collect(),
        ),
        Series::new(
            TEMPERATURE_NOT_NULL_COLUMN.into(),
            rows.iter().map(|r| r.temperature_not_null).collect::<Vec<f64>>(),
        )
        .into_column(),
        Series::new(
            TEMPERATURE_NULL_COLUMN.into(),
            rows.iter().map(|r| r.temperature_null).collect::<Vec<f64>>(),
        )
        .into_column(),
    ])?)
}

/// Reads an evaluator table. Null temperature counts become `NaN`, which
/// makes the period invalid for temperature coverage.
pub fn sufficiency_table_from_frame(df: &DataFrame) -> Result<SufficiencyTable> {
    let timestamps = timestamps_from_frame(df, TIMESTAMP_COLUMN)?;
    let meter_value = values_from_frame(df, MeterTable::VALUE_COLUMN)?;
    let temperature_mean = values_from_frame(df, TEMPERATURE_MEAN_COLUMN)?;
    let not_null = values_from_frame(df, TEMPERATURE_NOT_NULL_COLUMN)?;
    let null = values_from_frame(df, TEMPERATURE_NULL_COLUMN)?;

    let rows = timestamps
        .into_iter()
        .enumerate()
        .map(|(i, timestamp)| SufficiencyRow {
            timestamp,
            meter_value: meter_value[i].filter(|v| !v.is_nan()),
            temperature_mean: temperature_mean[i].filter(|v| !v.is_nan()),
            temperature_not_null: not_null[i].unwrap_or(f64::NAN),
            temperature_null: null[i].unwrap_or(f64::NAN),
        })
        .collect();
    Ok(SufficiencyTable::new(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};

    fn start() -> Timestamp {
        Utc.with_ymd_and_hms(2018, 1, 1, 0, 0, 0).unwrap()
    }

    fn meter_frame(with_estimated: bool) -> DataFrame {
        let index: Vec<Timestamp> = (0..3).map(|d| start() + TimeDelta::days(d)).collect();
        let mut columns = vec![
            datetime_column(TIMESTAMP_COLUMN, &index).unwrap(),
            Series::new(VALUE_COLUMN.into(), vec![Some(1i64), None, Some(3)]).into_column(),
        ];
        if with_estimated {
            columns.push(
                Series::new(ESTIMATED_COLUMN.into(), vec![Some(false), Some(true), Some(true)])
                    .into_column(),
            );
        }
        DataFrame::new(columns).unwrap()
    }

    #[test]
    fn test_meter_series_with_estimated() {
        let meter = meter_series_from_frame(&meter_frame(true)).unwrap();
        assert_eq!(
            meter.readings(),
            &[
                MeterReading::Actual(1.0),
                MeterReading::Missing,
                MeterReading::Estimated(3.0)
            ]
        );
        assert_eq!(meter.timestamps()[2], start() + TimeDelta::days(2));
        assert!(meter.has_estimated_flags());
    }

    #[test]
    fn test_meter_series_without_estimated() {
        let meter = meter_series_from_frame(&meter_frame(false)).unwrap();
        assert!(!meter.has_estimated_flags());
        assert!(!meter.readings().iter().any(MeterReading::is_estimated));
        assert_eq!(meter.len(), 3);
    }

    #[test]
    fn test_meter_frame_extra_column() {
        let mut df = meter_frame(false);
        df.with_column(Series::new("other".into(), vec![1.0f64, 2.0, 3.0]))
            .unwrap();
        assert!(matches!(
            meter_series_from_frame(&df),
            Err(Error::TypeMismatch(_))
        ));
    }

    #[test]
    fn test_non_numeric_value_column() {
        let df = DataFrame::new(vec![
            datetime_column(TIMESTAMP_COLUMN, &[start()]).unwrap(),
            Series::new(VALUE_COLUMN.into(), vec!["a"]).into_column(),
        ])
        .unwrap();
        assert!(matches!(
            time_series_from_frame(&df, TIMESTAMP_COLUMN, VALUE_COLUMN),
            Err(Error::TypeMismatch(_))
        ));
    }

    #[test]
    fn test_non_datetime_index() {
        let df = DataFrame::new(vec![
            Series::new(TIMESTAMP_COLUMN.into(), vec![1i64]).into_column(),
            Series::new(VALUE_COLUMN.into(), vec![1.0f64]).into_column(),
        ])
        .unwrap();
        assert!(matches!(
            time_series_from_frame(&df, TIMESTAMP_COLUMN, VALUE_COLUMN),
            Err(Error::TypeMismatch(_))
        ));
    }

    #[test]
    fn test_microsecond_timestamps() {
        let micros = Series::new(TIMESTAMP_COLUMN.into(), vec![start().timestamp_micros()])
            .cast(&DataType::Datetime(TimeUnit::Microseconds, None))
            .unwrap();
        let df = DataFrame::new(vec![micros.into_column()]).unwrap();
        assert_eq!(timestamps_from_frame(&df, TIMESTAMP_COLUMN).unwrap(), vec![start()]);
    }

    #[test]
    fn test_single_value_column() {
        let df = meter_frame(false);
        assert_eq!(single_value_column(&df, TIMESTAMP_COLUMN).unwrap(), "value");
        assert!(single_value_column(&meter_frame(true), TIMESTAMP_COLUMN).is_err());
        assert!(single_value_column(&df, "missing").is_err());
    }

    #[test]
    fn test_sufficiency_table_frame_roundtrip() {
        let table = SufficiencyTable::new(vec![
            SufficiencyRow {
                timestamp: start(),
                meter_value: Some(2.0),
                temperature_mean: None,
                temperature_not_null: 0.0,
                temperature_null: 24.0,
            },
            SufficiencyRow {
                timestamp: start() + TimeDelta::days(1),
                meter_value: None,
                temperature_mean: Some(55.5),
                temperature_not_null: 24.0,
                temperature_null: 0.0,
            },
        ]);

        let df = sufficiency_table_to_frame(&table).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(sufficiency_table_from_frame(&df).unwrap(), table);
    }
}
