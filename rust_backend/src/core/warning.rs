//! Data-quality warnings.
//!
//! A [`Warning`] is an immutable, purely informational record. Checks return
//! their findings as a [`WarningSet`] by value and the caller concatenates
//! them, so the order of a report follows the order the checks ran in.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Namespace shared by every sufficiency warning.
pub const SUFFICIENCY_NAMESPACE: &str = "eemeter.caltrack_sufficiency_criteria";

/// Stable warning identifiers, relative to [`SUFFICIENCY_NAMESPACE`].
pub mod names {
    pub const NO_DATA: &str = "no_data";
    pub const EXTRA_DATA_AFTER_REQUESTED_END_DATE: &str = "extra_data_after_requested_end_date";
    pub const EXTRA_DATA_BEFORE_REQUESTED_START_DATE: &str =
        "extra_data_before_requested_start_date";
    pub const NEGATIVE_METER_VALUES: &str = "negative_meter_values";
    pub const INCORRECT_NUMBER_OF_TOTAL_DAYS: &str = "incorrect_number_of_total_days";
    pub const TOO_MANY_DAYS_WITH_MISSING_DATA: &str = "too_many_days_with_missing_data";
    pub const TOO_MANY_DAYS_WITH_MISSING_METER_DATA: &str =
        "too_many_days_with_missing_meter_data";
    pub const TOO_MANY_DAYS_WITH_MISSING_TEMPERATURE_DATA: &str =
        "too_many_days_with_missing_temperature_data";
    pub const MISSING_TEMPERATURE_DATA: &str = "missing_temperature_data";
    pub const MISSING_METER_DATA: &str = "missing_meter_data";
    pub const EXTREME_VALUES_DETECTED: &str = "extreme_values_detected";
    pub const MISSING_HIGH_FREQUENCY_METER_DATA: &str = "missing_high_frequency_meter_data";
}

/// A structured, machine-matchable data-quality finding.
///
/// # Examples
///
/// ```
/// use eemeter_rust::core::warning::{names, Warning};
/// use serde_json::json;
///
/// let warning = Warning::sufficiency(
///     names::NEGATIVE_METER_VALUES,
///     "Found negative meter data values",
///     json!({ "n_negative_meter_values": 3 }),
/// );
/// assert_eq!(
///     warning.qualified_name(),
///     "eemeter.caltrack_sufficiency_criteria.negative_meter_values"
/// );
/// assert_eq!(warning.data()["n_negative_meter_values"], 3);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warning {
    qualified_name: String,
    description: String,
    data: Map<String, Value>,
}

impl Warning {
    /// Creates a warning. An object `data` becomes the mapping as is; `null`
    /// becomes an empty mapping and any other value is stored under `"value"`.
    pub fn new(
        qualified_name: impl Into<String>,
        description: impl Into<String>,
        data: Value,
    ) -> Self {
        let data = match data {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                let mut map = Map::new();
                map.insert("value".to_string(), other);
                map
            }
        };
        Self {
            qualified_name: qualified_name.into(),
            description: description.into(),
            data,
        }
    }

    /// A warning in the sufficiency namespace.
    pub fn sufficiency(name: &str, description: impl Into<String>, data: Value) -> Self {
        Self::new(format!("{}.{}", SUFFICIENCY_NAMESPACE, name), description, data)
    }

    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// Whether the qualified name ends with `.{name}`.
    pub fn is(&self, name: &str) -> bool {
        self.qualified_name
            .rsplit_once('.')
            .map(|(_, last)| last == name)
            .unwrap_or(self.qualified_name == name)
    }
}

/// Critical and non-critical findings of one or more checks.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WarningSet {
    pub critical: Vec<Warning>,
    pub non_critical: Vec<Warning>,
}

impl WarningSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn critical(warning: Warning) -> Self {
        Self {
            critical: vec![warning],
            non_critical: Vec::new(),
        }
    }

    pub fn non_critical(warning: Warning) -> Self {
        Self {
            critical: Vec::new(),
            non_critical: vec![warning],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.critical.is_empty() && self.non_critical.is_empty()
    }

    /// Appends `other` after the findings already held.
    pub fn extend(&mut self, other: WarningSet) {
        self.critical.extend(other.critical);
        self.non_critical.extend(other.non_critical);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_warning_data_shapes() {
        let empty = Warning::new("a.b", "desc", Value::Null);
        assert!(empty.data().is_empty());

        let listed = Warning::new("a.b", "desc", json!(["2018-01-01"]));
        assert_eq!(listed.data()["value"], json!(["2018-01-01"]));
    }

    #[test]
    fn test_is_matches_last_segment() {
        let warning = Warning::sufficiency(names::NO_DATA, "No data available.", Value::Null);
        assert!(warning.is(names::NO_DATA));
        assert!(!warning.is("data"));
        assert!(Warning::new("no_data", "", Value::Null).is("no_data"));
    }

    #[test]
    fn test_sets_concatenate_in_order() {
        let mut all = WarningSet::critical(Warning::new("x.first", "", Value::Null));
        all.extend(WarningSet::new());
        all.extend(WarningSet::critical(Warning::new("x.second", "", Value::Null)));
        all.extend(WarningSet::non_critical(Warning::new("x.third", "", Value::Null)));

        let names: Vec<_> = all.critical.iter().map(Warning::qualified_name).collect();
        assert_eq!(names, vec!["x.first", "x.second"]);
        assert_eq!(all.non_critical.len(), 1);
    }

    #[test]
    fn test_warning_serializes_three_fields() {
        let warning = Warning::sufficiency(
            names::INCORRECT_NUMBER_OF_TOTAL_DAYS,
            "Total data span does not match the required value.",
            json!({ "num_days": 365, "n_days_total": 366 }),
        );
        let value = serde_json::to_value(&warning).unwrap();
        assert_eq!(
            value["qualified_name"],
            "eemeter.caltrack_sufficiency_criteria.incorrect_number_of_total_days"
        );
        assert_eq!(value["data"]["n_days_total"], 366);
        assert_eq!(value.as_object().unwrap().len(), 3);
    }
}
