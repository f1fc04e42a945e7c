//! Error types for the resampling and sufficiency engine.
//!
//! Only structural problems are errors. Data-quality findings (gaps, missing
//! temperature, negative readings, ...) are reported as
//! [`Warning`](crate::core::warning::Warning) values and never travel through
//! this type.

use polars::prelude::PolarsError;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the engine
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Input has the wrong shape or type, e.g. a table where a single series is required
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    /// Input is well typed but unusable
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    /// JSON parse failure, with the path of the offending element
    #[error("JSON error at '{path}': {message}")]
    Json { path: String, message: String },

    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

impl Error {
    pub(crate) fn type_mismatch(expected: &str, found: impl std::fmt::Display) -> Self {
        Error::TypeMismatch(format!("expected {}, got {}", expected, found))
    }
}

impl From<serde_path_to_error::Error<serde_json::Error>> for Error {
    fn from(err: serde_path_to_error::Error<serde_json::Error>) -> Self {
        Error::Json {
            path: err.path().to_string(),
            message: err.inner().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_mismatch_message() {
        let err = Error::type_mismatch("series", "frame with 3 columns");
        assert_eq!(
            err.to_string(),
            "Type mismatch: expected series, got frame with 3 columns"
        );
    }

    #[test]
    fn test_json_error_carries_path() {
        let mut de = serde_json::Deserializer::from_str(r#"{"values": [1, "x"]}"#);
        #[derive(Debug, serde::Deserialize)]
        #[allow(dead_code)]
        struct Doc {
            values: Vec<f64>,
        }
        let err: Error = serde_path_to_error::deserialize::<_, Doc>(&mut de)
            .unwrap_err()
            .into();
        match err {
            Error::Json { path, .. } => assert_eq!(path, "values[1]"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
