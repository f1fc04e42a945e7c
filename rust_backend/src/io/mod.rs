//! Data loading and DataFrame conversion.
//!
//! - [`frames`]: polars `DataFrame` <-> engine tables
//! - [`loaders`]: JSON meter and temperature loaders
//!
//! # Example
//!
//! ```no_run
//! use eemeter_rust::io::loaders::{load_meter_json, load_temperature_json};
//! use std::path::Path;
//!
//! let meter = load_meter_json(Path::new("meter.json")).expect("Failed to load");
//! let temperature = load_temperature_json(Path::new("temperature.json")).expect("Failed to load");
//! println!("Loaded {} reads and {} temperatures", meter.len(), temperature.len());
//! ```

pub mod frames;
pub mod loaders;


pub use frames::{
    coverage_table_to_frame, meter_series_from_frame, meter_table_to_frame,
    sufficiency_table_from_frame, sufficiency_table_to_frame, time_series_from_frame,
    time_series_to_frame,
};
pub use loaders::{
    load_meter_json, load_meter_json_str, load_temperature_json, load_temperature_json_str,
};
