//! Data sufficiency evaluation.
//!
//! - [`statistics`]: quartiles and the extreme-value limit
//! - [`sufficiency`]: the CalTRACK sufficiency criteria
//!
//! # Example
//!
//! ```
//! use eemeter_rust::algorithms::caltrack_sufficiency_criteria;
//! use eemeter_rust::config::SufficiencyConfig;
//! use eemeter_rust::core::domain::SufficiencyTable;
//!
//! let report = caltrack_sufficiency_criteria(
//!     SufficiencyTable::empty(),
//!     None,
//!     None,
//!     &SufficiencyConfig::default(),
//! )
//! .unwrap();
//! assert!(!report.is_sufficient());
//! ```

pub mod statistics;
pub mod sufficiency;


pub use statistics::Quartiles;
pub use sufficiency::{caltrack_sufficiency_criteria, SufficiencyReport};
