//! Pure analytical computations over normalized records.
//!
//! Everything in this module operates on `&[Record]` slices produced by the
//! normalizer; nothing here touches the store or mutates its input.
//!
//! Currently implemented:
//!
//! - [`FilterCriteria`]: AND-composed optional criteria over one record
//! - [`frequency()`]: value → count distribution of one categorical field
//! - [`describe()`]: count/mean/sample-deviation of a numeric collection
//! - [`profile_cells()`]: fixed demographic cells per interest band
//!
//! ## Example: filter → count
//!
//! ```rust
//! use survey_analytics::analytics::{FilterCriteria, frequency};
//! use survey_analytics::types::Record;
//!
//! let mut a = Record::with_id(1);
//! a.gender = Some("Homem".to_string());
//! a.shift_preference = Some("Manhã".to_string());
//! let mut b = Record::with_id(2);
//! b.gender = Some("Mulher".to_string());
//! b.shift_preference = Some("Manhã".to_string());
//! let population = vec![a, b];
//!
//! // Keep only one gender...
//! let criteria = FilterCriteria {
//!     gender: Some("Homem".to_string()),
//!     ..Default::default()
//! };
//! let working_set: Vec<&Record> =
//!     population.iter().filter(|r| criteria.matches(r)).collect();
//! assert_eq!(working_set.len(), 1);
//!
//! // ...or count shift preferences over the whole population.
//! let shifts = frequency(&population, |r| r.shift_preference.as_deref());
//! assert_eq!(shifts["Manhã"], 2);
//! ```

pub mod describe;
pub mod filter;
pub mod frequency;
pub mod profile;

pub use describe::{DescriptiveStats, describe};
pub use filter::FilterCriteria;
pub use frequency::frequency;
pub use profile::{HUMANITIES_BAND, ProfileCell, TECH_BAND, profile_cells};
