//! `survey-analytics` ingests survey responses from a spreadsheet-backed
//! store and answers analytical queries over them: filtered listings of
//! individual responses, and aggregate statistics (frequency distributions,
//! descriptive statistics, and demographic profiles) computed over filtered
//! subsets.
//!
//! ## How it fits together
//!
//! A [`store::SurveyStore`] yields the raw rows of one spreadsheet file
//! (CSV always; workbooks behind the `excel` feature). The normalizer turns
//! each raw row into a typed [`types::Record`], deriving the age from the
//! birth date. The [`engine::AnalyticsEngine`] re-reads and re-normalizes the
//! population on every query — results always reflect the latest persisted
//! rows — then applies an AND-composed [`analytics::FilterCriteria`] and runs
//! the aggregations.
//!
//! Demographic profiles are the exception to filtering: they are always
//! computed over the full population, so that interest-band comparisons stay
//! meaningful regardless of the active filter.
//!
//! ## Quick example
//!
//! ```no_run
//! use survey_analytics::analytics::FilterCriteria;
//! use survey_analytics::engine::{AnalyticsEngine, StatisticsOutcome};
//! use survey_analytics::store::StoreOptions;
//!
//! # fn main() -> Result<(), survey_analytics::StoreError> {
//! // Backend auto-detected from the extension (.csv/.xlsx/...).
//! let engine = AnalyticsEngine::open("responses.xlsx", &StoreOptions::default())?;
//!
//! let adults = FilterCriteria {
//!     age_min: Some(18),
//!     ..Default::default()
//! };
//! for view in engine.list_records(&adults)? {
//!     println!("#{} {}", view.id, view.name);
//! }
//!
//! match engine.compute_statistics(&adults)? {
//!     StatisticsOutcome::Report(report) => {
//!         println!("participants: {}", report.total_participants);
//!     }
//!     StatisticsOutcome::NoMatches => println!("no matching responses"),
//!     StatisticsOutcome::StoreMissing => println!("store file not found"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Determinism
//!
//! The derived age depends on the date it is computed at, so the engine's
//! convenience methods are wall-clock dependent. Callers that need
//! reproducible output (tests, replays) use the `_as_of` variants and pass
//! the date explicitly.
//!
//! ## Modules
//!
//! - [`store`]: spreadsheet store backends and format detection
//! - [`types`]: raw cells, the column contract, records and views
//! - [`normalize`]: row → record normalization
//! - [`analytics`]: filters, frequencies, descriptive stats, profiles
//! - [`engine`]: the query orchestrator and its observability hooks
//! - [`error`]: the shared store error type

pub mod analytics;
pub mod engine;
pub mod error;
pub mod normalize;
pub mod store;
pub mod types;

pub use error::{StoreError, StoreResult};
