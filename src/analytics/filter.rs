//! Record filtering by optional criteria.

use serde::{Deserialize, Serialize};

use crate::types::Record;

/// Optional filter criteria, combined by logical AND.
///
/// Each field is independently optional; `None` means "no constraint on this
/// dimension". Age bounds are explicit `Option`s so that a zero bound stays a
/// real constraint — `age_min: Some(0)` and `age_min: None` behave
/// differently.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Exact match on the raw gender value.
    pub gender: Option<String>,
    /// Exact match on the raw school-year value.
    pub school_year: Option<String>,
    /// Exact match on the raw intended-university value.
    pub intended_university: Option<String>,
    /// Inclusive lower age bound.
    pub age_min: Option<i32>,
    /// Inclusive upper age bound.
    pub age_max: Option<i32>,
}

impl FilterCriteria {
    /// Whether no constraint is set on any dimension.
    pub fn is_empty(&self) -> bool {
        self.gender.is_none()
            && self.school_year.is_none()
            && self.intended_university.is_none()
            && self.age_min.is_none()
            && self.age_max.is_none()
    }

    /// Whether `record` satisfies every supplied constraint.
    ///
    /// Equality criteria compare against the raw field value; a record whose
    /// field is absent never matches a present criterion. A record with an
    /// absent age is excluded whenever either bound is supplied — it cannot
    /// prove it satisfies the bound.
    pub fn matches(&self, record: &Record) -> bool {
        if let Some(gender) = self.gender.as_deref() {
            if record.gender.as_deref() != Some(gender) {
                return false;
            }
        }
        if let Some(school_year) = self.school_year.as_deref() {
            if record.school_year.as_deref() != Some(school_year) {
                return false;
            }
        }
        if let Some(university) = self.intended_university.as_deref() {
            if record.intended_university.as_deref() != Some(university) {
                return false;
            }
        }

        if self.age_min.is_some() || self.age_max.is_some() {
            let Some(age) = record.age else {
                return false;
            };
            if self.age_min.is_some_and(|min| age < min) {
                return false;
            }
            if self.age_max.is_some_and(|max| age > max) {
                return false;
            }
        }

        true
    }
}
