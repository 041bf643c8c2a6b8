//! Core data model types.
//!
//! The store layer yields raw spreadsheet rows as `Vec<Cell>`; the normalizer
//! in [`crate::normalize`] turns one raw row into a typed [`Record`]. Column
//! positions are a fixed, versioned contract described by [`columns`].

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// A single raw cell value as produced by a [`crate::store::SurveyStore`].
///
/// CSV stores produce `Text`/`Null` cells only; workbook stores preserve the
/// native cell types (numbers, booleans, date-times).
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Missing/empty cell.
    Null,
    /// 64-bit signed integer.
    Int(i64),
    /// 64-bit float.
    Float(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 string.
    Text(String),
    /// Date-time cell (workbook date cells land here).
    DateTime(NaiveDateTime),
}

impl Cell {
    /// Returns `true` for `Null` and for empty text.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Null => true,
            Cell::Text(s) => s.is_empty(),
            _ => false,
        }
    }
}

/// Column positions of the survey export, 0-based.
///
/// The workbook has 29 columns of which 25 are mapped; the gaps are unused
/// export artifacts (start time, e-mail, points, ...). Positions are a
/// versioned contract with the form export, not discovered from headers.
pub mod columns {
    pub const ID: usize = 0;
    pub const COMPLETED_AT: usize = 2;
    pub const NAME: usize = 4;
    pub const BIRTH_DATE: usize = 6;
    pub const GENDER: usize = 7;
    pub const SCHOOL_YEAR: usize = 8;
    pub const INTENDED_UNIVERSITY: usize = 10;
    pub const SHIFT_PREFERENCE: usize = 11;
    pub const INTEREST_TECHNOLOGY: usize = 12;
    pub const INTEREST_CHALLENGES: usize = 13;
    pub const INTEREST_MATH: usize = 14;
    pub const INTEREST_PORTUGUESE: usize = 15;
    pub const PREFERRED_SUBJECT: usize = 16;
    pub const PROGRAMMING_CONTACT: usize = 17;
    pub const LIKES_GAMES: usize = 18;
    pub const OWNS_CONSOLE: usize = 19;
    pub const OWNS_COMPUTER: usize = 20;
    pub const OWNS_INTERNET: usize = 21;
    pub const OWNS_PHONE: usize = 22;
    pub const OWNS_MOBILE_INTERNET: usize = 23;
    pub const EVALUATION_EXPLANATIONS: usize = 24;
    pub const EVALUATION_APPLICATIONS: usize = 25;
    pub const EVALUATION_TECHNOLOGIES: usize = 26;
    pub const EVALUATION_COMPREHENSION: usize = 27;
    pub const EVALUATION_OVERALL: usize = 28;

    /// Total row width of the export.
    pub const WIDTH: usize = 29;
}

/// One normalized survey response.
///
/// All categorical fields are copied verbatim from the row — no trimming or
/// case folding, so distinct spellings are distinct categories. `age` is the
/// only derived field; it depends on the "as of" date passed to the
/// normalizer and is never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: i64,
    pub completed_at: Option<String>,
    pub name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    /// Exact calendar age at the normalization "as of" date.
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub school_year: Option<String>,
    pub intended_university: Option<String>,
    pub shift_preference: Option<String>,
    pub interest_technology: Option<String>,
    pub interest_challenges: Option<String>,
    pub interest_math: Option<String>,
    pub interest_portuguese: Option<String>,
    pub preferred_subject: Option<String>,
    pub programming_contact: Option<String>,
    pub likes_games: Option<String>,
    pub owns_console: Option<String>,
    pub owns_computer: Option<String>,
    pub owns_internet: Option<String>,
    pub owns_phone: Option<String>,
    pub owns_mobile_internet: Option<String>,
    pub evaluation_explanations: Option<String>,
    pub evaluation_applications: Option<String>,
    pub evaluation_technologies: Option<String>,
    pub evaluation_comprehension: Option<String>,
    pub evaluation_overall: Option<String>,
}

impl Record {
    /// Create a record with the given id and every other field absent.
    ///
    /// Mostly useful for building records programmatically; store-backed
    /// records come from [`crate::normalize::normalize_row`].
    pub fn with_id(id: i64) -> Self {
        Self {
            id,
            completed_at: None,
            name: None,
            birth_date: None,
            age: None,
            gender: None,
            school_year: None,
            intended_university: None,
            shift_preference: None,
            interest_technology: None,
            interest_challenges: None,
            interest_math: None,
            interest_portuguese: None,
            preferred_subject: None,
            programming_contact: None,
            likes_games: None,
            owns_console: None,
            owns_computer: None,
            owns_internet: None,
            owns_phone: None,
            owns_mobile_internet: None,
            evaluation_explanations: None,
            evaluation_applications: None,
            evaluation_technologies: None,
            evaluation_comprehension: None,
            evaluation_overall: None,
        }
    }
}

/// Placeholder shown for responses submitted without a name.
pub const ANONYMOUS_NAME: &str = "Anônimo";

/// Presentation-side view of a [`Record`].
///
/// Built at the query boundary: an absent/empty name renders as
/// [`ANONYMOUS_NAME`] and the birth date is stringified. The underlying
/// [`Record`] keeps raw nullability.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordView {
    pub id: i64,
    pub completed_at: Option<String>,
    pub name: String,
    pub birth_date: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub school_year: Option<String>,
    pub intended_university: Option<String>,
    pub shift_preference: Option<String>,
    pub interest_technology: Option<String>,
    pub interest_challenges: Option<String>,
    pub interest_math: Option<String>,
    pub interest_portuguese: Option<String>,
    pub preferred_subject: Option<String>,
    pub programming_contact: Option<String>,
    pub likes_games: Option<String>,
    pub owns_console: Option<String>,
    pub owns_computer: Option<String>,
    pub owns_internet: Option<String>,
    pub owns_phone: Option<String>,
    pub owns_mobile_internet: Option<String>,
    pub evaluation_explanations: Option<String>,
    pub evaluation_applications: Option<String>,
    pub evaluation_technologies: Option<String>,
    pub evaluation_comprehension: Option<String>,
    pub evaluation_overall: Option<String>,
}

impl RecordView {
    /// Build the presentation view of a record.
    pub fn from_record(record: &Record) -> Self {
        let name = match record.name.as_deref() {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => ANONYMOUS_NAME.to_string(),
        };
        Self {
            id: record.id,
            completed_at: record.completed_at.clone(),
            name,
            birth_date: record.birth_date.map(|d| d.to_string()),
            age: record.age,
            gender: record.gender.clone(),
            school_year: record.school_year.clone(),
            intended_university: record.intended_university.clone(),
            shift_preference: record.shift_preference.clone(),
            interest_technology: record.interest_technology.clone(),
            interest_challenges: record.interest_challenges.clone(),
            interest_math: record.interest_math.clone(),
            interest_portuguese: record.interest_portuguese.clone(),
            preferred_subject: record.preferred_subject.clone(),
            programming_contact: record.programming_contact.clone(),
            likes_games: record.likes_games.clone(),
            owns_console: record.owns_console.clone(),
            owns_computer: record.owns_computer.clone(),
            owns_internet: record.owns_internet.clone(),
            owns_phone: record.owns_phone.clone(),
            owns_mobile_internet: record.owns_mobile_internet.clone(),
            evaluation_explanations: record.evaluation_explanations.clone(),
            evaluation_applications: record.evaluation_applications.clone(),
            evaluation_technologies: record.evaluation_technologies.clone(),
            evaluation_comprehension: record.evaluation_comprehension.clone(),
            evaluation_overall: record.evaluation_overall.clone(),
        }
    }
}
