//! Row normalization: one raw store row into one typed [`Record`].
//!
//! Normalization is a pure function of `(row, as_of)`. The id cell gates the
//! whole row: blank/trailer rows (no usable id) produce nothing. Every other
//! field degrades to `None` on its own, so a malformed birth date never drops
//! a response — it only leaves `age` absent.

use chrono::{Datelike, NaiveDate, NaiveDateTime};

use crate::types::{Cell, Record, columns};

/// Normalize one raw row into a [`Record`], or `None` for blank/trailer rows.
///
/// `as_of` is the date used for age derivation; callers that need
/// deterministic output (tests, replays) must fix it explicitly instead of
/// using the wall clock.
pub fn normalize_row(row: &[Cell], as_of: NaiveDate) -> Option<Record> {
    let id = id_cell(cell(row, columns::ID))?;
    let birth_date = date_cell(cell(row, columns::BIRTH_DATE));

    Some(Record {
        id,
        completed_at: stringified_cell(cell(row, columns::COMPLETED_AT)),
        name: text_cell(cell(row, columns::NAME)),
        birth_date,
        age: birth_date.map(|b| age_on(b, as_of)),
        gender: text_cell(cell(row, columns::GENDER)),
        school_year: text_cell(cell(row, columns::SCHOOL_YEAR)),
        intended_university: text_cell(cell(row, columns::INTENDED_UNIVERSITY)),
        shift_preference: text_cell(cell(row, columns::SHIFT_PREFERENCE)),
        interest_technology: text_cell(cell(row, columns::INTEREST_TECHNOLOGY)),
        interest_challenges: text_cell(cell(row, columns::INTEREST_CHALLENGES)),
        interest_math: text_cell(cell(row, columns::INTEREST_MATH)),
        interest_portuguese: text_cell(cell(row, columns::INTEREST_PORTUGUESE)),
        preferred_subject: text_cell(cell(row, columns::PREFERRED_SUBJECT)),
        programming_contact: text_cell(cell(row, columns::PROGRAMMING_CONTACT)),
        likes_games: text_cell(cell(row, columns::LIKES_GAMES)),
        owns_console: text_cell(cell(row, columns::OWNS_CONSOLE)),
        owns_computer: text_cell(cell(row, columns::OWNS_COMPUTER)),
        owns_internet: text_cell(cell(row, columns::OWNS_INTERNET)),
        owns_phone: text_cell(cell(row, columns::OWNS_PHONE)),
        owns_mobile_internet: text_cell(cell(row, columns::OWNS_MOBILE_INTERNET)),
        evaluation_explanations: text_cell(cell(row, columns::EVALUATION_EXPLANATIONS)),
        evaluation_applications: text_cell(cell(row, columns::EVALUATION_APPLICATIONS)),
        evaluation_technologies: text_cell(cell(row, columns::EVALUATION_TECHNOLOGIES)),
        evaluation_comprehension: text_cell(cell(row, columns::EVALUATION_COMPREHENSION)),
        evaluation_overall: text_cell(cell(row, columns::EVALUATION_OVERALL)),
    })
}

/// Exact calendar age at `as_of` for someone born on `birth`.
///
/// Year difference, decremented by one if the birthday has not yet been
/// reached in the `as_of` year.
pub fn age_on(birth: NaiveDate, as_of: NaiveDate) -> i32 {
    let not_yet = (as_of.month(), as_of.day()) < (birth.month(), birth.day());
    as_of.year() - birth.year() - i32::from(not_yet)
}

fn cell(row: &[Cell], idx: usize) -> &Cell {
    // Store backends trim trailing empties, so short rows are expected.
    row.get(idx).unwrap_or(&Cell::Null)
}

/// Extract the required id. Backends differ in how they type the cell:
/// workbooks yield numbers (sometimes as floats), CSV yields text.
fn id_cell(c: &Cell) -> Option<i64> {
    match c {
        Cell::Int(i) => Some(*i),
        Cell::Float(f) if f.fract() == 0.0 => Some(*f as i64),
        Cell::Text(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Categorical text, verbatim. Non-text cells are stringified; blank cells
/// are absent.
fn text_cell(c: &Cell) -> Option<String> {
    if c.is_blank() {
        return None;
    }
    Some(match c {
        Cell::Text(s) => s.clone(),
        Cell::Int(i) => i.to_string(),
        Cell::Float(f) => {
            if f.fract() == 0.0 {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        Cell::Bool(b) => b.to_string(),
        Cell::DateTime(dt) => dt.to_string(),
        Cell::Null => unreachable!("blank handled above"),
    })
}

/// Timestamp-as-text fields keep whatever the cell stringifies to.
fn stringified_cell(c: &Cell) -> Option<String> {
    text_cell(c)
}

/// Date fields accept native date-time cells or a few common text layouts.
/// Anything else is treated as absent (the row is kept).
fn date_cell(c: &Cell) -> Option<NaiveDate> {
    match c {
        Cell::DateTime(dt) => Some(dt.date()),
        Cell::Text(s) => parse_date_text(s.trim()),
        _ => None,
    }
}

fn parse_date_text(s: &str) -> Option<NaiveDate> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    NaiveDate::parse_from_str(s, "%d/%m/%Y").ok()
}
