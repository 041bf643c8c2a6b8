//! Demographic profile cells for interest-band comparison.
//!
//! Profiles are always computed over the full population, independent of any
//! request-level filter: they exist to compare demographic groups across the
//! whole dataset regardless of what a caller is currently filtering on.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::types::Record;

/// Raw interest levels that make up the technology band.
pub const TECH_BAND: &[&str] = &["Muito interesse"];

/// Raw interest levels that make up the humanities band.
pub const HUMANITIES_BAND: &[&str] = &["Pouco interesse", "Algum interesse"];

/// Gender values and their cell-key slugs.
const GENDERS: &[(&str, &str)] = &[
    ("Homem", "homens"),
    ("Mulher", "mulheres"),
    ("Não binário", "nao_binario"),
];

/// School-year tokens, matched by substring containment against the raw
/// `school_year` value ("2º ano" contains "2").
const YEAR_TOKENS: &[&str] = &["2", "3"];

/// Summary of one gender × school-year cell within an interest band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileCell {
    /// Number of records in the cell.
    pub count: usize,
    /// Most frequent shift preference in the cell; `"N/A"` when the cell has
    /// no non-empty values.
    pub top_shift_preference: String,
    /// Most frequent preferred subject, same rule.
    pub top_preferred_subject: String,
}

/// Compute the six gender × school-year cells for one interest band.
///
/// Cell membership requires all three of: gender equal to one of the known
/// values, school year containing the year token, and the technology-interest
/// field being one of the band's levels. Every key is present in the result;
/// a cell with zero records maps to `None` rather than a zeroed summary.
pub fn profile_cells(
    population: &[Record],
    band: &[&str],
) -> BTreeMap<String, Option<ProfileCell>> {
    let mut cells = BTreeMap::new();

    for (gender, slug) in GENDERS {
        for token in YEAR_TOKENS {
            let members: Vec<&Record> = population
                .iter()
                .filter(|r| {
                    r.gender.as_deref() == Some(*gender)
                        && r.school_year.as_deref().is_some_and(|y| y.contains(token))
                        && r.interest_technology
                            .as_deref()
                            .is_some_and(|i| band.contains(&i))
                })
                .collect();

            let cell = if members.is_empty() {
                None
            } else {
                Some(ProfileCell {
                    count: members.len(),
                    top_shift_preference: top_value(&members, |r| r.shift_preference.as_deref()),
                    top_preferred_subject: top_value(&members, |r| r.preferred_subject.as_deref()),
                })
            };
            cells.insert(format!("{slug}_{token}ano"), cell);
        }
    }

    cells
}

/// Most frequent non-empty value of the selected field among `members`.
///
/// Ties break toward the value first seen while scanning in population order,
/// which keeps the result deterministic for equal counts.
fn top_value<'a, F>(members: &[&'a Record], select: F) -> String
where
    F: Fn(&'a Record) -> Option<&'a str>,
{
    // Insertion-ordered counting; a HashMap would lose the first-seen order
    // the tie-break depends on.
    let mut seen: Vec<(&str, usize)> = Vec::new();
    for &member in members {
        let Some(value) = select(member) else {
            continue;
        };
        if value.is_empty() {
            continue;
        }
        match seen.iter_mut().find(|(v, _)| *v == value) {
            Some((_, n)) => *n += 1,
            None => seen.push((value, 1)),
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for &(value, n) in &seen {
        if best.is_none_or(|(_, best_n)| n > best_n) {
            best = Some((value, n));
        }
    }
    best.map_or_else(|| "N/A".to_string(), |(v, _)| v.to_string())
}
