use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::NaiveDate;
use survey_analytics::normalize::normalize_row;
use survey_analytics::store::{CsvSurveyStore, SurveyStore};
use survey_analytics::types::{Cell, columns};

fn tmp_file(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("survey-analytics-{name}-{nanos}.csv"))
}

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

#[test]
fn read_fixture_yields_raw_text_rows() {
    let store = CsvSurveyStore::new("tests/fixtures/survey.csv");
    assert!(store.exists());

    let rows = store.read_rows().unwrap();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0][columns::ID], Cell::Text("1".to_string()));
    assert_eq!(rows[0][columns::NAME], Cell::Text("Ana Souza".to_string()));
    assert_eq!(rows[1][columns::NAME], Cell::Null);
    // The trailer row is all nulls.
    assert!(rows[3].iter().all(|c| *c == Cell::Null));
}

#[test]
fn fixture_rows_normalize_with_derived_ages() {
    let store = CsvSurveyStore::new("tests/fixtures/survey.csv");
    let rows = store.read_rows().unwrap();

    let records: Vec<_> = rows
        .iter()
        .filter_map(|row| normalize_row(row, as_of()))
        .collect();
    assert_eq!(records.len(), 3);

    // Row 1: text birth date parses, age derived.
    assert_eq!(records[0].id, 1);
    assert_eq!(
        records[0].birth_date,
        NaiveDate::from_ymd_opt(2006, 3, 15)
    );
    assert_eq!(records[0].age, Some(18));
    assert_eq!(records[0].shift_preference.as_deref(), Some("Manhã"));

    // Row 2: no name, no birth date.
    assert_eq!(records[1].name, None);
    assert_eq!(records[1].age, None);

    // Row 3: unparseable birth date keeps the record, without an age.
    assert_eq!(records[2].id, 3);
    assert_eq!(records[2].birth_date, None);
    assert_eq!(records[2].age, None);
    assert_eq!(records[2].gender.as_deref(), Some("Mulher"));
}

#[test]
fn append_creates_store_with_header_from_labels() {
    let path = tmp_file("append-create");
    let store = CsvSurveyStore::new(&path);
    assert!(!store.exists());

    let fields = vec![
        ("ID".to_string(), Cell::Int(1)),
        ("Nome".to_string(), Cell::Text("Ada".to_string())),
        ("Gênero".to_string(), Cell::Text("Mulher".to_string())),
    ];
    store.append_row(&fields).unwrap();
    assert!(store.exists());

    let raw = std::fs::read_to_string(&path).unwrap();
    let mut lines = raw.lines();
    assert_eq!(lines.next(), Some("ID,Nome,Gênero"));
    assert_eq!(lines.next(), Some("1,Ada,Mulher"));
    assert_eq!(lines.next(), None);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn append_to_existing_store_keeps_prior_rows() {
    let path = tmp_file("append-extend");
    let store = CsvSurveyStore::new(&path);

    for id in 1..=3 {
        let fields = vec![
            ("ID".to_string(), Cell::Int(id)),
            ("Nome".to_string(), Cell::Text(format!("p{id}"))),
        ];
        store.append_row(&fields).unwrap();
    }

    let rows = store.read_rows().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[2][0], Cell::Text("3".to_string()));
    assert_eq!(rows[2][1], Cell::Text("p3".to_string()));

    let _ = std::fs::remove_file(&path);
}

#[test]
fn read_missing_file_is_an_io_error() {
    let store = CsvSurveyStore::new("tests/fixtures/does_not_exist.csv");
    assert!(!store.exists());
    let err = store.read_rows().unwrap_err();
    assert!(err.to_string().contains("csv error"));
}
