use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::NaiveDate;
use survey_analytics::StoreError;
use survey_analytics::analytics::FilterCriteria;
use survey_analytics::engine::{
    AnalyticsEngine, QueryContext, QueryObserver, QuerySeverity, QueryStats,
};
use survey_analytics::store::{CsvSurveyStore, StoreOptions, SurveyStore};
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

#[derive(Default)]
struct RecordingObserver {
    successes: Mutex<Vec<QueryStats>>,
    failures: Mutex<Vec<QuerySeverity>>,
    alerts: Mutex<Vec<QuerySeverity>>,
}

impl QueryObserver for RecordingObserver {
    fn on_success(&self, _ctx: &QueryContext, stats: QueryStats) {
        self.successes.lock().unwrap().push(stats);
    }

    fn on_failure(&self, _ctx: &QueryContext, severity: QuerySeverity, _error: &StoreError) {
        self.failures.lock().unwrap().push(severity);
    }

    fn on_alert(&self, _ctx: &QueryContext, severity: QuerySeverity, _error: &StoreError) {
        self.alerts.lock().unwrap().push(severity);
    }
}

fn seeded_store(name: &str) -> PathBuf {
    let path = tmp_file(name);
    let store = CsvSurveyStore::new(&path);
    let mut fields: Vec<(String, Cell)> = (0..columns::WIDTH)
        .map(|i| (format!("col{i}"), Cell::Null))
        .collect();
    fields[columns::ID] = ("ID".to_string(), Cell::Int(1));
    fields[columns::GENDER] = ("Gênero".to_string(), Cell::Text("Homem".to_string()));
    store.append_row(&fields).unwrap();
    path
}

#[test]
fn observer_sees_success_with_population_and_working_set_sizes() {
    let path = seeded_store("observer-ok");
    let obs = Arc::new(RecordingObserver::default());
    let engine = AnalyticsEngine::open(&path, &StoreOptions::default())
        .unwrap()
        .with_observer(obs.clone());

    let criteria = FilterCriteria {
        gender: Some("Mulher".to_string()),
        ..Default::default()
    };
    let _ = engine.list_records_as_of(&criteria, as_of()).unwrap();

    let successes = obs.successes.lock().unwrap().clone();
    assert_eq!(successes.len(), 1);
    assert_eq!(successes[0].population, 1);
    assert_eq!(successes[0].working_set, 0);
    assert!(obs.failures.lock().unwrap().is_empty());

    let _ = std::fs::remove_file(&path);
}

#[test]
fn missing_store_reports_critical_failure_and_alert() {
    let obs = Arc::new(RecordingObserver::default());
    let engine = AnalyticsEngine::open(tmp_file("observer-missing"), &StoreOptions::default())
        .unwrap()
        .with_observer(obs.clone());

    // Non-fatal for the caller, but the observer hears a critical failure.
    let views = engine
        .list_records_as_of(&FilterCriteria::default(), as_of())
        .unwrap();
    assert!(views.is_empty());

    let failures = obs.failures.lock().unwrap().clone();
    let alerts = obs.alerts.lock().unwrap().clone();
    assert_eq!(failures, vec![QuerySeverity::Critical]);
    assert_eq!(alerts, vec![QuerySeverity::Critical]);
}

#[test]
fn alert_threshold_filters_non_critical_failures() {
    // The file exists but its content is not valid CSV text, which is a
    // parse-level failure rather than a critical I/O one.
    let path = tmp_file("observer-threshold");
    std::fs::write(&path, [b'i', b'd', b'\n', 0xff, 0xfe, b'\n']).unwrap();

    let obs = Arc::new(RecordingObserver::default());
    let engine = AnalyticsEngine::open(&path, &StoreOptions::default())
        .unwrap()
        .with_observer(obs.clone())
        .with_alert_threshold(QuerySeverity::Critical);

    let err = engine
        .list_records_as_of(&FilterCriteria::default(), as_of())
        .unwrap_err();
    assert!(err.to_string().contains("csv error"));

    let failures = obs.failures.lock().unwrap().clone();
    assert_eq!(failures, vec![QuerySeverity::Error]);
    assert!(obs.alerts.lock().unwrap().is_empty());

    let _ = std::fs::remove_file(&path);
}
