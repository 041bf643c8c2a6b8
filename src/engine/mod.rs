//! Query engine: composes the store, the normalizer and the analytics.
//!
//! The engine is deliberately request-scoped: every query re-reads the store
//! and re-normalizes the whole population, so results always reflect the
//! latest persisted rows. It holds no cache and no mutable state between
//! queries, and never writes to the store.

mod observer;

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use serde::Serialize;

use crate::analytics::{
    DescriptiveStats, FilterCriteria, HUMANITIES_BAND, ProfileCell, TECH_BAND, describe,
    frequency, profile_cells,
};
use crate::error::{StoreError, StoreResult};
use crate::normalize::normalize_row;
use crate::store::{StoreOptions, SurveyStore, open_store};
use crate::types::{Record, RecordView};

pub use observer::{
    CompositeObserver, EngineMetrics, EngineMetricsSnapshot, FileObserver, QueryContext,
    QueryKind, QueryObserver, QuerySeverity, QueryStats, StdErrObserver,
};

/// Value → occurrence count for one categorical field.
pub type Frequency = HashMap<String, usize>;

/// Per-band profile cells, keyed by `homens_2ano`-style cell names.
pub type BandProfiles = BTreeMap<String, Option<ProfileCell>>;

/// Outcome of a statistics query.
///
/// Empty outcomes are modeled explicitly rather than as zeroed reports: a
/// filter that matches nothing and a store file that does not exist are
/// ordinary answers, not errors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum StatisticsOutcome {
    /// The full report over a non-empty working set.
    Report(Box<StatisticsReport>),
    /// No record passed the active filter.
    NoMatches,
    /// The store file does not exist.
    StoreMissing,
}

/// Aggregate statistics over one query's working set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticsReport {
    /// Size of the working set.
    pub total_participants: usize,
    /// Echo of the criteria the working set was filtered by.
    pub applied_filters: FilterCriteria,
    pub demographics: Demographics,
    pub evaluations: Evaluations,
    pub interest_areas: InterestAreas,
    pub tech_profile: TechProfile,
    /// Band profiles, always computed over the unfiltered population.
    pub profiles: Profiles,
}

/// Demographic distributions of the working set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Demographics {
    pub gender: Frequency,
    pub school_year: Frequency,
    pub intended_university: Frequency,
    /// Ages of working-set records that have one, in working-set order.
    pub ages: Vec<i32>,
    /// Summary over `ages`, rounded to one decimal place.
    pub age_summary: DescriptiveStats,
}

/// Workshop evaluation answer distributions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluations {
    pub clear_explanations: Frequency,
    pub interest_in_applications: Frequency,
    pub technology_use: Frequency,
    pub course_comprehension: Frequency,
    pub overall_experience: Frequency,
}

/// Subject-interest distributions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterestAreas {
    pub technology: Frequency,
    pub challenges: Frequency,
    pub math: Frequency,
    pub portuguese: Frequency,
    pub preferred_subject: Frequency,
}

/// Technology habits and device ownership distributions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TechProfile {
    pub shift_preference: Frequency,
    pub programming_contact: Frequency,
    pub likes_games: Frequency,
    pub devices: DeviceOwnership,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceOwnership {
    pub console: Frequency,
    pub computer: Frequency,
    pub internet: Frequency,
    pub phone: Frequency,
    pub mobile_internet: Frequency,
}

/// Interest-band profile cells over the full population.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profiles {
    pub tech: BandProfiles,
    pub humanities: BandProfiles,
}

/// The survey analytics engine.
///
/// Owns a [`SurveyStore`] handle and answers listing and statistics queries
/// against it. Construction is cheap; all work happens per query.
pub struct AnalyticsEngine {
    store: Box<dyn SurveyStore>,
    store_label: String,
    observer: Option<Arc<dyn QueryObserver>>,
    alert_at_or_above: QuerySeverity,
    metrics: Arc<EngineMetrics>,
}

impl AnalyticsEngine {
    /// Open the store at `path` and bind an engine to it.
    pub fn open(path: impl AsRef<Path>, options: &StoreOptions) -> StoreResult<Self> {
        let label = path.as_ref().display().to_string();
        let store = open_store(path, options)?;
        Ok(Self::bind(store, label))
    }

    /// Bind an engine to an already-constructed store.
    pub fn from_store(store: Box<dyn SurveyStore>) -> Self {
        Self::bind(store, "<store>".to_string())
    }

    fn bind(store: Box<dyn SurveyStore>, store_label: String) -> Self {
        Self {
            store,
            store_label,
            observer: None,
            alert_at_or_above: QuerySeverity::Critical,
            metrics: Arc::new(EngineMetrics::new()),
        }
    }

    /// Attach an observer for query events (logging/alerts).
    pub fn with_observer(mut self, observer: Arc<dyn QueryObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Severity threshold at which `on_alert` is invoked.
    pub fn with_alert_threshold(mut self, severity: QuerySeverity) -> Self {
        self.alert_at_or_above = severity;
        self
    }

    /// Get a handle to the engine's cumulative counters.
    pub fn metrics(&self) -> Arc<EngineMetrics> {
        Arc::clone(&self.metrics)
    }

    /// List records passing `criteria`, in store order, as presentation
    /// views. Ages are derived against today's date; a missing store file
    /// yields an empty listing.
    pub fn list_records(&self, criteria: &FilterCriteria) -> StoreResult<Vec<RecordView>> {
        self.list_records_as_of(criteria, today())
    }

    /// [`Self::list_records`] with an explicit age-derivation date.
    pub fn list_records_as_of(
        &self,
        criteria: &FilterCriteria,
        as_of: NaiveDate,
    ) -> StoreResult<Vec<RecordView>> {
        let ctx = self.context(QueryKind::List);
        self.metrics.on_query();

        if !self.store.exists() {
            self.report_missing_store(&ctx);
            return Ok(Vec::new());
        }

        let population = self.load_population(&ctx, as_of)?;
        let views: Vec<RecordView> = population
            .iter()
            .filter(|r| criteria.matches(r))
            .map(RecordView::from_record)
            .collect();

        self.report_success(
            &ctx,
            QueryStats {
                population: population.len(),
                working_set: views.len(),
            },
        );
        Ok(views)
    }

    /// Compute aggregate statistics over the working set selected by
    /// `criteria`. Profiles are computed over the unfiltered population.
    pub fn compute_statistics(&self, criteria: &FilterCriteria) -> StoreResult<StatisticsOutcome> {
        self.compute_statistics_as_of(criteria, today())
    }

    /// [`Self::compute_statistics`] with an explicit age-derivation date.
    pub fn compute_statistics_as_of(
        &self,
        criteria: &FilterCriteria,
        as_of: NaiveDate,
    ) -> StoreResult<StatisticsOutcome> {
        let ctx = self.context(QueryKind::Statistics);
        self.metrics.on_query();

        if !self.store.exists() {
            self.report_missing_store(&ctx);
            return Ok(StatisticsOutcome::StoreMissing);
        }

        let population = self.load_population(&ctx, as_of)?;
        let working_set: Vec<&Record> =
            population.iter().filter(|r| criteria.matches(r)).collect();

        let stats = QueryStats {
            population: population.len(),
            working_set: working_set.len(),
        };
        if working_set.is_empty() {
            self.report_success(&ctx, stats);
            return Ok(StatisticsOutcome::NoMatches);
        }

        let report = build_report(criteria.clone(), &population, &working_set);
        self.report_success(&ctx, stats);
        Ok(StatisticsOutcome::Report(Box::new(report)))
    }

    fn load_population(&self, ctx: &QueryContext, as_of: NaiveDate) -> StoreResult<Vec<Record>> {
        let rows = match self.store.read_rows() {
            Ok(rows) => rows,
            Err(error) => {
                self.report_failure(ctx, &error);
                return Err(error);
            }
        };

        let mut population = Vec::with_capacity(rows.len());
        let mut skipped = 0usize;
        for row in &rows {
            match normalize_row(row, as_of) {
                Some(record) => population.push(record),
                None => skipped += 1,
            }
        }
        self.metrics.on_load(rows.len(), population.len(), skipped);
        Ok(population)
    }

    fn context(&self, kind: QueryKind) -> QueryContext {
        QueryContext {
            kind,
            store: self.store_label.clone(),
        }
    }

    fn report_success(&self, ctx: &QueryContext, stats: QueryStats) {
        if let Some(obs) = self.observer.as_ref() {
            obs.on_success(ctx, stats);
        }
    }

    fn report_failure(&self, ctx: &QueryContext, error: &StoreError) {
        if let Some(obs) = self.observer.as_ref() {
            let severity = severity_for_error(error);
            obs.on_failure(ctx, severity, error);
            if severity >= self.alert_at_or_above {
                obs.on_alert(ctx, severity, error);
            }
        }
    }

    fn report_missing_store(&self, ctx: &QueryContext) {
        // Non-fatal for the caller, but observers should still hear about it.
        let error = StoreError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("store file not found: {}", self.store_label),
        ));
        self.report_failure(ctx, &error);
    }
}

fn build_report(
    applied_filters: FilterCriteria,
    population: &[Record],
    working_set: &[&Record],
) -> StatisticsReport {
    let records: Vec<Record> = working_set.iter().map(|&r| r.clone()).collect();
    let ages: Vec<i32> = records.iter().filter_map(|r| r.age).collect();
    let age_summary = describe(&ages).rounded_to_tenths();

    StatisticsReport {
        total_participants: records.len(),
        applied_filters,
        demographics: Demographics {
            gender: frequency(&records, |r| r.gender.as_deref()),
            school_year: frequency(&records, |r| r.school_year.as_deref()),
            intended_university: frequency(&records, |r| r.intended_university.as_deref()),
            ages,
            age_summary,
        },
        evaluations: Evaluations {
            clear_explanations: frequency(&records, |r| r.evaluation_explanations.as_deref()),
            interest_in_applications: frequency(&records, |r| {
                r.evaluation_applications.as_deref()
            }),
            technology_use: frequency(&records, |r| r.evaluation_technologies.as_deref()),
            course_comprehension: frequency(&records, |r| r.evaluation_comprehension.as_deref()),
            overall_experience: frequency(&records, |r| r.evaluation_overall.as_deref()),
        },
        interest_areas: InterestAreas {
            technology: frequency(&records, |r| r.interest_technology.as_deref()),
            challenges: frequency(&records, |r| r.interest_challenges.as_deref()),
            math: frequency(&records, |r| r.interest_math.as_deref()),
            portuguese: frequency(&records, |r| r.interest_portuguese.as_deref()),
            preferred_subject: frequency(&records, |r| r.preferred_subject.as_deref()),
        },
        tech_profile: TechProfile {
            shift_preference: frequency(&records, |r| r.shift_preference.as_deref()),
            programming_contact: frequency(&records, |r| r.programming_contact.as_deref()),
            likes_games: frequency(&records, |r| r.likes_games.as_deref()),
            devices: DeviceOwnership {
                console: frequency(&records, |r| r.owns_console.as_deref()),
                computer: frequency(&records, |r| r.owns_computer.as_deref()),
                internet: frequency(&records, |r| r.owns_internet.as_deref()),
                phone: frequency(&records, |r| r.owns_phone.as_deref()),
                mobile_internet: frequency(&records, |r| r.owns_mobile_internet.as_deref()),
            },
        },
        profiles: Profiles {
            tech: profile_cells(population, TECH_BAND),
            humanities: profile_cells(population, HUMANITIES_BAND),
        },
    }
}

fn severity_for_error(e: &StoreError) -> QuerySeverity {
    match e {
        StoreError::Io(_) => QuerySeverity::Critical,
        StoreError::Csv(err) => match err.kind() {
            ::csv::ErrorKind::Io(_) => QuerySeverity::Critical,
            _ => QuerySeverity::Error,
        },
        #[cfg(feature = "excel")]
        StoreError::Workbook(_) => QuerySeverity::Error,
        #[cfg(feature = "excel-writer")]
        StoreError::WorkbookWrite(_) => QuerySeverity::Error,
        StoreError::Layout { .. } => QuerySeverity::Error,
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::{AnalyticsEngine, StatisticsOutcome};
    use crate::analytics::FilterCriteria;
    use crate::error::StoreResult;
    use crate::store::SurveyStore;
    use crate::types::{Cell, columns};
    use chrono::NaiveDate;

    /// In-memory store for engine tests.
    #[derive(Debug)]
    struct MemoryStore {
        rows: Vec<Vec<Cell>>,
    }

    impl SurveyStore for MemoryStore {
        fn exists(&self) -> bool {
            true
        }

        fn read_rows(&self) -> StoreResult<Vec<Vec<Cell>>> {
            Ok(self.rows.clone())
        }

        fn append_row(&self, _fields: &[(String, Cell)]) -> StoreResult<()> {
            unimplemented!("analytics tests never append")
        }
    }

    #[derive(Debug)]
    struct MissingStore;

    impl SurveyStore for MissingStore {
        fn exists(&self) -> bool {
            false
        }

        fn read_rows(&self) -> StoreResult<Vec<Vec<Cell>>> {
            unreachable!("engine checks exists() first")
        }

        fn append_row(&self, _fields: &[(String, Cell)]) -> StoreResult<()> {
            unreachable!("engine checks exists() first")
        }
    }

    fn row(id: Option<i64>, gender: &str, year: &str, birth: Option<(i32, u32, u32)>) -> Vec<Cell> {
        let mut row = vec![Cell::Null; columns::WIDTH];
        if let Some(id) = id {
            row[columns::ID] = Cell::Int(id);
        }
        row[columns::GENDER] = Cell::Text(gender.to_string());
        row[columns::SCHOOL_YEAR] = Cell::Text(year.to_string());
        if let Some((y, m, d)) = birth {
            let date = NaiveDate::from_ymd_opt(y, m, d).unwrap();
            row[columns::BIRTH_DATE] = Cell::DateTime(date.and_hms_opt(0, 0, 0).unwrap());
        }
        row
    }

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn listing_preserves_store_order_and_skips_trailer_rows() {
        let engine = AnalyticsEngine::from_store(Box::new(MemoryStore {
            rows: vec![
                row(Some(1), "Homem", "2º ano", Some((2006, 3, 15))),
                row(Some(2), "Mulher", "3º ano", None),
                row(None, "", "", None),
            ],
        }));

        let views = engine
            .list_records_as_of(&FilterCriteria::default(), as_of())
            .unwrap();
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].id, 1);
        assert_eq!(views[0].age, Some(18));
        assert_eq!(views[1].id, 2);
        assert_eq!(views[1].age, None);
    }

    #[test]
    fn listing_applies_criteria() {
        let engine = AnalyticsEngine::from_store(Box::new(MemoryStore {
            rows: vec![
                row(Some(1), "Homem", "2º ano", Some((2006, 3, 15))),
                row(Some(2), "Mulher", "3º ano", Some((2007, 1, 1))),
            ],
        }));

        let criteria = FilterCriteria {
            gender: Some("Mulher".to_string()),
            ..Default::default()
        };
        let views = engine.list_records_as_of(&criteria, as_of()).unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].id, 2);
    }

    #[test]
    fn missing_store_lists_empty_and_reports_statistics_as_missing() {
        let engine = AnalyticsEngine::from_store(Box::new(MissingStore));

        let views = engine
            .list_records_as_of(&FilterCriteria::default(), as_of())
            .unwrap();
        assert!(views.is_empty());

        let outcome = engine
            .compute_statistics_as_of(&FilterCriteria::default(), as_of())
            .unwrap();
        assert_eq!(outcome, StatisticsOutcome::StoreMissing);
    }

    #[test]
    fn unmatched_filter_yields_no_matches_outcome() {
        let engine = AnalyticsEngine::from_store(Box::new(MemoryStore {
            rows: vec![row(Some(1), "Homem", "2º ano", None)],
        }));

        let criteria = FilterCriteria {
            gender: Some("Mulher".to_string()),
            ..Default::default()
        };
        let outcome = engine.compute_statistics_as_of(&criteria, as_of()).unwrap();
        assert_eq!(outcome, StatisticsOutcome::NoMatches);
    }

    #[test]
    fn statistics_count_ages_only_where_present() {
        let engine = AnalyticsEngine::from_store(Box::new(MemoryStore {
            rows: vec![
                row(Some(1), "Homem", "2º ano", Some((2006, 3, 15))),
                row(Some(2), "Mulher", "3º ano", None),
                row(Some(3), "Mulher", "3º ano", Some((2006, 3, 15))),
            ],
        }));

        let outcome = engine
            .compute_statistics_as_of(&FilterCriteria::default(), as_of())
            .unwrap();
        let StatisticsOutcome::Report(report) = outcome else {
            panic!("expected a report");
        };
        assert_eq!(report.total_participants, 3);
        assert_eq!(report.demographics.ages, vec![18, 18]);
        assert_eq!(report.demographics.age_summary.count, 2);
        assert_eq!(report.demographics.age_summary.mean, 18.0);
        assert_eq!(report.demographics.age_summary.std_dev, 0.0);
    }

    #[test]
    fn profiles_are_computed_over_the_unfiltered_population() {
        let mut tech_row = row(Some(1), "Homem", "2º ano", None);
        tech_row[columns::INTEREST_TECHNOLOGY] = Cell::Text("Muito interesse".to_string());
        let mut other = row(Some(2), "Mulher", "3º ano", None);
        other[columns::INTEREST_TECHNOLOGY] = Cell::Text("Muito interesse".to_string());

        let engine = AnalyticsEngine::from_store(Box::new(MemoryStore {
            rows: vec![tech_row, other],
        }));

        // Filter excludes the men; their profile cell must still be there.
        let criteria = FilterCriteria {
            gender: Some("Mulher".to_string()),
            ..Default::default()
        };
        let outcome = engine.compute_statistics_as_of(&criteria, as_of()).unwrap();
        let StatisticsOutcome::Report(report) = outcome else {
            panic!("expected a report");
        };
        assert_eq!(report.total_participants, 1);
        let cell = report.profiles.tech["homens_2ano"].as_ref().unwrap();
        assert_eq!(cell.count, 1);
    }

    #[test]
    fn metrics_accumulate_across_queries() {
        let engine = AnalyticsEngine::from_store(Box::new(MemoryStore {
            rows: vec![
                row(Some(1), "Homem", "2º ano", None),
                row(None, "", "", None),
            ],
        }));
        let metrics = engine.metrics();

        let _ = engine.list_records_as_of(&FilterCriteria::default(), as_of());
        let _ = engine.list_records_as_of(&FilterCriteria::default(), as_of());

        let snap = metrics.snapshot();
        assert_eq!(snap.queries_run, 2);
        assert_eq!(snap.rows_read, 4);
        assert_eq!(snap.records_normalized, 2);
        assert_eq!(snap.rows_skipped, 2);
    }
}
