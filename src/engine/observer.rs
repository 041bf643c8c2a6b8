use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::StoreError;

/// Severity classification used for observer callbacks and alerting
/// thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum QuerySeverity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal).
    Warning,
    /// Error-level event (query failed).
    Error,
    /// Critical error (typically the store file is missing or unreadable).
    Critical,
}

/// Which engine operation produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    /// A filtered listing query.
    List,
    /// A statistics query.
    Statistics,
}

/// Context about one engine query.
#[derive(Debug, Clone)]
pub struct QueryContext {
    /// Operation that ran.
    pub kind: QueryKind,
    /// Label of the store the engine is bound to (usually its path).
    pub store: String,
}

/// Minimal stats reported on successful queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryStats {
    /// Size of the normalized population.
    pub population: usize,
    /// Size of the working set after filtering.
    pub working_set: usize,
}

/// Observer interface for query outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait QueryObserver: Send + Sync {
    /// Called when a query succeeds (including empty-result outcomes).
    fn on_success(&self, _ctx: &QueryContext, _stats: QueryStats) {}

    /// Called when a query fails.
    fn on_failure(&self, _ctx: &QueryContext, _severity: QuerySeverity, _error: &StoreError) {}

    /// Called when a query failure meets an alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &QueryContext, severity: QuerySeverity, error: &StoreError) {
        self.on_failure(ctx, severity, error)
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn QueryObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn QueryObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl QueryObserver for CompositeObserver {
    fn on_success(&self, ctx: &QueryContext, stats: QueryStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_failure(&self, ctx: &QueryContext, severity: QuerySeverity, error: &StoreError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &QueryContext, severity: QuerySeverity, error: &StoreError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Logs query events to stderr.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl QueryObserver for StdErrObserver {
    fn on_success(&self, ctx: &QueryContext, stats: QueryStats) {
        eprintln!(
            "[query][ok] kind={:?} store={} population={} working_set={}",
            ctx.kind, ctx.store, stats.population, stats.working_set
        );
    }

    fn on_failure(&self, ctx: &QueryContext, severity: QuerySeverity, error: &StoreError) {
        eprintln!(
            "[query][{:?}] kind={:?} store={} err={}",
            severity, ctx.kind, ctx.store, error
        );
    }

    fn on_alert(&self, ctx: &QueryContext, severity: QuerySeverity, error: &StoreError) {
        eprintln!(
            "[ALERT][query][{:?}] kind={:?} store={} err={}",
            severity, ctx.kind, ctx.store, error
        );
    }
}

/// Appends query events to a local log file.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are
    /// ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl QueryObserver for FileObserver {
    fn on_success(&self, ctx: &QueryContext, stats: QueryStats) {
        self.append_line(&format!(
            "{} ok kind={:?} store={} population={} working_set={}",
            unix_ts(),
            ctx.kind,
            ctx.store,
            stats.population,
            stats.working_set
        ));
    }

    fn on_failure(&self, ctx: &QueryContext, severity: QuerySeverity, error: &StoreError) {
        self.append_line(&format!(
            "{} fail severity={:?} kind={:?} store={} err={}",
            unix_ts(),
            severity,
            ctx.kind,
            ctx.store,
            error
        ));
    }

    fn on_alert(&self, ctx: &QueryContext, severity: QuerySeverity, error: &StoreError) {
        self.append_line(&format!(
            "{} ALERT severity={:?} kind={:?} store={} err={}",
            unix_ts(),
            severity,
            ctx.kind,
            ctx.store,
            error
        ));
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Cumulative engine counters.
///
/// The engine updates these as queries run; callers can snapshot them at any
/// time.
#[derive(Debug, Default)]
pub struct EngineMetrics {
    queries_run: AtomicU64,
    rows_read: AtomicU64,
    records_normalized: AtomicU64,
    rows_skipped: AtomicU64,
}

impl EngineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn on_query(&self) {
        let _ = self.queries_run.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn on_load(&self, rows_read: usize, normalized: usize, skipped: usize) {
        let _ = self.rows_read.fetch_add(rows_read as u64, Ordering::SeqCst);
        let _ = self
            .records_normalized
            .fetch_add(normalized as u64, Ordering::SeqCst);
        let _ = self.rows_skipped.fetch_add(skipped as u64, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> EngineMetricsSnapshot {
        EngineMetricsSnapshot {
            queries_run: self.queries_run.load(Ordering::SeqCst),
            rows_read: self.rows_read.load(Ordering::SeqCst),
            records_normalized: self.records_normalized.load(Ordering::SeqCst),
            rows_skipped: self.rows_skipped.load(Ordering::SeqCst),
        }
    }
}

/// Immutable snapshot of [`EngineMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineMetricsSnapshot {
    pub queries_run: u64,
    pub rows_read: u64,
    pub records_normalized: u64,
    pub rows_skipped: u64,
}

impl fmt::Display for EngineMetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "queries_run={}, rows_read={}, records_normalized={}, rows_skipped={}",
            self.queries_run, self.rows_read, self.records_normalized, self.rows_skipped
        )
    }
}
