use thiserror::Error;

/// Convenience result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Error type returned by the store layer and surfaced by the engine.
///
/// This is a single error enum shared across the CSV and (optional) workbook
/// backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "excel")]
    /// Workbook read error (feature-gated behind `excel`).
    #[error("workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    #[cfg(feature = "excel-writer")]
    /// Workbook write error (feature-gated behind `excel-writer`).
    #[error("workbook write error: {0}")]
    WorkbookWrite(#[from] rust_xlsxwriter::XlsxError),

    /// CSV read/write error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// The store file does not have the expected structure (no sheets, no
    /// header row, unsupported extension, ...).
    #[error("store layout: {message}")]
    Layout { message: String },
}
