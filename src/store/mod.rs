//! Spreadsheet-backed survey stores.
//!
//! A store holds the survey responses as an ordered sequence of raw rows
//! behind a header row. Two backends exist:
//!
//! - [`csv`]: plain CSV files (always available)
//! - [`excel`]: workbooks via `calamine` (feature `excel`; appending
//!   additionally needs `excel-writer`)
//!
//! Most callers should use [`open_store`], which auto-detects the backend
//! from the file extension (or takes an explicit [`StoreFormat`] override via
//! [`StoreOptions`]). The store path is always injected by the caller; there
//! is no process-wide data file.

pub mod csv;
#[cfg(feature = "excel")]
pub mod excel;

pub use self::csv::CsvSurveyStore;
#[cfg(feature = "excel")]
pub use self::excel::ExcelSurveyStore;

use std::path::Path;

use crate::error::{StoreError, StoreResult};
use crate::types::Cell;

/// Read/append access to one survey store file.
///
/// `read_rows` yields data rows only (the header row is excluded by
/// convention, so the first data row is index 0). `append_row` appends one
/// submission and creates the store with a header row derived from the field
/// labels when the file does not exist yet.
pub trait SurveyStore: std::fmt::Debug {
    /// Whether the underlying file currently exists.
    fn exists(&self) -> bool;

    /// Read all data rows in store order.
    fn read_rows(&self) -> StoreResult<Vec<Vec<Cell>>>;

    /// Append one row of `(label, value)` pairs in column order.
    fn append_row(&self, fields: &[(String, Cell)]) -> StoreResult<()>;
}

/// Supported store backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreFormat {
    /// Comma-separated values.
    Csv,
    /// Spreadsheet/workbook formats (feature-gated behind `excel`).
    Excel,
}

impl StoreFormat {
    /// Parse a store format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" | "xls" | "xlsm" | "xlsb" | "ods" => Some(Self::Excel),
            _ => None,
        }
    }
}

/// Options controlling how a store file is opened.
///
/// Use [`Default`] for common cases.
#[derive(Debug, Clone, Default)]
pub struct StoreOptions {
    /// If `None`, auto-detect the backend from the file extension.
    pub format: Option<StoreFormat>,
    /// Workbook sheet to use; `None` means the first sheet.
    pub sheet: Option<String>,
}

/// Open a survey store at `path`.
///
/// The backend is chosen by `options.format`, falling back to extension
/// inference. Opening never touches the file; a missing file only surfaces
/// later through [`SurveyStore::exists`] / [`SurveyStore::read_rows`].
pub fn open_store(
    path: impl AsRef<Path>,
    options: &StoreOptions,
) -> StoreResult<Box<dyn SurveyStore>> {
    let path = path.as_ref();
    let format = match options.format {
        Some(f) => f,
        None => infer_format_from_path(path)?,
    };

    match format {
        StoreFormat::Csv => Ok(Box::new(CsvSurveyStore::new(path))),
        StoreFormat::Excel => open_excel_store(path, options.sheet.as_deref()),
    }
}

fn infer_format_from_path(path: &Path) -> StoreResult<StoreFormat> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or_else(|| StoreError::Layout {
            message: format!(
                "cannot infer store format: path has no extension ({})",
                path.display()
            ),
        })?;

    StoreFormat::from_extension(ext).ok_or_else(|| StoreError::Layout {
        message: format!(
            "cannot infer store format from extension '{ext}' for path ({})",
            path.display()
        ),
    })
}

fn open_excel_store(path: &Path, sheet: Option<&str>) -> StoreResult<Box<dyn SurveyStore>> {
    // Avoid unused warnings when the feature is off.
    let _ = (path, sheet);

    #[cfg(feature = "excel")]
    {
        Ok(Box::new(ExcelSurveyStore::new(path, sheet)))
    }

    #[cfg(not(feature = "excel"))]
    {
        Err(StoreError::Layout {
            message: "workbook stores not enabled (enable cargo feature 'excel')".to_string(),
        })
    }
}
