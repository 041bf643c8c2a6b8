#![cfg(feature = "excel")]

//! Workbook store backend (`.xlsx`, `.xls`, `.ods`, ...).
//!
//! Reading goes through `calamine` and preserves native cell types, so date
//! cells reach the normalizer as [`Cell::DateTime`]. Appending (feature
//! `excel-writer`) rewrites the whole workbook plus the new row — the xlsx
//! format has no in-place append.

use std::path::{Path, PathBuf};

use calamine::{Data, DataType as _, Reader, open_workbook_auto};

use crate::error::{StoreError, StoreResult};
use crate::store::SurveyStore;
use crate::types::Cell;

/// Sheet name used when creating a new workbook.
const DEFAULT_SHEET: &str = "Avaliações";

/// Survey store backed by a spreadsheet workbook.
#[derive(Debug, Clone)]
pub struct ExcelSurveyStore {
    path: PathBuf,
    sheet: Option<String>,
}

impl ExcelSurveyStore {
    /// Create a store handle for `path`; `sheet` of `None` means the first
    /// sheet in the workbook. The file itself is not touched.
    pub fn new(path: impl AsRef<Path>, sheet: Option<&str>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            sheet: sheet.map(|s| s.to_string()),
        }
    }

    /// Path of the underlying file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All rows of the active sheet, header included.
    fn read_raw(&self) -> StoreResult<Vec<Vec<Cell>>> {
        let mut workbook = open_workbook_auto(&self.path)?;

        let sheet = match &self.sheet {
            Some(name) => name.clone(),
            None => workbook
                .sheet_names()
                .first()
                .cloned()
                .ok_or_else(|| StoreError::Layout {
                    message: format!("workbook has no sheets ({})", self.path.display()),
                })?,
        };

        let range = workbook.worksheet_range(&sheet)?;
        Ok(range
            .rows()
            .map(|row| row.iter().map(convert_cell).collect())
            .collect())
    }
}

impl SurveyStore for ExcelSurveyStore {
    fn exists(&self) -> bool {
        self.path.exists()
    }

    fn read_rows(&self) -> StoreResult<Vec<Vec<Cell>>> {
        let mut rows = self.read_raw()?;
        if !rows.is_empty() {
            rows.remove(0);
        }
        Ok(rows)
    }

    #[cfg(feature = "excel-writer")]
    fn append_row(&self, fields: &[(String, Cell)]) -> StoreResult<()> {
        let mut rows = if self.path.exists() {
            self.read_raw()?
        } else {
            vec![
                fields
                    .iter()
                    .map(|(label, _)| Cell::Text(label.clone()))
                    .collect(),
            ]
        };
        rows.push(fields.iter().map(|(_, value)| value.clone()).collect());
        self.write_workbook(&rows)
    }

    #[cfg(not(feature = "excel-writer"))]
    fn append_row(&self, _fields: &[(String, Cell)]) -> StoreResult<()> {
        Err(StoreError::Layout {
            message: "workbook append not enabled (enable cargo feature 'excel-writer')"
                .to_string(),
        })
    }
}

#[cfg(feature = "excel-writer")]
impl ExcelSurveyStore {
    fn write_workbook(&self, rows: &[Vec<Cell>]) -> StoreResult<()> {
        use rust_xlsxwriter::{Format, Workbook};

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(self.sheet.as_deref().unwrap_or(DEFAULT_SHEET))?;

        // Without a number format calamine would read dates back as floats.
        let date_format = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");

        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                let (r, c) = (r as u32, c as u16);
                match cell {
                    Cell::Null => {}
                    Cell::Text(s) => {
                        worksheet.write_string(r, c, s)?;
                    }
                    Cell::Int(i) => {
                        worksheet.write_number(r, c, *i as f64)?;
                    }
                    Cell::Float(f) => {
                        worksheet.write_number(r, c, *f)?;
                    }
                    Cell::Bool(b) => {
                        worksheet.write_boolean(r, c, *b)?;
                    }
                    Cell::DateTime(dt) => {
                        worksheet.write_datetime_with_format(r, c, dt, &date_format)?;
                    }
                }
            }
        }

        workbook.save(&self.path)?;
        Ok(())
    }
}

fn convert_cell(c: &Data) -> Cell {
    match c {
        Data::Empty => Cell::Null,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Int(i) => Cell::Int(*i),
        Data::Float(f) => Cell::Float(*f),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(_) | Data::DateTimeIso(_) => match c.as_datetime() {
            Some(dt) => Cell::DateTime(dt),
            None => Cell::Text(c.to_string()),
        },
        Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(_) => Cell::Null,
    }
}
