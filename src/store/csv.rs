//! CSV store backend.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use crate::error::StoreResult;
use crate::store::SurveyStore;
use crate::types::Cell;

/// Survey store backed by a CSV file.
///
/// Cells are kept as verbatim text (`Cell::Text`); empty fields become
/// `Cell::Null`. Value typing is the normalizer's job, not the store's.
#[derive(Debug, Clone)]
pub struct CsvSurveyStore {
    path: PathBuf,
}

impl CsvSurveyStore {
    /// Create a store handle for `path`. The file itself is not touched.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the underlying file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SurveyStore for CsvSurveyStore {
    fn exists(&self) -> bool {
        self.path.exists()
    }

    fn read_rows(&self) -> StoreResult<Vec<Vec<Cell>>> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)?;

        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result?;
            let row = record
                .iter()
                .map(|raw| {
                    if raw.is_empty() {
                        Cell::Null
                    } else {
                        Cell::Text(raw.to_string())
                    }
                })
                .collect();
            rows.push(row);
        }
        Ok(rows)
    }

    fn append_row(&self, fields: &[(String, Cell)]) -> StoreResult<()> {
        let fresh = !self.path.exists();

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if fresh {
            wtr.write_record(fields.iter().map(|(label, _)| label.as_str()))?;
        }
        wtr.write_record(fields.iter().map(|(_, value)| cell_to_field(value)))?;
        wtr.flush()?;
        Ok(())
    }
}

fn cell_to_field(c: &Cell) -> String {
    match c {
        Cell::Null => String::new(),
        Cell::Text(s) => s.clone(),
        Cell::Int(i) => i.to_string(),
        Cell::Float(f) => f.to_string(),
        Cell::Bool(b) => b.to_string(),
        Cell::DateTime(dt) => dt.to_string(),
    }
}
