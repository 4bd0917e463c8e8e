use std::path::PathBuf;
use tracing::debug;

use crate::error::{EtlError, Result};
use crate::record::{RawBatch, Record};
use crate::sources::RecordSource;

/// Reads one CSV file into a raw batch. The first row must be a header row;
/// a file without one cannot be mapped to records and fails the whole run.
pub struct CsvFileSource {
    id: String,
    path: PathBuf,
}

impl CsvFileSource {
    pub fn new(id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
        }
    }
}

impl RecordSource for CsvFileSource {
    fn source_id(&self) -> &str {
        &self.id
    }

    fn fetch_batch(&self) -> Result<RawBatch> {
        let mut reader = csv::Reader::from_path(&self.path).map_err(|e| {
            EtlError::MalformedInput {
                path: self.path.clone(),
                message: e.to_string(),
            }
        })?;

        let headers = reader.headers()?.clone();
        if headers.iter().all(|h| h.trim().is_empty()) {
            return Err(EtlError::MalformedInput {
                path: self.path.clone(),
                message: "no header row".to_string(),
            });
        }
        let columns: Vec<String> = headers.iter().map(str::to_string).collect();

        let mut records = Vec::new();
        for result in reader.records() {
            let row = result.map_err(|e| EtlError::MalformedInput {
                path: self.path.clone(),
                message: e.to_string(),
            })?;
            let record: Record = columns
                .iter()
                .enumerate()
                .map(|(i, col)| (col.clone(), row.get(i).unwrap_or("").to_string()))
                .collect();
            records.push(record);
        }

        debug!(source = %self.id, rows = records.len(), "batch loaded");
        Ok(RawBatch { columns, records })
    }
}
