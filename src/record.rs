use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// Raw row data as delivered by a source: field name -> raw value.
/// Values are weakly typed on input; absent keys and empty strings both
/// count as "missing" for required-field checks.
pub type Record = HashMap<String, String>;

/// One batch of raw records plus the column order the source delivered them
/// with. Sources guarantee a stable field vocabulary and a defined row order.
#[derive(Debug, Clone, Default)]
pub struct RawBatch {
    pub columns: Vec<String>,
    pub records: Vec<Record>,
}

/// A record that failed validation, tagged with the failure reason and its
/// zero-based position in the input batch.
#[derive(Debug, Clone)]
pub struct QuarantinedRecord {
    /// The original raw record, untouched by normalization
    pub record: Record,
    pub error: String,
    pub row_index: usize,
}

/// Result of partitioning one batch. Both sequences preserve input order.
///
/// Invariant: `valid.len() + quarantined.len()` equals the input batch size.
#[derive(Debug, Default)]
pub struct BatchResult {
    pub valid: Vec<Record>,
    pub quarantined: Vec<QuarantinedRecord>,
}

impl BatchResult {
    pub fn total(&self) -> usize {
        self.valid.len() + self.quarantined.len()
    }
}

/// Summary of a completed pipeline run, exposed to the caller for reporting.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub valid_count: usize,
    pub invalid_count: usize,
    pub output_path: PathBuf,
    /// None when no rows were quarantined (the quarantine file is omitted)
    pub quarantine_path: Option<PathBuf>,
}
