//! Batch pipeline: partition raw records into validated and quarantined
//! sets, then persist both as deterministic CSV artifacts.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{EtlError, Result};
use crate::record::{BatchResult, QuarantinedRecord, RawBatch, Record, RunSummary};
use crate::schema::SchemaDef;
use crate::validator::{self, Outcome};

/// Extra quarantine columns, appended after the record's own fields.
pub const ERROR_COLUMN: &str = "_error";
pub const ROW_INDEX_COLUMN: &str = "_row_index";

/// Run one batch end to end: validate every record, write the validated
/// dataset and (when any record failed) the quarantine dataset, and return
/// the run summary.
///
/// Per-row validation failures are the expected case and never abort the
/// run. Run-level problems (unwritable output location, serialization
/// failure) abort before any artifact is visible at the output paths: both
/// artifacts are fully rendered in memory, written to sibling `.tmp` files,
/// and renamed into place. Re-running with the same batch and schema
/// produces byte-identical files.
pub fn run_batch(
    batch: &RawBatch,
    schema: &SchemaDef,
    output_path: &Path,
    quarantine_path: &Path,
) -> Result<RunSummary> {
    let result = partition(batch, schema);
    info!(
        schema = %schema.name,
        total = result.total(),
        valid = result.valid.len(),
        invalid = result.quarantined.len(),
        "batch validated"
    );

    // Render everything before touching the filesystem
    let validated_csv = render_validated(&result.valid, schema)?;
    let quarantine_csv = if result.quarantined.is_empty() {
        None
    } else {
        Some(render_quarantine(&result.quarantined, &batch.columns)?)
    };

    write_atomic(output_path, &validated_csv)?;

    let quarantine_written = match quarantine_csv {
        Some(bytes) => {
            write_atomic(quarantine_path, &bytes)?;
            Some(quarantine_path.to_path_buf())
        }
        None => {
            // Absence of the quarantine file means "no invalid rows", so a
            // leftover from a previous run must not survive this one.
            remove_stale(quarantine_path)?;
            None
        }
    };

    Ok(RunSummary {
        total: result.total(),
        valid_count: result.valid.len(),
        invalid_count: result.quarantined.len(),
        output_path: output_path.to_path_buf(),
        quarantine_path: quarantine_written,
    })
}

/// Apply the validator to every record in input order. Every input record
/// lands in exactly one of the two output sequences.
pub fn partition(batch: &RawBatch, schema: &SchemaDef) -> BatchResult {
    let mut result = BatchResult::default();

    for (index, record) in batch.records.iter().enumerate() {
        match validator::validate_record(record, schema) {
            Outcome::Valid(normalized) => result.valid.push(normalized),
            Outcome::Invalid { reason } => {
                debug!(row = index, reason = %reason, "record quarantined");
                result.quarantined.push(QuarantinedRecord {
                    record: record.clone(),
                    error: reason,
                    row_index: index,
                });
            }
        }
    }

    result
}

/// Validated dataset: columns are the schema's declared field list in schema
/// order; the header row is written even for an empty batch.
fn render_validated(valid: &[Record], schema: &SchemaDef) -> Result<Vec<u8>> {
    let columns = schema.field_names();
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&columns)?;

    for record in valid {
        let row: Vec<&str> = columns
            .iter()
            .map(|col| record.get(*col).map(String::as_str).unwrap_or(""))
            .collect();
        writer.write_record(&row)?;
    }

    finish(writer)
}

/// Quarantine dataset: columns are the union of raw fields across the
/// quarantined rows (batch column order first, stragglers sorted), with
/// `_error` and `_row_index` appended at the end.
fn render_quarantine(quarantined: &[QuarantinedRecord], batch_columns: &[String]) -> Result<Vec<u8>> {
    let mut columns: Vec<String> = batch_columns
        .iter()
        .filter(|col| quarantined.iter().any(|q| q.record.contains_key(*col)))
        .cloned()
        .collect();
    let mut extras: Vec<String> = quarantined
        .iter()
        .flat_map(|q| q.record.keys())
        .filter(|key| !columns.contains(key))
        .cloned()
        .collect();
    extras.sort();
    extras.dedup();
    columns.extend(extras);

    let mut writer = csv::Writer::from_writer(Vec::new());
    let mut header: Vec<&str> = columns.iter().map(String::as_str).collect();
    header.push(ERROR_COLUMN);
    header.push(ROW_INDEX_COLUMN);
    writer.write_record(&header)?;

    for entry in quarantined {
        let index = entry.row_index.to_string();
        let mut row: Vec<&str> = columns
            .iter()
            .map(|col| entry.record.get(col).map(String::as_str).unwrap_or(""))
            .collect();
        row.push(&entry.error);
        row.push(&index);
        writer.write_record(&row)?;
    }

    finish(writer)
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>> {
    writer
        .into_inner()
        .map_err(|e| EtlError::Io(e.into_error()))
}

/// Write to a sibling temp file, then rename into place. A run killed
/// mid-write leaves no partial artifact at the output path.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir).map_err(|e| EtlError::OutputWrite {
                path: path.to_path_buf(),
                source: e,
            })?;
        }
    }

    let tmp = PathBuf::from(format!("{}.tmp", path.display()));
    fs::write(&tmp, bytes)
        .and_then(|_| fs::rename(&tmp, path))
        .map_err(|e| EtlError::OutputWrite {
            path: path.to_path_buf(),
            source: e,
        })
}

fn remove_stale(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(EtlError::OutputWrite {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}
