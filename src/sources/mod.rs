use crate::error::Result;
use crate::record::RawBatch;

pub mod csv_file;

pub use csv_file::CsvFileSource;

/// Core trait that all record sources implement. The pipeline only sees the
/// resolved batch; where the rows came from (file, spreadsheet export,
/// pasted table) is the source's concern.
pub trait RecordSource {
    /// Unique identifier for this source, used in logs and output file names
    fn source_id(&self) -> &str;

    /// Fetch the full batch of records, preserving the source's row order
    /// and column order
    fn fetch_batch(&self) -> Result<RawBatch>;
}
