//! Error taxonomy for the analyzer.
//!
//! There are two fatal classes and nothing recoverable in between:
//! ingestion failures reject a journal before any analysis starts, and
//! sink failures abort a report mid-write. One file's failure never
//! affects sibling files analyzed concurrently.

use thiserror::Error;

/// A journal file could not be turned into a record sequence.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("failed to read journal: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed journal: {0}")]
    Csv(#[from] csv::Error),

    #[error("row {row}: expected 9 fields, found {found}")]
    FieldCount { row: usize, found: usize },

    #[error("row {row}: bad timestamp '{value}': {source}")]
    Timestamp {
        row: usize,
        value: String,
        source: chrono::ParseError,
    },

    #[error("row {row}: bad integer '{value}': {source}")]
    Integer {
        row: usize,
        value: String,
        source: std::num::ParseIntError,
    },

    #[error("journal has no data rows")]
    Empty,
}

/// The report destination failed mid-write. The run is aborted and the
/// partial report is discarded rather than emitted incomplete.
#[derive(Error, Debug)]
#[error("report write failed: {0}")]
pub struct SinkError(#[from] pub std::io::Error);

/// Per-file failure surfaced to the batch driver.
#[derive(Error, Debug)]
pub enum AnalyzeError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Sink(#[from] SinkError),
}
