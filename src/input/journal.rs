//! Traffic journal ingestion.
//!
//! A journal is a comma-delimited file with one header row and one data
//! row per traffic record, 9 fields each:
//!
//! ```text
//! timestamp,src_user,src_ip,src_port,dst_user,dst_ip,dst_port,bytes_in,bytes_out
//! ```
//!
//! Ingestion validates the whole file up front and either produces the
//! complete ordered record sequence or rejects the file with a
//! descriptive [`IngestError`]. No analysis starts on a partially valid
//! journal.

use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset};

use crate::error::IngestError;
use crate::models::{RecordSequence, TrafficRecord};

/// Timestamp layout used by journal files, e.g.
/// `2023-05-01T10:00:00.000+0300`.
pub const TIMESTAMP_LAYOUT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

const FIELDS_PER_RECORD: usize = 9;

/// Read and validate a journal file, producing the record sequence.
pub fn read_journal(path: &Path) -> Result<RecordSequence, IngestError> {
    let file = std::fs::File::open(path)?;
    parse_journal(file)
}

/// Parse a journal from any reader. The first row is treated as a header
/// and discarded; a reader yielding no data rows is an error.
pub fn parse_journal<R: Read>(reader: R) -> Result<RecordSequence, IngestError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut records = RecordSequence::new();
    // Row numbers are 1-based and include the header row.
    for (idx, row) in csv_reader.records().enumerate() {
        let row = row?;
        records.push(parse_record(idx + 2, &row)?);
    }

    if records.is_empty() {
        return Err(IngestError::Empty);
    }

    Ok(records)
}

fn parse_record(row: usize, fields: &csv::StringRecord) -> Result<TrafficRecord, IngestError> {
    if fields.len() != FIELDS_PER_RECORD {
        return Err(IngestError::FieldCount {
            row,
            found: fields.len(),
        });
    }

    let timestamp = parse_timestamp(row, &fields[0])?;

    Ok(TrafficRecord {
        timestamp,
        source_user: fields[1].to_string(),
        source_ip: fields[2].to_string(),
        source_port: parse_int(row, &fields[3])?,
        dest_user: fields[4].to_string(),
        dest_ip: fields[5].to_string(),
        dest_port: parse_int(row, &fields[6])?,
        bytes_in: parse_int(row, &fields[7])?,
        bytes_out: parse_int(row, &fields[8])?,
    })
}

fn parse_timestamp(row: usize, raw: &str) -> Result<DateTime<FixedOffset>, IngestError> {
    DateTime::parse_from_str(raw, TIMESTAMP_LAYOUT).map_err(|source| IngestError::Timestamp {
        row,
        value: raw.to_string(),
        source,
    })
}

fn parse_int<T>(row: usize, raw: &str) -> Result<T, IngestError>
where
    T: FromStr<Err = std::num::ParseIntError>,
{
    raw.trim().parse().map_err(|source| IngestError::Integer {
        row,
        value: raw.to_string(),
        source,
    })
}
