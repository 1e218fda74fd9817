//! Periodic request detection.
//!
//! Groups web records by an identity key (source user or source IP),
//! clusters each group by destination signature and tracks how often and
//! over how long each signature recurs. A signature seen more than
//! [`MIN_REPEAT`] times across a span longer than [`MIN_SPAN_SECS`]
//! within one group is reported as periodic.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};

use crate::models::TrafficRecord;

/// A bucket is reported only when its count exceeds this.
pub const MIN_REPEAT: u64 = 5;

/// ... and its first-to-last span exceeds this many seconds.
pub const MIN_SPAN_SECS: i64 = 3600;

/// Per (group, destination-signature) aggregate. Counts only increase;
/// the span only widens.
#[derive(Debug)]
struct PatternBucket {
    /// Index of the first record that opened this bucket.
    exemplar: usize,
    count: u64,
    first: DateTime<FixedOffset>,
    last: DateTime<FixedOffset>,
}

impl PatternBucket {
    fn span_seconds(&self) -> i64 {
        self.last.timestamp() - self.first.timestamp()
    }

    fn is_periodic(&self) -> bool {
        self.count > MIN_REPEAT && self.span_seconds() > MIN_SPAN_SECS
    }
}

/// One reported periodic pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodicFinding {
    /// The grouping key value (a user name or an IP).
    pub group: String,
    pub count: u64,
    /// Whole minutes between the first and last occurrence.
    pub span_minutes: i64,
    pub dest_ip: String,
    pub dest_port: u16,
}

/// Periodic patterns grouped by source user. Records without a source
/// user are ignored.
pub fn find_periodic_by_user(records: &[TrafficRecord]) -> Vec<PeriodicFinding> {
    find_periodic(records, |record| &record.source_user)
}

/// Periodic patterns grouped by source IP.
pub fn find_periodic_by_ip(records: &[TrafficRecord]) -> Vec<PeriodicFinding> {
    find_periodic(records, |record| &record.source_ip)
}

/// Single left-to-right pass: each eligible record either lands in the
/// first bucket of its group with a matching destination signature
/// (first-match-wins linear scan, distinct signatures per group are
/// expected to be few) or opens a new one. Findings come out sorted by
/// group key, buckets in creation order, so reports are reproducible.
pub fn find_periodic<'a, F>(records: &'a [TrafficRecord], group_key: F) -> Vec<PeriodicFinding>
where
    F: Fn(&'a TrafficRecord) -> &'a str,
{
    let mut groups: HashMap<&str, Vec<PatternBucket>> = HashMap::new();

    for (idx, record) in records.iter().enumerate() {
        let key = group_key(record);
        if key.is_empty() || !record.is_web_request() {
            continue;
        }

        let buckets = groups.entry(key).or_default();
        let signature = record.destination_signature();
        match buckets
            .iter_mut()
            .find(|bucket| records[bucket.exemplar].destination_signature() == signature)
        {
            Some(bucket) => {
                bucket.count += 1;
                if record.timestamp < bucket.first {
                    bucket.first = record.timestamp;
                }
                if record.timestamp > bucket.last {
                    bucket.last = record.timestamp;
                }
            }
            None => buckets.push(PatternBucket {
                exemplar: idx,
                count: 1,
                first: record.timestamp,
                last: record.timestamp,
            }),
        }
    }

    let mut keys: Vec<&str> = groups.keys().copied().collect();
    keys.sort_unstable();

    let mut findings = Vec::new();
    for key in keys {
        for bucket in &groups[key] {
            if bucket.is_periodic() {
                let exemplar = &records[bucket.exemplar];
                findings.push(PeriodicFinding {
                    group: key.to_string(),
                    count: bucket.count,
                    span_minutes: bucket.span_seconds() / 60,
                    dest_ip: exemplar.dest_ip.clone(),
                    dest_port: exemplar.dest_port,
                });
            }
        }
    }
    findings
}
