//! N-gram mining over the record stream.
//!
//! Treats the journal as a symbol stream: every record is reduced to a
//! fingerprint, every run of [`WINDOW_LEN`] consecutive records becomes
//! a window key, and the most frequent keys are reported.
//!
//! Window equality is approximate on purpose: two windows count together
//! when the rolling combination of their member fingerprints matches,
//! which is how "structurally similar" traffic is found. The combiner is
//! order-sensitive and 64 bits wide, so accidental collisions are rare
//! but possible.
//!
//! Mining runs in two concurrent phases. Phase 1 fingerprints every
//! record in bounded batches of spawned tasks; each batch fully drains
//! before the next starts, and the assembled fingerprint array is only
//! shared once complete, which is the barrier phase 2 relies on. Phase 2
//! builds window keys the same way and funnels every candidate through a
//! bounded channel into a single aggregator task. That task is the only
//! owner of the frequency table, so the table needs no locking: closing
//! the channel tells it to drain, snapshot and return.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;

use super::fingerprint::fingerprint;
use crate::config::EngineConfig;
use crate::models::RecordSequence;

/// Every n-gram covers exactly this many consecutive records.
pub const WINDOW_LEN: usize = 5;

/// Aggregate for one window key. The count only increases; the exemplar
/// is whichever window for this key reached the aggregator first, which
/// is implementation-defined under concurrent arrival.
#[derive(Debug, Clone)]
pub struct NGramEntry {
    pub key: u64,
    pub count: u64,
    /// Start index of the exemplar window in the record sequence.
    pub exemplar: usize,
}

struct Candidate {
    key: u64,
    start: usize,
}

/// Concurrent n-gram miner. Holds only tuning knobs; all per-run state
/// lives on the stack of [`NGramMiner::mine`].
pub struct NGramMiner {
    batch_size: usize,
    channel_capacity: usize,
}

impl NGramMiner {
    pub fn new() -> Self {
        Self::from_config(&EngineConfig::default())
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        NGramMiner {
            batch_size: config.ngram_batch_size.max(1),
            channel_capacity: config.channel_capacity.max(1),
        }
    }

    /// Batch size is a tuning knob, not a contract: mined counts are
    /// identical for any concurrency degree.
    pub fn with_batch_size(batch_size: usize) -> Self {
        NGramMiner {
            batch_size: batch_size.max(1),
            ..Self::new()
        }
    }

    /// Mine the sequence and return the top `k` window keys by count,
    /// descending, ties broken by key value so the ranking is stable.
    /// A sequence shorter than [`WINDOW_LEN`] yields no windows.
    pub async fn mine(&self, records: Arc<RecordSequence>, k: usize) -> Vec<NGramEntry> {
        if records.len() < WINDOW_LEN {
            return Vec::new();
        }

        let fingerprints = Arc::new(self.fingerprint_all(&records).await);

        let (tx, rx) = mpsc::channel::<Candidate>(self.channel_capacity);
        let aggregator = tokio::spawn(aggregate(rx));

        let window_count = records.len() - WINDOW_LEN + 1;
        let mut next = 0;
        while next < window_count {
            let end = (next + self.batch_size).min(window_count);
            let mut batch = JoinSet::new();
            for start in next..end {
                let fingerprints = Arc::clone(&fingerprints);
                let tx = tx.clone();
                batch.spawn(async move {
                    let key = combine(&fingerprints[start..start + WINDOW_LEN]);
                    // The receiver outlives every sender clone, so this
                    // only fails if the aggregator panicked.
                    let _ = tx.send(Candidate { key, start }).await;
                });
            }
            while let Some(joined) = batch.join_next().await {
                joined.expect("window task panicked");
            }
            next = end;
        }

        // Dropping the last sender closes the channel: the finalize
        // signal. The aggregator drains what is queued and snapshots.
        drop(tx);
        let mut entries = aggregator.await.expect("aggregator task panicked");

        entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
        entries.truncate(k);
        entries
    }

    /// Phase 1: fingerprint every record, at most `batch_size` tasks in
    /// flight. Each task owns a disjoint index, so results can be placed
    /// without synchronization as the batch drains.
    async fn fingerprint_all(&self, records: &Arc<RecordSequence>) -> Vec<u64> {
        let mut fingerprints = vec![0u64; records.len()];
        let mut next = 0;
        while next < records.len() {
            let end = (next + self.batch_size).min(records.len());
            let mut batch = JoinSet::new();
            for idx in next..end {
                let records = Arc::clone(records);
                batch.spawn(async move { (idx, fingerprint(&records[idx])) });
            }
            while let Some(joined) = batch.join_next().await {
                let (idx, value) = joined.expect("fingerprint task panicked");
                fingerprints[idx] = value;
            }
            next = end;
        }
        fingerprints
    }
}

impl Default for NGramMiner {
    fn default() -> Self {
        Self::new()
    }
}

/// The single writer: all frequency-table mutation happens here, one
/// candidate at a time, which stands in for locking entirely.
async fn aggregate(mut rx: mpsc::Receiver<Candidate>) -> Vec<NGramEntry> {
    let mut table: HashMap<u64, NGramEntry> = HashMap::new();
    while let Some(candidate) = rx.recv().await {
        table
            .entry(candidate.key)
            .and_modify(|entry| entry.count += 1)
            .or_insert(NGramEntry {
                key: candidate.key,
                count: 1,
                exemplar: candidate.start,
            });
    }
    table.into_values().collect()
}

/// Polynomial rolling combination of the window's fingerprints. Order-
/// sensitive: the same five records in a different order produce a
/// different key.
fn combine(window: &[u64]) -> u64 {
    window
        .iter()
        .fold(0u64, |acc, &fp| acc.wrapping_mul(0x0000_0100_0000_01b3).wrapping_add(fp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TrafficRecord;
    use chrono::DateTime;

    fn create_record(secs: i64, source_user: &str, source_port: u16) -> TrafficRecord {
        TrafficRecord {
            timestamp: DateTime::from_timestamp(secs, 0).unwrap().fixed_offset(),
            source_user: source_user.to_string(),
            source_ip: "10.0.0.1".to_string(),
            source_port,
            dest_user: "web".to_string(),
            dest_ip: "192.168.1.1".to_string(),
            dest_port: 443,
            bytes_in: 0,
            bytes_out: 0,
        }
    }

    fn identical_records(n: usize) -> Arc<RecordSequence> {
        Arc::new((0..n).map(|i| create_record(i as i64, "alice", 40000)).collect())
    }

    fn varied_records(n: usize) -> Arc<RecordSequence> {
        Arc::new(
            (0..n)
                .map(|i| create_record(i as i64, &format!("user{}", i % 7), 40000 + (i % 11) as u16))
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_six_identical_records_two_windows_one_key() {
        let records = identical_records(6);
        let entries = NGramMiner::new().mine(records, 5).await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].count, 2);
        assert!(entries[0].exemplar <= 1);
    }

    #[tokio::test]
    async fn test_counts_sum_to_window_count() {
        let records = varied_records(100);
        let entries = NGramMiner::with_batch_size(8).mine(records, usize::MAX).await;
        let total: u64 = entries.iter().map(|e| e.count).sum();
        assert_eq!(total, 100 - 4);
    }

    #[tokio::test]
    async fn test_short_sequence_yields_nothing() {
        for n in 0..WINDOW_LEN {
            let entries = NGramMiner::new().mine(identical_records(n), 5).await;
            assert!(entries.is_empty(), "{} records should yield no windows", n);
        }
    }

    #[tokio::test]
    async fn test_exactly_one_window() {
        let entries = NGramMiner::new().mine(varied_records(5), 5).await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].count, 1);
        assert_eq!(entries[0].exemplar, 0);
    }

    #[tokio::test]
    async fn test_batch_size_does_not_change_counts() {
        let records = varied_records(120);
        let mut baseline: Vec<(u64, u64)> = NGramMiner::with_batch_size(1)
            .mine(Arc::clone(&records), usize::MAX)
            .await
            .into_iter()
            .map(|e| (e.key, e.count))
            .collect();
        baseline.sort_unstable();

        for batch_size in [2, 7, 500] {
            let mut mined: Vec<(u64, u64)> = NGramMiner::with_batch_size(batch_size)
                .mine(Arc::clone(&records), usize::MAX)
                .await
                .into_iter()
                .map(|e| (e.key, e.count))
                .collect();
            mined.sort_unstable();
            assert_eq!(baseline, mined, "batch size {} diverged", batch_size);
        }
    }

    #[tokio::test]
    async fn test_ranking_descending_with_key_tiebreak() {
        let entries = NGramMiner::new().mine(varied_records(200), usize::MAX).await;
        for pair in entries.windows(2) {
            assert!(
                pair[0].count > pair[1].count
                    || (pair[0].count == pair[1].count && pair[0].key < pair[1].key)
            );
        }
    }

    #[test]
    fn test_combine_is_order_sensitive() {
        let forward = combine(&[1, 2, 3, 4, 5]);
        let reversed = combine(&[5, 4, 3, 2, 1]);
        assert_ne!(forward, reversed);
    }

    #[test]
    fn test_combine_is_deterministic() {
        let window = [7, 11, 13, 17, 19];
        assert_eq!(combine(&window), combine(&window));
    }
}
