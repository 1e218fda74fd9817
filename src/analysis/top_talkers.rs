//! Top-talker rankings.
//!
//! A generic key -> accumulated-sum counter with top-k extraction, used
//! for the two volume rankings: requests per user and bytes per user.

use std::collections::HashMap;

use crate::models::TrafficRecord;

/// Accumulate weighted contributions over the sequence and return the
/// top `k` keys by total, descending. Equal totals are ordered by
/// lexical key so rankings are reproducible across runs.
pub fn rank_by<F, I>(records: &[TrafficRecord], k: usize, extract: F) -> Vec<(String, u64)>
where
    F: Fn(&TrafficRecord) -> I,
    I: IntoIterator<Item = (String, u64)>,
{
    let mut totals: HashMap<String, u64> = HashMap::new();
    for record in records {
        for (key, weight) in extract(record) {
            *totals.entry(key).or_insert(0) += weight;
        }
    }

    let mut ranked: Vec<(String, u64)> = totals.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(k);
    ranked
}

/// Users who generated the most web requests: one count per record whose
/// destination port is 80 or 443 and whose source user is set.
pub fn top_requesters(records: &[TrafficRecord], k: usize) -> Vec<(String, u64)> {
    rank_by(records, k, |record| {
        if record.is_web_request() && !record.source_user.is_empty() {
            Some((record.source_user.clone(), 1))
        } else {
            None
        }
    })
}

/// Users who moved the most data: inbound bytes are attributed to the
/// sending user, outbound bytes to the receiving user, each side counted
/// whenever its user field is set.
pub fn top_byte_senders(records: &[TrafficRecord], k: usize) -> Vec<(String, u64)> {
    rank_by(records, k, |record| {
        let mut contributions = Vec::with_capacity(2);
        if !record.source_user.is_empty() {
            contributions.push((record.source_user.clone(), record.bytes_in));
        }
        if !record.dest_user.is_empty() {
            contributions.push((record.dest_user.clone(), record.bytes_out));
        }
        contributions
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn create_record(source_user: &str, dest_user: &str, dest_port: u16, bytes_in: u64, bytes_out: u64) -> TrafficRecord {
        TrafficRecord {
            timestamp: DateTime::parse_from_rfc3339("2023-05-01T10:00:00+00:00").unwrap(),
            source_user: source_user.to_string(),
            source_ip: "10.0.0.1".to_string(),
            source_port: 40000,
            dest_user: dest_user.to_string(),
            dest_ip: "192.168.1.1".to_string(),
            dest_port,
            bytes_in,
            bytes_out,
        }
    }

    #[test]
    fn test_top_requesters_counts_web_ports_only() {
        let records = vec![
            create_record("alice", "web", 443, 0, 0),
            create_record("alice", "web", 80, 0, 0),
            create_record("alice", "web", 22, 0, 0),
            create_record("bob", "web", 443, 0, 0),
        ];
        let ranked = top_requesters(&records, 5);
        assert_eq!(ranked, vec![("alice".to_string(), 2), ("bob".to_string(), 1)]);
    }

    #[test]
    fn test_top_requesters_skips_anonymous() {
        let records = vec![
            create_record("", "web", 443, 0, 0),
            create_record("", "web", 443, 0, 0),
            create_record("alice", "web", 443, 0, 0),
        ];
        let ranked = top_requesters(&records, 5);
        assert_eq!(ranked, vec![("alice".to_string(), 1)]);
    }

    #[test]
    fn test_top_k_truncation() {
        let mut records = Vec::new();
        for (user, requests) in [("u1", 7), ("u2", 6), ("u3", 5), ("u4", 4), ("u5", 3), ("u6", 2)] {
            for _ in 0..requests {
                records.push(create_record(user, "web", 443, 0, 0));
            }
        }
        let ranked = top_requesters(&records, 5);
        assert_eq!(ranked.len(), 5);
        assert_eq!(ranked[0], ("u1".to_string(), 7));
        assert!(ranked.iter().all(|(user, _)| user != "u6"));
    }

    #[test]
    fn test_ties_break_lexically() {
        let records = vec![
            create_record("zed", "web", 443, 0, 0),
            create_record("ann", "web", 443, 0, 0),
            create_record("mid", "web", 443, 0, 0),
        ];
        let ranked = top_requesters(&records, 5);
        assert_eq!(
            ranked,
            vec![
                ("ann".to_string(), 1),
                ("mid".to_string(), 1),
                ("zed".to_string(), 1)
            ]
        );
    }

    #[test]
    fn test_byte_volume_attributes_both_sides() {
        let records = vec![
            create_record("alice", "bob", 443, 100, 40),
            create_record("alice", "", 22, 50, 999),
            create_record("", "bob", 22, 999, 10),
        ];
        let ranked = top_byte_senders(&records, 5);
        // alice: 100 + 50 inbound; bob: 40 + 10 outbound.
        assert_eq!(ranked, vec![("alice".to_string(), 150), ("bob".to_string(), 50)]);
    }

    #[test]
    fn test_empty_sequence_yields_empty_ranking() {
        assert!(top_requesters(&[], 5).is_empty());
        assert!(top_byte_senders(&[], 5).is_empty());
    }

    #[test]
    fn test_ranking_strictly_ordered() {
        let records = vec![
            create_record("a", "b", 443, 10, 5),
            create_record("a", "b", 443, 10, 5),
            create_record("c", "d", 443, 30, 1),
        ];
        let ranked = top_byte_senders(&records, 5);
        for pair in ranked.windows(2) {
            assert!(
                pair[0].1 > pair[1].1 || (pair[0].1 == pair[1].1 && pair[0].0 < pair[1].0)
            );
        }
    }
}
