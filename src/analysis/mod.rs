//! The analytical engine: four read-only passes over one record
//! sequence, findings written in a fixed section order through an
//! injected [`ReportSink`].

pub mod fingerprint;
pub mod ngram;
pub mod periodic;
pub mod top_talkers;

pub use fingerprint::fingerprint as record_fingerprint;
pub use ngram::{NGramEntry, NGramMiner, WINDOW_LEN};
pub use periodic::{find_periodic, find_periodic_by_ip, find_periodic_by_user, PeriodicFinding};
pub use top_talkers::{rank_by, top_byte_senders, top_requesters};

use std::path::Path;
use std::sync::Arc;

use crate::config::EngineConfig;
use crate::error::{AnalyzeError, SinkError};
use crate::models::RecordSequence;
use crate::output::ReportSink;

/// Runs the full battery against one record sequence, writing each
/// pass's findings under its fixed header. The first sink failure aborts
/// the remaining passes; no partial report is considered valid.
pub struct AnalysisDriver {
    config: EngineConfig,
}

impl AnalysisDriver {
    pub fn new(config: EngineConfig) -> Self {
        AnalysisDriver { config }
    }

    pub async fn run(
        &self,
        records: Arc<RecordSequence>,
        sink: &mut (dyn ReportSink + Send),
    ) -> Result<(), SinkError> {
        let k = self.config.top_k;

        sink.write_line("# Top users by number of requests (ports 80/443)")?;
        for (rank, (user, count)) in top_requesters(&records, k).iter().enumerate() {
            sink.write_line(&format!("{}: {}: {}", rank + 1, user, count))?;
        }

        sink.write_line("# Top users by bytes transferred")?;
        for (rank, (user, bytes)) in top_byte_senders(&records, k).iter().enumerate() {
            sink.write_line(&format!("{}: {}: {}", rank + 1, user, bytes))?;
        }

        sink.write_line("# Periodic requests grouped by source user")?;
        for finding in find_periodic_by_user(&records) {
            sink.write_line(&format!(
                "User {} made {} requests over {} minutes to {} {}",
                finding.group, finding.count, finding.span_minutes, finding.dest_ip, finding.dest_port
            ))?;
        }

        sink.write_line("# Periodic requests grouped by source IP")?;
        for finding in find_periodic_by_ip(&records) {
            sink.write_line(&format!(
                "IP {} made {} requests over {} minutes to {} {}",
                finding.group, finding.count, finding.span_minutes, finding.dest_ip, finding.dest_port
            ))?;
        }

        sink.write_line("# Top n-grams of the event stream")?;
        let miner = NGramMiner::from_config(&self.config);
        for (rank, entry) in miner
            .mine(Arc::clone(&records), k)
            .await
            .iter()
            .enumerate()
        {
            sink.write_line(&format!("{}: {} occurrences", rank + 1, entry.count))?;
            for record in &records[entry.exemplar..entry.exemplar + WINDOW_LEN] {
                sink.write_line(&format!(
                    "  {} {} {} {}",
                    record.source_user, record.source_port, record.dest_ip, record.dest_port
                ))?;
            }
        }

        Ok(())
    }
}

/// Ingest one journal file and run the full battery against `sink`.
pub async fn analyze_journal(
    path: &Path,
    sink: &mut (dyn ReportSink + Send),
    config: &EngineConfig,
) -> Result<(), AnalyzeError> {
    let records = Arc::new(crate::input::read_journal(path)?);
    log::info!("{}: {} records ingested", path.display(), records.len());
    AnalysisDriver::new(config.clone()).run(records, sink).await?;
    Ok(())
}
