pub mod analysis;
pub mod config;
pub mod error;
pub mod input;
pub mod models;
pub mod output;

// Re-export commonly used types
pub use analysis::{analyze_journal, AnalysisDriver, NGramEntry, NGramMiner, PeriodicFinding};
pub use config::{Config, EngineConfig};
pub use error::{AnalyzeError, IngestError, SinkError};
pub use models::{DestinationSignature, RecordSequence, TrafficRecord};
pub use output::{FileSink, MemorySink, ReportSink};
