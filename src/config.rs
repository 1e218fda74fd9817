use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the analyzer.
///
/// Only tuning knobs live here. Analytical thresholds (eligible web
/// ports, the repeat and time-span cutoffs, the window length) are part
/// of the report contract and are compiled in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Engine tuning
    pub engine: EngineConfig,
    /// Output configuration
    pub output: OutputConfig,
}

/// Engine tuning knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Entries reported per ranking section
    pub top_k: usize,
    /// Maximum in-flight tasks per n-gram miner phase
    pub ngram_batch_size: usize,
    /// Capacity of the candidate-window channel feeding the aggregator
    pub channel_capacity: usize,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory for result files (defaults to the current directory)
    pub directory: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            engine: EngineConfig::default(),
            output: OutputConfig { directory: None },
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            top_k: 5,
            ngram_batch_size: 500,
            channel_capacity: 1024,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn to_file(&self, path: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}
