pub mod journal;

pub use journal::{parse_journal, read_journal, TIMESTAMP_LAYOUT};
