//! Report output.
//!
//! The engine decides what to say, not where it goes: findings are
//! written line by line through [`ReportSink`], and any write failure is
//! fatal for the run. The batch driver pairs each input journal with a
//! randomly tagged result file so concurrent runs over the same input
//! never clobber each other.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use rand::Rng;

use crate::error::SinkError;

/// Destination for report lines.
pub trait ReportSink {
    fn write_line(&mut self, line: &str) -> Result<(), SinkError>;
}

/// Buffered file sink. Call [`FileSink::finish`] to flush; dropping an
/// unfinished sink discards buffered data silently.
pub struct FileSink {
    writer: BufWriter<File>,
    path: PathBuf,
}

impl FileSink {
    pub fn create(path: &Path) -> Result<Self, SinkError> {
        let file = File::create(path)?;
        Ok(FileSink {
            writer: BufWriter::new(file),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn finish(mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        Ok(())
    }
}

impl ReportSink for FileSink {
    fn write_line(&mut self, line: &str) -> Result<(), SinkError> {
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }
}

/// In-memory sink for tests and programmatic use.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub lines: Vec<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReportSink for MemorySink {
    fn write_line(&mut self, line: &str) -> Result<(), SinkError> {
        self.lines.push(line.to_string());
        Ok(())
    }
}

const TAG_LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const TAG_LEN: usize = 8;

/// Result file name for an input journal:
/// `<input name>.<random 8-letter tag>.result.txt`.
pub fn result_filename(input: &Path) -> String {
    let mut rng = rand::thread_rng();
    let tag: String = (0..TAG_LEN)
        .map(|_| TAG_LETTERS[rng.gen_range(0..TAG_LETTERS.len())] as char)
        .collect();
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "journal".to_string());
    format!("{}.{}.result.txt", name, tag)
}
