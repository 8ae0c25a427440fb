//! Record source abstraction for feed ingestion.
//!
//! The tracker consumes raw fixed-width records. This module provides a
//! trait over where those records come from, plus two implementations:
//!
//! - [`VecSource`]: in-memory records (tests, simulations)
//! - [`FileSource`]: a PITCH capture file or any `BufRead`, with the
//!   per-line `S` framing character and line terminator stripped
//!
//! # Example
//!
//! ```ignore
//! use pitch_sales::source::{FileSource, RecordSource};
//! use pitch_sales::SalesTracker;
//!
//! let source = FileSource::open("data/pitch_example_data")?;
//! let mut tracker = SalesTracker::new();
//! tracker.process_source(source)?;
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Framing character that starts every line of a PITCH capture.
pub const FRAMING_CHAR: char = 'S';

/// I/O buffer size for file reading (1MB).
pub const IO_BUFFER_SIZE: usize = 1 << 20;

// ============================================================================
// Source Metadata
// ============================================================================

/// Metadata about a record source.
#[derive(Debug, Clone, Default)]
pub struct SourceMetadata {
    /// Original file path (if loaded from file)
    pub file_path: Option<PathBuf>,

    /// Provider name (e.g., "file", "memory", "stdin")
    pub provider: Option<String>,

    /// Estimated record count (for progress tracking)
    pub estimated_records: Option<u64>,

    /// File size in bytes (if applicable)
    pub file_size: Option<u64>,
}

impl SourceMetadata {
    /// Create new empty metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the file path.
    pub fn with_file_path(mut self, path: impl AsRef<Path>) -> Self {
        self.file_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the provider.
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Set the estimated record count.
    pub fn with_estimated_records(mut self, count: u64) -> Self {
        self.estimated_records = Some(count);
        self
    }

    /// Set the file size.
    pub fn with_file_size(mut self, size: u64) -> Self {
        self.file_size = Some(size);
        self
    }
}

// ============================================================================
// Record Source Trait
// ============================================================================

/// Trait for record sources.
///
/// `records()` consumes `self` for single-pass iteration. Each item is one
/// raw record without framing, or the I/O error that interrupted reading.
pub trait RecordSource {
    /// The iterator type for records.
    type Records: Iterator<Item = Result<String>>;

    /// Consume the source and return an iterator over raw records.
    fn records(self) -> Result<Self::Records>;

    /// Get metadata about the source.
    fn metadata(&self) -> &SourceMetadata;
}

// ============================================================================
// Vector Source (for testing)
// ============================================================================

/// A simple in-memory source.
///
/// # Example
///
/// ```
/// use pitch_sales::source::{RecordSource, VecSource};
///
/// let source = VecSource::new(vec![
///     "11111111A000000000007S000001XYZxyz0000000005Y".to_string(),
/// ]);
/// assert_eq!(source.metadata().estimated_records, Some(1));
/// assert_eq!(source.records().unwrap().count(), 1);
/// ```
pub struct VecSource {
    records: Vec<String>,
    metadata: SourceMetadata,
}

impl VecSource {
    /// Create a new vector source.
    pub fn new(records: Vec<String>) -> Self {
        Self {
            metadata: SourceMetadata::new()
                .with_provider("memory")
                .with_estimated_records(records.len() as u64),
            records,
        }
    }
}

impl<S: Into<String>> FromIterator<S> for VecSource {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        VecSource::new(iter.into_iter().map(Into::into).collect())
    }
}

impl RecordSource for VecSource {
    type Records = std::iter::Map<std::vec::IntoIter<String>, fn(String) -> Result<String>>;

    fn records(self) -> Result<Self::Records> {
        Ok(self.records.into_iter().map(Ok as fn(String) -> Result<String>))
    }

    fn metadata(&self) -> &SourceMetadata {
        &self.metadata
    }
}

// ============================================================================
// File Source
// ============================================================================

/// Line-oriented source over a PITCH capture.
///
/// Each line has its terminator removed and, with framing enabled (the
/// default), one leading `S`. Blank lines are skipped.
pub struct FileSource {
    reader: Box<dyn BufRead>,
    framed: bool,
    metadata: SourceMetadata,
}

impl FileSource {
    /// Open a capture file.
    ///
    /// # Errors
    /// Returns `PitchError::Io` if the file cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mut metadata = SourceMetadata::new()
            .with_provider("file")
            .with_file_path(path);
        if let Ok(meta) = file.metadata() {
            metadata = metadata.with_file_size(meta.len());
        }

        log::info!(
            "Opened PITCH capture {} ({} bytes)",
            path.display(),
            metadata.file_size.unwrap_or(0)
        );

        Ok(Self {
            reader: Box::new(BufReader::with_capacity(IO_BUFFER_SIZE, file)),
            framed: true,
            metadata,
        })
    }

    /// Wrap any reader (stdin, an in-memory buffer, a decompressor...).
    pub fn from_reader<R: Read + 'static>(reader: R) -> Self {
        Self {
            reader: Box::new(BufReader::with_capacity(IO_BUFFER_SIZE, reader)),
            framed: true,
            metadata: SourceMetadata::new().with_provider("reader"),
        }
    }

    /// Whether lines carry the leading `S` framing character.
    pub fn with_framing(mut self, framed: bool) -> Self {
        self.framed = framed;
        self
    }

    /// Set custom metadata.
    pub fn with_metadata(mut self, metadata: SourceMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

impl RecordSource for FileSource {
    type Records = LineRecords;

    fn records(self) -> Result<Self::Records> {
        Ok(LineRecords {
            lines: self.reader.lines(),
            framed: self.framed,
        })
    }

    fn metadata(&self) -> &SourceMetadata {
        &self.metadata
    }
}

/// Iterator over the records of a [`FileSource`].
pub struct LineRecords {
    lines: std::io::Lines<Box<dyn BufRead>>,
    framed: bool,
}

impl Iterator for LineRecords {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            let record = strip_framing(&line, self.framed);
            if record.is_empty() {
                continue;
            }
            return Some(Ok(record.to_string()));
        }
    }
}

/// Remove a trailing `\r` and, if `framed`, one leading `S`.
///
/// `BufRead::lines` already drops the `\n`.
pub fn strip_framing(line: &str, framed: bool) -> &str {
    let line = line.strip_suffix('\r').unwrap_or(line);
    if framed {
        line.strip_prefix(FRAMING_CHAR).unwrap_or(line)
    } else {
        line
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::io::Write;

    #[test]
    fn test_source_metadata_builder() {
        let meta = SourceMetadata::new()
            .with_provider("file")
            .with_file_path("/data/pitch.txt")
            .with_estimated_records(1000)
            .with_file_size(4096);

        assert_eq!(meta.provider, Some("file".to_string()));
        assert_eq!(meta.file_path, Some(PathBuf::from("/data/pitch.txt")));
        assert_eq!(meta.estimated_records, Some(1000));
        assert_eq!(meta.file_size, Some(4096));
    }

    #[test]
    fn test_vec_source_basic() {
        let source: VecSource = ["rec1", "rec2"].into_iter().collect();

        assert_eq!(source.metadata().estimated_records, Some(2));
        assert_eq!(source.metadata().provider, Some("memory".to_string()));

        let collected: Vec<String> = source.records().unwrap().map(|r| r.unwrap()).collect();
        assert_eq!(collected, vec!["rec1", "rec2"]);
    }

    #[test]
    fn test_vec_source_empty() {
        let source = VecSource::new(Vec::new());
        assert_eq!(source.records().unwrap().count(), 0);
    }

    #[test]
    fn test_strip_framing() {
        assert_eq!(strip_framing("S28800011A", true), "28800011A");
        assert_eq!(strip_framing("S28800011A\r", true), "28800011A");
        assert_eq!(strip_framing("28800011A", true), "28800011A");
        assert_eq!(strip_framing("S28800011A", false), "S28800011A");
    }

    #[test]
    fn test_reader_source_strips_and_skips_blank() {
        let data = "S11111111X000000000001000001\r\n\nS11111111X000000000002000002\n";
        let source = FileSource::from_reader(Cursor::new(data.as_bytes().to_vec()));

        let records: Vec<String> = source.records().unwrap().map(|r| r.unwrap()).collect();
        assert_eq!(
            records,
            vec!["11111111X000000000001000001", "11111111X000000000002000002"]
        );
    }

    #[test]
    fn test_reader_source_custom_metadata() {
        let source = FileSource::from_reader(Cursor::new(Vec::new()))
            .with_metadata(SourceMetadata::new().with_provider("stdin"));

        assert_eq!(source.metadata().provider, Some("stdin".to_string()));
        assert_eq!(source.records().unwrap().count(), 0);
    }

    #[test]
    fn test_reader_source_unframed() {
        let data = "11111111X000000000001000001\n";
        let source = FileSource::from_reader(Cursor::new(data.as_bytes().to_vec()))
            .with_framing(false);

        let records: Vec<String> = source.records().unwrap().map(|r| r.unwrap()).collect();
        assert_eq!(records, vec!["11111111X000000000001000001"]);
    }

    #[test]
    fn test_file_source() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "S11111111A000000000007S000001XYZxyz0000000005Y").unwrap();
        writeln!(file, "S11111111E000000000007000001000000000001").unwrap();
        file.flush().unwrap();

        let source = FileSource::open(file.path()).unwrap();
        assert_eq!(source.metadata().provider, Some("file".to_string()));
        assert!(source.metadata().file_size.unwrap_or(0) > 0);

        let records: Vec<String> = source.records().unwrap().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 2);
        assert!(records[0].starts_with("11111111A"));
    }

    #[test]
    fn test_file_source_nonexistent() {
        assert!(FileSource::open("/nonexistent/pitch.txt").is_err());
    }
}
