// Delimited-text record loading.
//
// Rows are positional: season, full name, team, rebounds, assists, points.
// A header line, when present, is skipped rather than matched by name.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use hoopledger_core::Record;
use serde::Deserialize;
use tracing::warn;

use crate::config::InputConfig;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("file cannot be opened: {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("malformed record on line {line}: {source}")]
    Malformed { line: u64, source: csv::Error },

    #[error(
        "malformed record on line {line}: expected {expected} fields, found {found}",
        expected = FIELD_COUNT
    )]
    FieldCount { line: u64, found: usize },

    #[error("failed to read input: {source}")]
    Read { source: csv::Error },
}

/// Columns per data row.
pub const FIELD_COUNT: usize = 6;

// ---------------------------------------------------------------------------
// Reader options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOptions {
    pub has_headers: bool,
    pub delimiter: u8,
    pub strict: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        ReadOptions {
            has_headers: true,
            delimiter: b',',
            strict: false,
        }
    }
}

impl From<&InputConfig> for ReadOptions {
    fn from(input: &InputConfig) -> Self {
        ReadOptions {
            has_headers: input.has_headers,
            delimiter: input.delimiter_byte(),
            strict: input.strict,
        }
    }
}

// ---------------------------------------------------------------------------
// Raw row (private)
// ---------------------------------------------------------------------------

/// Deserialized by position; counting stats reject negatives and fractions.
#[derive(Debug, Deserialize)]
struct RawRecord {
    season: String,
    full_name: String,
    team: String,
    rebound: u32,
    assist: u32,
    point: u32,
}

impl From<RawRecord> for Record {
    fn from(raw: RawRecord) -> Self {
        Record {
            season: raw.season,
            full_name: raw.full_name,
            team: raw.team,
            rebound: raw.rebound,
            assist: raw.assist,
            point: raw.point,
        }
    }
}

// ---------------------------------------------------------------------------
// RecordReader
// ---------------------------------------------------------------------------

/// Lazily yields one `Record` per data row.
///
/// In lenient mode malformed rows are logged and skipped; in strict mode the
/// first one is returned as an error. I/O failures are always returned.
pub struct RecordReader<R: Read> {
    rows: csv::StringRecordsIntoIter<R>,
    strict: bool,
    skipped: usize,
}

impl<R: Read> RecordReader<R> {
    /// Rows are read flexibly: the header's width is never checked and each
    /// data row is measured on its own.
    pub fn from_reader(rdr: R, options: ReadOptions) -> Self {
        let reader = csv::ReaderBuilder::new()
            .has_headers(options.has_headers)
            .flexible(true)
            .delimiter(options.delimiter)
            .trim(csv::Trim::All)
            .from_reader(rdr);
        RecordReader {
            rows: reader.into_records(),
            strict: options.strict,
            skipped: 0,
        }
    }

    /// Rows dropped so far in lenient mode.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn reject(&mut self, error: IngestError) -> Option<IngestError> {
        if self.strict {
            return Some(error);
        }
        warn!(%error, "skipping malformed record");
        self.skipped += 1;
        None
    }
}

impl RecordReader<File> {
    /// Open `path` for reading.
    pub fn open(path: &Path, options: ReadOptions) -> Result<Self, IngestError> {
        let file = File::open(path).map_err(|e| IngestError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(Self::from_reader(file, options))
    }
}

fn line_of(error: &csv::Error) -> u64 {
    error.position().map(|p| p.line()).unwrap_or(0)
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = Result<Record, IngestError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let row = match self.rows.next()? {
                Ok(row) => row,
                Err(e) if e.is_io_error() => return Some(Err(IngestError::Read { source: e })),
                Err(e) => {
                    let line = line_of(&e);
                    match self.reject(IngestError::Malformed { line, source: e }) {
                        Some(err) => return Some(Err(err)),
                        None => continue,
                    }
                }
            };

            let line = row.position().map(|p| p.line()).unwrap_or(0);
            let parsed = if row.len() != FIELD_COUNT {
                Err(IngestError::FieldCount {
                    line,
                    found: row.len(),
                })
            } else {
                row.deserialize::<RawRecord>(None)
                    .map_err(|source| IngestError::Malformed { line, source })
            };
            match parsed {
                Ok(raw) => return Some(Ok(raw.into())),
                Err(error) => {
                    if let Some(err) = self.reject(error) {
                        return Some(Err(err));
                    }
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
