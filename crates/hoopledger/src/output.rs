// Snapshot writers: plain text report lines or one JSON object per line.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use hoopledger_core::Snapshot;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to create output file {path}: {source}")]
    Create { path: String, source: io::Error },

    #[error("failed to write report: {0}")]
    Write(#[from] io::Error),

    #[error("failed to serialize snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

/// Buffered sink for snapshots.
pub struct SnapshotWriter<W: Write> {
    out: BufWriter<W>,
    format: OutputFormat,
    written: usize,
}

impl<W: Write> SnapshotWriter<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        SnapshotWriter {
            out: BufWriter::new(out),
            format,
            written: 0,
        }
    }

    pub fn write_snapshot(&mut self, snapshot: &Snapshot) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Text => write!(self.out, "{snapshot}")?,
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.out, snapshot)?;
                writeln!(self.out)?;
            }
        }
        self.written += 1;
        Ok(())
    }

    /// Snapshots written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Flush and hand back the underlying writer.
    pub fn finish(self) -> Result<W, OutputError> {
        self.out
            .into_inner()
            .map_err(|e| OutputError::Write(e.into_error()))
    }
}

/// Open the configured target: `-` is stdout, anything else a file that is
/// created (or truncated).
pub fn open_target(
    target: &str,
    format: OutputFormat,
) -> Result<SnapshotWriter<Box<dyn Write>>, OutputError> {
    let out: Box<dyn Write> = if target == "-" {
        Box::new(io::stdout())
    } else {
        let path = Path::new(target);
        let file = File::create(path).map_err(|e| OutputError::Create {
            path: path.display().to_string(),
            source: e,
        })?;
        Box::new(file)
    };
    Ok(SnapshotWriter::new(out, format))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use hoopledger_core::{process, Record, ReportScope};

    fn snapshots() -> Vec<Snapshot> {
        let records = vec![
            Record::new("2020", "A", "T1", 5, 2, 10),
            Record::new("2020", "B", "T1", 3, 4, 20),
            Record::new("2021", "A", "T2", 1, 1, 1),
        ];
        let mut out = Vec::new();
        process(records, ReportScope::All, |s| {
            out.push(s);
            Ok::<(), OutputError>(())
        })
        .unwrap();
        out
    }

    #[test]
    fn text_output_is_report_lines() {
        let mut writer = SnapshotWriter::new(Vec::new(), OutputFormat::Text);
        for snapshot in &snapshots() {
            writer.write_snapshot(snapshot).unwrap();
        }
        assert_eq!(writer.written(), 2);
        let text = String::from_utf8(writer.finish().unwrap()).unwrap();

        let expected = "\
End of the 2020 Season
Max Points 20 - Player Name: B
Max Assists 4 - Player Name: B
Max Rebs 5 - Player Name: A
(BLACK) A
-(RED) B
End of the 2021 Season
Max Points 20 - Player Name: B
Max Assists 4 - Player Name: B
Max Rebs 6 - Player Name: A
(BLACK) A
-(RED) B
";
        assert_eq!(text, expected);
    }

    #[test]
    fn json_output_is_one_object_per_line() {
        let mut writer = SnapshotWriter::new(Vec::new(), OutputFormat::Json);
        for snapshot in &snapshots() {
            writer.write_snapshot(snapshot).unwrap();
        }
        let text = String::from_utf8(writer.finish().unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);

        let last: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(last["season"], "2021");
        assert_eq!(last["scope"], "all");
        assert_eq!(last["leaders"][0]["stat"], "points");
        assert_eq!(last["leaders"][0]["value"], 20);
        assert_eq!(last["rows"][0]["full_name"], "A");
        assert_eq!(last["rows"][0]["color"], "BLACK");
        assert_eq!(last["rows"][0]["point"], 11);
        assert_eq!(last["rows"][0]["team"], "T2");
    }

    #[test]
    fn create_error_names_path() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("missing-dir").join("report.txt");
        let err = open_target(target.to_str().unwrap(), OutputFormat::Text)
            .err()
            .expect("creating inside a missing directory should fail");
        assert!(matches!(err, OutputError::Create { .. }));
        assert!(err.to_string().contains("report.txt"));
    }
}
