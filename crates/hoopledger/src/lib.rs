// Library root: the file, config and command-line layer around
// hoopledger-core, exposed so integration tests can drive a whole run.

pub mod cli;
pub mod config;
pub mod ingest;
pub mod output;

use anyhow::Context;
use hoopledger_core::{try_process, RunSummary};
use tracing::{info, warn};

use crate::cli::RunSettings;
use crate::ingest::RecordReader;

/// Read every record from the input, write a snapshot per season, and
/// return the run's counts.
pub fn run(settings: &RunSettings) -> anyhow::Result<RunSummary> {
    if settings.input_defaulted {
        warn!(
            "input file name was not specified as an argument; using {}",
            settings.input.display()
        );
    }

    let mut reader = RecordReader::open(&settings.input, settings.read)?;
    let mut writer = output::open_target(&settings.output, settings.format)
        .context("failed to open report output")?;

    info!(
        input = %settings.input.display(),
        scope = %settings.scope,
        "processing records"
    );

    let summary = try_process(
        reader.by_ref().map(|r| r.map_err(anyhow::Error::from)),
        settings.scope,
        |snapshot| {
            writer
                .write_snapshot(&snapshot)
                .map_err(anyhow::Error::from)
        },
    )
    .with_context(|| format!("failed to process {}", settings.input.display()))?;

    let written = writer.written();
    writer.finish().context("failed to flush report output")?;

    if reader.skipped() > 0 {
        warn!("skipped {} malformed rows", reader.skipped());
    }
    info!(
        "Processed {} records: {} players, {} season snapshots ({} written to {})",
        summary.records, summary.players, summary.snapshots, written, settings.output
    );
    Ok(summary)
}
