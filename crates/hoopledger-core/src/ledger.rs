// Ingestion driver: feeds records through the season reporter and index.

use tracing::debug;

use crate::index::OrderedIndex;
use crate::leaders::LeaderBoard;
use crate::record::Record;
use crate::report::{ReportScope, SeasonReporter, Snapshot};

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub records: usize,
    pub players: usize,
    pub snapshots: usize,
}

/// Owns the index, the leader board and the season reporter for one run.
#[derive(Debug, Default)]
pub struct Ledger {
    index: OrderedIndex,
    leaders: LeaderBoard,
    reporter: SeasonReporter,
    records: usize,
    snapshots: usize,
}

impl Ledger {
    pub fn new(scope: ReportScope) -> Self {
        Ledger {
            reporter: SeasonReporter::new(scope),
            ..Self::default()
        }
    }

    pub fn index(&self) -> &OrderedIndex {
        &self.index
    }

    pub fn leaders(&self) -> &LeaderBoard {
        &self.leaders
    }

    /// Take one record. If it starts a new season, the closed season's
    /// snapshot is returned; it reflects the ledger before this record.
    pub fn ingest(&mut self, record: &Record) -> Option<Snapshot> {
        let snapshot = self
            .reporter
            .observe(&record.season, &self.index, &self.leaders);
        self.index.insert_or_merge(record, &mut self.leaders);
        self.records += 1;
        if snapshot.is_some() {
            self.snapshots += 1;
        }
        snapshot
    }

    /// Snapshot of the last open season; `None` if nothing was ingested.
    pub fn finish(&mut self) -> Option<Snapshot> {
        let snapshot = self.reporter.finish(&self.index, &self.leaders);
        if snapshot.is_some() {
            self.snapshots += 1;
        }
        snapshot
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            records: self.records,
            players: self.index.len(),
            snapshots: self.snapshots,
        }
    }

    /// Release the index. Returns the number of entries released.
    pub fn teardown(&mut self) -> usize {
        self.index.teardown()
    }
}

/// Run a whole record stream through a fresh ledger, handing every snapshot
/// to `emit` as soon as it is produced. An error from `emit` stops the run.
pub fn process<I, F, E>(records: I, scope: ReportScope, emit: F) -> Result<RunSummary, E>
where
    I: IntoIterator<Item = Record>,
    F: FnMut(Snapshot) -> Result<(), E>,
{
    try_process(records.into_iter().map(Ok), scope, emit)
}

/// Like `process`, for sources that can fail mid-stream. The first error,
/// from the source or from `emit`, ends the run without a final snapshot.
pub fn try_process<I, F, E>(records: I, scope: ReportScope, mut emit: F) -> Result<RunSummary, E>
where
    I: IntoIterator<Item = Result<Record, E>>,
    F: FnMut(Snapshot) -> Result<(), E>,
{
    let mut ledger = Ledger::new(scope);
    for record in records {
        if let Some(snapshot) = ledger.ingest(&record?) {
            emit(snapshot)?;
        }
    }
    if let Some(snapshot) = ledger.finish() {
        emit(snapshot)?;
    }

    let summary = ledger.summary();
    let released = ledger.teardown();
    debug!(
        records = summary.records,
        players = summary.players,
        snapshots = summary.snapshots,
        released,
        "ledger run complete"
    );
    Ok(summary)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
