// Season boundary detection and snapshot rendering.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::index::{Color, OrderedIndex, Visit};
use crate::leaders::{LeaderBoard, LeaderLine};

// ---------------------------------------------------------------------------
// Report scope
// ---------------------------------------------------------------------------

/// Which entries a snapshot lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportScope {
    /// Every player seen so far.
    #[default]
    All,
    /// Only players whose latest record belongs to the season being closed.
    Season,
}

impl ReportScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportScope::All => "all",
            ReportScope::Season => "season",
        }
    }
}

impl fmt::Display for ReportScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown report scope `{0}` (expected `all` or `season`)")]
pub struct ParseScopeError(String);

impl FromStr for ReportScope {
    type Err = ParseScopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(ReportScope::All),
            "season" => Ok(ReportScope::Season),
            _ => Err(ParseScopeError(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// One listed entry. Text output only uses `depth`, `color` and `full_name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeRow {
    pub depth: usize,
    pub color: Color,
    pub full_name: String,
    pub team: String,
    pub season: String,
    pub rebound: u64,
    pub assist: u64,
    pub point: u64,
}

impl From<Visit<'_>> for TreeRow {
    fn from(visit: Visit<'_>) -> Self {
        let entry = visit.entry;
        TreeRow {
            depth: visit.depth,
            color: entry.color(),
            full_name: entry.full_name().to_string(),
            team: entry.team().to_string(),
            season: entry.season().to_string(),
            rebound: entry.rebound(),
            assist: entry.assist(),
            point: entry.point(),
        }
    }
}

impl fmt::Display for TreeRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for _ in 0..self.depth {
            f.write_str("-")?;
        }
        write!(f, "({}) {}", self.color, self.full_name)
    }
}

/// The report emitted when a season closes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub season: String,
    pub scope: ReportScope,
    pub leaders: [LeaderLine; 3],
    pub rows: Vec<TreeRow>,
}

impl Snapshot {
    /// Capture leaders and index contents as they stand right now.
    pub fn capture(
        season: &str,
        scope: ReportScope,
        index: &OrderedIndex,
        leaders: &LeaderBoard,
    ) -> Self {
        let rows = match scope {
            ReportScope::All => index.traverse_in_order().map(TreeRow::from).collect(),
            ReportScope::Season => index.traverse_filtered(season).map(TreeRow::from).collect(),
        };
        Snapshot {
            season: season.to_string(),
            scope,
            leaders: leaders.render(),
            rows,
        }
    }

    /// The rendered text, one element per output line.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(1 + self.leaders.len() + self.rows.len());
        lines.push(self.header());
        lines.extend(self.leaders.iter().map(ToString::to_string));
        lines.extend(self.rows.iter().map(ToString::to_string));
        lines
    }

    fn header(&self) -> String {
        format!("End of the {} Season", self.season)
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.header())?;
        for leader in &self.leaders {
            writeln!(f, "{leader}")?;
        }
        for row in &self.rows {
            writeln!(f, "{row}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// SeasonReporter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SeasonState {
    #[default]
    NoSeasonYet,
    InSeason(String),
}

/// Watches the season field of incoming records and snapshots the ledger
/// whenever it changes, plus once more at end of stream.
#[derive(Debug, Clone, Default)]
pub struct SeasonReporter {
    state: SeasonState,
    scope: ReportScope,
}

impl SeasonReporter {
    pub fn new(scope: ReportScope) -> Self {
        SeasonReporter {
            state: SeasonState::NoSeasonYet,
            scope,
        }
    }

    pub fn state(&self) -> &SeasonState {
        &self.state
    }

    pub fn current_season(&self) -> Option<&str> {
        match &self.state {
            SeasonState::NoSeasonYet => None,
            SeasonState::InSeason(season) => Some(season),
        }
    }

    /// Called with each record's season *before* the record is indexed.
    /// Returns the snapshot of the season being closed, if `season` opens a
    /// new one.
    pub fn observe(
        &mut self,
        season: &str,
        index: &OrderedIndex,
        leaders: &LeaderBoard,
    ) -> Option<Snapshot> {
        match &self.state {
            SeasonState::InSeason(current) if current == season => None,
            SeasonState::NoSeasonYet => {
                self.state = SeasonState::InSeason(season.to_string());
                None
            }
            SeasonState::InSeason(current) => {
                let snapshot = Snapshot::capture(current, self.scope, index, leaders);
                debug!(closed = %current, opened = %season, rows = snapshot.rows.len(), "season boundary");
                self.state = SeasonState::InSeason(season.to_string());
                Some(snapshot)
            }
        }
    }

    /// Snapshot the season still open at end of stream. Resets to
    /// `NoSeasonYet`, so a second call returns `None`.
    pub fn finish(&mut self, index: &OrderedIndex, leaders: &LeaderBoard) -> Option<Snapshot> {
        match std::mem::take(&mut self.state) {
            SeasonState::NoSeasonYet => None,
            SeasonState::InSeason(current) => {
                debug!(closed = %current, "end of stream");
                Some(Snapshot::capture(&current, self.scope, index, leaders))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;

    fn feed(index: &mut OrderedIndex, leaders: &mut LeaderBoard, record: Record) {
        index.insert_or_merge(&record, leaders);
    }

    #[test]
    fn scope_parses_case_insensitively() {
        assert_eq!("all".parse::<ReportScope>(), Ok(ReportScope::All));
        assert_eq!(" Season ".parse::<ReportScope>(), Ok(ReportScope::Season));
        assert!("everything".parse::<ReportScope>().is_err());
    }

    #[test]
    fn first_record_opens_season_silently() {
        let index = OrderedIndex::new();
        let leaders = LeaderBoard::new();
        let mut reporter = SeasonReporter::new(ReportScope::All);

        assert!(reporter.observe("2020", &index, &leaders).is_none());
        assert_eq!(reporter.current_season(), Some("2020"));
        assert!(reporter.observe("2020", &index, &leaders).is_none());
    }

    #[test]
    fn season_change_snapshots_closing_season() {
        let mut index = OrderedIndex::new();
        let mut leaders = LeaderBoard::new();
        let mut reporter = SeasonReporter::new(ReportScope::All);

        reporter.observe("2020", &index, &leaders);
        feed(&mut index, &mut leaders, Record::new("2020", "A", "T1", 5, 2, 10));

        let snapshot = reporter.observe("2021", &index, &leaders).unwrap();
        assert_eq!(snapshot.season, "2020");
        assert_eq!(snapshot.rows.len(), 1);
        assert_eq!(reporter.current_season(), Some("2021"));
    }

    #[test]
    fn finish_without_records_is_silent() {
        let index = OrderedIndex::new();
        let leaders = LeaderBoard::new();
        let mut reporter = SeasonReporter::new(ReportScope::All);
        assert!(reporter.finish(&index, &leaders).is_none());
    }

    #[test]
    fn finish_reports_once() {
        let mut index = OrderedIndex::new();
        let mut leaders = LeaderBoard::new();
        let mut reporter = SeasonReporter::new(ReportScope::All);
        reporter.observe("2020", &index, &leaders);
        feed(&mut index, &mut leaders, Record::new("2020", "A", "T1", 5, 2, 10));

        let last = reporter.finish(&index, &leaders).unwrap();
        assert_eq!(last.season, "2020");
        assert!(reporter.finish(&index, &leaders).is_none());
        assert_eq!(reporter.state(), &SeasonState::NoSeasonYet);
    }

    #[test]
    fn season_scope_lists_only_closing_season() {
        let mut index = OrderedIndex::new();
        let mut leaders = LeaderBoard::new();
        feed(&mut index, &mut leaders, Record::new("2020", "A", "T", 1, 1, 1));
        feed(&mut index, &mut leaders, Record::new("2021", "B", "T", 1, 1, 1));

        let all = Snapshot::capture("2021", ReportScope::All, &index, &leaders);
        let season = Snapshot::capture("2021", ReportScope::Season, &index, &leaders);
        assert_eq!(all.rows.len(), 2);
        assert_eq!(season.rows.len(), 1);
        assert_eq!(season.rows[0].full_name, "B");
    }

    #[test]
    fn text_layout() {
        let mut index = OrderedIndex::new();
        let mut leaders = LeaderBoard::new();
        for name in ["b", "a", "c", "d"] {
            feed(&mut index, &mut leaders, Record::new("2020", name, "T", 1, 2, 3));
        }
        let snapshot = Snapshot::capture("2020", ReportScope::All, &index, &leaders);

        let expected = "\
End of the 2020 Season
Max Points 3 - Player Name: b
Max Assists 2 - Player Name: b
Max Rebs 1 - Player Name: b
-(BLACK) a
(BLACK) b
-(BLACK) c
--(RED) d
";
        assert_eq!(snapshot.to_string(), expected);
        assert_eq!(snapshot.lines().join("\n") + "\n", expected);
    }

    #[test]
    fn serializes_with_uppercase_colors() {
        let mut index = OrderedIndex::new();
        let mut leaders = LeaderBoard::new();
        feed(&mut index, &mut leaders, Record::new("2020", "b", "T", 1, 2, 3));
        feed(&mut index, &mut leaders, Record::new("2020", "a", "T", 4, 5, 6));
        let snapshot = Snapshot::capture("2020", ReportScope::Season, &index, &leaders);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["scope"], "season");
        assert_eq!(json["rows"][0]["full_name"], "a");
        assert_eq!(json["rows"][0]["color"], "RED");
        assert_eq!(json["rows"][0]["depth"], 1);
        assert_eq!(json["rows"][1]["color"], "BLACK");
        assert_eq!(json["leaders"][2]["stat"], "rebounds");
        assert_eq!(json["leaders"][2]["holder"], "a");
    }
}
