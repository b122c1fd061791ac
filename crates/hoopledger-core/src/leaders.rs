// All-time leaders for points, assists and rebounds.

use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Stat categories
// ---------------------------------------------------------------------------

/// The three tracked categories, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stat {
    Points,
    Assists,
    Rebounds,
}

impl Stat {
    /// Report order: points, assists, rebounds.
    pub const ALL: [Stat; 3] = [Stat::Points, Stat::Assists, Stat::Rebounds];

    /// Label used in the `Max <label>` report line.
    pub fn label(&self) -> &'static str {
        match self {
            Stat::Points => "Points",
            Stat::Assists => "Assists",
            Stat::Rebounds => "Rebs",
        }
    }
}

// ---------------------------------------------------------------------------
// Leader slots
// ---------------------------------------------------------------------------

/// Highest value observed for one category and the player who produced it.
///
/// `value` starts as `None`, which orders below every real total, so the
/// first observation always takes the slot (even a zero).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Leader {
    pub value: Option<u64>,
    pub holder: String,
}

impl Leader {
    /// Take the slot if `value` is strictly greater than the current one.
    /// Ties keep the earlier holder.
    fn offer(&mut self, name: &str, value: u64) {
        if self.value.is_some_and(|current| value <= current) {
            return;
        }
        self.value = Some(value);
        self.holder.clear();
        self.holder.push_str(name);
    }
}

/// One rendered leader row: `(label, value, holder)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderLine {
    pub stat: Stat,
    pub value: Option<u64>,
    pub holder: String,
}

impl fmt::Display for LeaderLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Some(value) => write!(
                f,
                "Max {} {} - Player Name: {}",
                self.stat.label(),
                value,
                self.holder
            ),
            None => write!(f, "Max {} - - Player Name: {}", self.stat.label(), self.holder),
        }
    }
}

// ---------------------------------------------------------------------------
// LeaderBoard
// ---------------------------------------------------------------------------

/// Tracks the single best cumulative total per category across the whole run.
#[derive(Debug, Clone, Default)]
pub struct LeaderBoard {
    points: Leader,
    assists: Leader,
    rebounds: Leader,
}

impl LeaderBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a player's current totals to each category independently.
    pub fn update(&mut self, name: &str, point: u64, assist: u64, rebound: u64) {
        self.points.offer(name, point);
        self.assists.offer(name, assist);
        self.rebounds.offer(name, rebound);
    }

    pub fn leader(&self, stat: Stat) -> &Leader {
        match stat {
            Stat::Points => &self.points,
            Stat::Assists => &self.assists,
            Stat::Rebounds => &self.rebounds,
        }
    }

    /// Points, assists, rebounds, in that order.
    pub fn render(&self) -> [LeaderLine; 3] {
        Stat::ALL.map(|stat| {
            let leader = self.leader(stat);
            LeaderLine {
                stat,
                value: leader.value,
                holder: leader.holder.clone(),
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
