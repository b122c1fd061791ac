// Per-season stat lines fed into the ledger.

use serde::{Deserialize, Serialize};

/// One player's counting stats for one season, as delivered by the input
/// reader. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub season: String,
    pub full_name: String,
    pub team: String,
    pub rebound: u32,
    pub assist: u32,
    pub point: u32,
}

impl Record {
    pub fn new(
        season: impl Into<String>,
        full_name: impl Into<String>,
        team: impl Into<String>,
        rebound: u32,
        assist: u32,
        point: u32,
    ) -> Self {
        Record {
            season: season.into(),
            full_name: full_name.into(),
            team: team.into(),
            rebound,
            assist,
            point,
        }
    }
}
