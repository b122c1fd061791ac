// Property tests for the ordered index, leader board and season reporting.

use std::collections::BTreeMap;
use std::convert::Infallible;

use hoopledger_core::index::OrderedIndex;
use hoopledger_core::leaders::{LeaderBoard, Stat};
use hoopledger_core::{process, Record, ReportScope};
use proptest::prelude::*;

/// Small name and season alphabets so that merges and boundaries happen often.
fn record_strategy() -> impl Strategy<Value = Record> {
    (
        prop::sample::select(vec!["2019", "2020", "2021"]),
        "[A-Ea-e]{1,3}",
        prop::sample::select(vec!["ASV", "FEN", "RMB", "OLY"]),
        0u32..50,
        0u32..50,
        0u32..200,
    )
        .prop_map(|(season, name, team, reb, ast, pts)| {
            Record::new(season, name, team, reb, ast, pts)
        })
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct Totals {
    season: String,
    team: String,
    rebound: u64,
    assist: u64,
    point: u64,
}

proptest! {
    #[test]
    fn tree_invariants_hold_after_every_insert(records in prop::collection::vec(record_strategy(), 0..200)) {
        let mut index = OrderedIndex::new();
        let mut leaders = LeaderBoard::new();
        for record in &records {
            index.insert_or_merge(record, &mut leaders);
            prop_assert!(index.check_invariants().is_ok(), "{:?}", index.check_invariants());
        }
    }

    #[test]
    fn index_matches_reference_map(records in prop::collection::vec(record_strategy(), 0..200)) {
        let mut index = OrderedIndex::new();
        let mut leaders = LeaderBoard::new();
        let mut expected: BTreeMap<String, Totals> = BTreeMap::new();

        for record in &records {
            index.insert_or_merge(record, &mut leaders);
            let totals = expected.entry(record.full_name.clone()).or_default();
            totals.season = record.season.clone();
            totals.team = record.team.clone();
            totals.rebound += u64::from(record.rebound);
            totals.assist += u64::from(record.assist);
            totals.point += u64::from(record.point);
        }

        prop_assert_eq!(index.len(), expected.len());
        let actual: Vec<(String, Totals)> = index
            .traverse_in_order()
            .map(|v| {
                (
                    v.entry.full_name().to_string(),
                    Totals {
                        season: v.entry.season().to_string(),
                        team: v.entry.team().to_string(),
                        rebound: v.entry.rebound(),
                        assist: v.entry.assist(),
                        point: v.entry.point(),
                    },
                )
            })
            .collect();
        let expected: Vec<(String, Totals)> = expected.into_iter().collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn leaders_track_first_true_maximum(records in prop::collection::vec(record_strategy(), 1..200)) {
        let mut index = OrderedIndex::new();
        let mut leaders = LeaderBoard::new();
        let mut running: BTreeMap<String, [u64; 3]> = BTreeMap::new();
        let mut best: [(u64, String); 3] = Default::default();
        let mut seen = false;

        for record in &records {
            index.insert_or_merge(record, &mut leaders);
            let totals = running.entry(record.full_name.clone()).or_default();
            totals[0] += u64::from(record.point);
            totals[1] += u64::from(record.assist);
            totals[2] += u64::from(record.rebound);
            for (slot, value) in totals.iter().enumerate() {
                if !seen || *value > best[slot].0 {
                    best[slot] = (*value, record.full_name.clone());
                }
            }
            seen = true;
        }

        for (slot, stat) in Stat::ALL.into_iter().enumerate() {
            let leader = leaders.leader(stat);
            prop_assert_eq!(leader.value, Some(best[slot].0));
            prop_assert_eq!(&leader.holder, &best[slot].1);
        }
    }

    #[test]
    fn one_snapshot_per_season_run(records in prop::collection::vec(record_strategy(), 0..100)) {
        let runs = if records.is_empty() {
            0
        } else {
            1 + records.windows(2).filter(|w| w[0].season != w[1].season).count()
        };

        let mut labels = Vec::new();
        let summary = process(records.clone(), ReportScope::All, |snapshot| {
            labels.push(snapshot.season);
            Ok::<(), Infallible>(())
        })
        .unwrap();

        prop_assert_eq!(labels.len(), runs);
        prop_assert_eq!(summary.snapshots, runs);
        if let Some(last) = records.last() {
            prop_assert_eq!(labels.last(), Some(&last.season));
        }
    }

    #[test]
    fn teardown_releases_one_entry_per_distinct_key(records in prop::collection::vec(record_strategy(), 0..200)) {
        let mut index = OrderedIndex::new();
        let mut leaders = LeaderBoard::new();
        for record in &records {
            index.insert_or_merge(record, &mut leaders);
        }
        let distinct: std::collections::BTreeSet<&str> =
            records.iter().map(|r| r.full_name.as_str()).collect();

        prop_assert_eq!(index.teardown(), distinct.len());
        prop_assert!(index.is_empty());
        prop_assert_eq!(index.traverse_post_order().count(), 0);
    }
}
