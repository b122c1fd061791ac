// Core of the season ledger: a red-black index of player totals, all-time
// leaders, and season-boundary snapshots. Performs no I/O.

pub mod index;
pub mod leaders;
pub mod ledger;
pub mod record;
pub mod report;

pub use ledger::{process, try_process, Ledger, RunSummary};
pub use record::Record;
pub use report::{ReportScope, Snapshot};
