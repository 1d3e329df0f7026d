//! Sync runner driving every enabled catalog.
//!
//! The runner owns one [`CatalogSyncer`](crate::sync::CatalogSyncer) per
//! catalog and the [`SourceReader`](crate::source::SourceReader). A run reads
//! and imports each catalog in turn; a source failure for one catalog is
//! reported and the run moves on.
//!
//! Runs are triggered on demand (`run_once`, `trigger`) or by the schedule
//! loop (`start`/`stop`). Only one run executes at a time.

mod scheduler;
mod types;

pub use scheduler::{SyncComponents, SyncRunner};
pub use types::{CatalogRun, RunSummary, RunnerError, RunnerStatus};
