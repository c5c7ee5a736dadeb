//! Domain model and reconciliation engine for runnerdeck.
//!
//! Everything in this crate is pure: runner and job values are immutable
//! snapshots rebuilt on every poll tick, and `reconcile` is a function of its
//! inputs plus a reference "now". Fetching and rendering live elsewhere.

mod duration;
mod model;
mod reconcile;

pub use duration::format_duration;
pub use model::{
    InvalidRepoSpec, Job, JobStatus, MonitorTarget, Runner, RunnerStatus, Snapshot, UnifiedRow,
};
pub use reconcile::reconcile;
