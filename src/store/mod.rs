//! Baseline storage and comparison.
//!
//! Persists the latest snapshot to a single JSON file beside a lock file:
//! - snapshot: the path -> size map and its atomic save/load
//! - diff: added / removed / changed classification with thresholds
//! - lock: one run at a time per baseline
//!
//! The baseline is replaced after every measurement, before the diff runs,
//! so each run's measurement becomes the next run's comparison point.

pub mod diff;
pub mod lock;
pub mod snapshot;

pub use diff::{diff, DirectoryDelta, SnapshotDiff, ThresholdPolicy};
pub use lock::RunLock;
pub use snapshot::{Baseline, SizeSnapshot, SnapshotStore};
