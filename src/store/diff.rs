//! Snapshot comparison engine.
//!
//! Compares a baseline against the current snapshot:
//! - Matches directories by absolute path
//! - Added and removed directories are always reported
//! - Changed directories pass through the [`ThresholdPolicy`] first
//! - Every list comes out sorted by path

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use super::snapshot::SizeSnapshot;

/// Noise filter for changed directories.
///
/// A change is reported when `|percent| >= percent_threshold` and
/// `|delta| > absolute_byte_threshold`. Both zero means report everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ThresholdPolicy {
    pub percent_threshold: f64,
    pub absolute_byte_threshold: u64,
}

impl ThresholdPolicy {
    pub fn new(percent_threshold: f64, absolute_byte_threshold: u64) -> Result<Self> {
        if !percent_threshold.is_finite() || percent_threshold < 0.0 {
            return Err(Error::InvalidThreshold(format!(
                "percentage must be a non-negative number, got {percent_threshold}"
            )));
        }

        Ok(ThresholdPolicy {
            percent_threshold,
            absolute_byte_threshold,
        })
    }

    pub fn is_default(&self) -> bool {
        self.percent_threshold == 0.0 && self.absolute_byte_threshold == 0
    }

    /// A zero-byte baseline has no percentage; only the byte test applies then.
    pub fn admits(&self, delta: i64, percent: Option<f64>) -> bool {
        let percent_ok = percent.map_or(true, |p| p.abs() >= self.percent_threshold);
        percent_ok && delta.unsigned_abs() > self.absolute_byte_threshold
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectoryDelta {
    pub path: String,
    pub previous: Option<u64>,
    pub current: Option<u64>,
    pub delta: i64,
    /// undefined for added, removed, and changes from a zero-byte baseline
    pub percent: Option<f64>,
}

impl DirectoryDelta {
    fn added(path: &str, current: u64) -> Self {
        DirectoryDelta {
            path: path.to_string(),
            previous: None,
            current: Some(current),
            delta: to_signed(current),
            percent: None,
        }
    }

    fn removed(path: &str, previous: u64) -> Self {
        DirectoryDelta {
            path: path.to_string(),
            previous: Some(previous),
            current: None,
            delta: -to_signed(previous),
            percent: None,
        }
    }

    fn changed(path: &str, previous: u64, current: u64) -> Self {
        let exact = i128::from(current) - i128::from(previous);
        let delta = i64::try_from(exact).unwrap_or(if exact > 0 { i64::MAX } else { i64::MIN });
        // multiply first so ratios that are exact stay exact
        let percent = (previous != 0).then(|| exact as f64 * 100.0 / previous as f64);

        DirectoryDelta {
            path: path.to_string(),
            previous: Some(previous),
            current: Some(current),
            delta,
            percent,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SnapshotDiff {
    pub added: Vec<DirectoryDelta>,
    pub removed: Vec<DirectoryDelta>,
    pub changed: Vec<DirectoryDelta>,
    /// changed directories held back by the threshold policy
    pub suppressed: usize,
    /// sum of every delta, including suppressed ones
    pub net_change: i64,
}

impl SnapshotDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }

    pub fn added_paths(&self) -> Vec<&str> {
        self.added.iter().map(|d| d.path.as_str()).collect()
    }

    pub fn removed_paths(&self) -> Vec<&str> {
        self.removed.iter().map(|d| d.path.as_str()).collect()
    }

    pub fn changed_paths(&self) -> Vec<&str> {
        self.changed.iter().map(|d| d.path.as_str()).collect()
    }
}

fn to_signed(bytes: u64) -> i64 {
    i64::try_from(bytes).unwrap_or(i64::MAX)
}

/// Classify every directory that differs between `previous` and `current`.
pub fn diff(previous: &SizeSnapshot, current: &SizeSnapshot, policy: &ThresholdPolicy) -> SnapshotDiff {
    let mut result = SnapshotDiff::default();

    // snapshots iterate in path order, so pushes stay sorted
    for (path, current_size) in current.iter() {
        let entry = match previous.get(path) {
            None => {
                let entry = DirectoryDelta::added(path, current_size);
                result.net_change = result.net_change.saturating_add(entry.delta);
                result.added.push(entry);
                continue;
            }
            Some(previous_size) if previous_size == current_size => continue,
            Some(previous_size) => DirectoryDelta::changed(path, previous_size, current_size),
        };

        result.net_change = result.net_change.saturating_add(entry.delta);
        if policy.admits(entry.delta, entry.percent) {
            result.changed.push(entry);
        } else {
            result.suppressed += 1;
        }
    }

    for (path, previous_size) in previous.iter() {
        if !current.contains(path) {
            let entry = DirectoryDelta::removed(path, previous_size);
            result.net_change = result.net_change.saturating_add(entry.delta);
            result.removed.push(entry);
        }
    }

    result
}
