//! Measures every directory below a monitored root.
//!
//! The root's immediate subdirectories are independent subtrees. Each is
//! walked once (post-order, see [`size`]) and the results are merged into a
//! single [`SizeSnapshot`] keyed by absolute path. With `parallel` set the
//! subtrees are walked on the rayon pool; the merged result is the same.

pub mod cancel;
pub mod size;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::store::snapshot::SizeSnapshot;
use crate::units::normalize;
use cancel::CancelToken;
use size::SubtreeSizes;

pub use size::size_of;

#[derive(Debug, Clone, Copy, Default)]
pub struct MeasureOptions {
    pub parallel: bool,
}

/// A path whose size could not be read. It contributed zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skipped {
    pub path: PathBuf,
    pub reason: String,
}

impl Skipped {
    fn from_io_error(err: &std::io::Error, path: &Path) -> Self {
        Skipped {
            path: path.to_path_buf(),
            reason: err.to_string(),
        }
    }

    fn from_walk_error(err: &walkdir::Error, fallback: &Path) -> Self {
        Skipped {
            path: err.path().unwrap_or(fallback).to_path_buf(),
            reason: err
                .io_error()
                .map(|e| e.to_string())
                .unwrap_or_else(|| err.to_string()),
        }
    }
}

#[derive(Debug)]
pub struct Measurement {
    pub root: PathBuf,
    pub snapshot: SizeSnapshot,
    /// size of the root itself, including files directly inside it
    pub total_bytes: u64,
    pub skipped: Vec<Skipped>,
    pub duration: Duration,
}

pub fn measure_tree(root: &Path, options: &MeasureOptions, cancel: &CancelToken) -> Result<Measurement> {
    let start = Instant::now();

    // the root itself may be a symlink to the monitored tree; nothing below it is followed
    let metadata = fs::metadata(root).map_err(|e| Error::io(root, e))?;
    if !metadata.is_dir() {
        return Err(Error::InvalidRoot(root.to_path_buf()));
    }

    info!("measuring {}", root.display());

    let mut total = metadata.len();
    let mut skipped = Vec::new();
    let mut subdirs = Vec::new();

    let read_dir = fs::read_dir(root).map_err(|e| Error::io(root, e))?;
    for item in read_dir {
        let entry = match item {
            Ok(entry) => entry,
            Err(err) => {
                warn!("skipping entry in {}: {err}", root.display());
                skipped.push(Skipped::from_io_error(&err, root));
                continue;
            }
        };

        let path = entry.path();
        let file_type = match entry.file_type() {
            Ok(file_type) => file_type,
            Err(err) => {
                warn!("skipping {}: {err}", path.display());
                skipped.push(Skipped::from_io_error(&err, &path));
                continue;
            }
        };

        if file_type.is_dir() {
            subdirs.push(path);
            continue;
        }

        // files and symlinks directly under the root only count toward the total
        match entry.metadata() {
            Ok(metadata) => total = total.saturating_add(metadata.len()),
            Err(err) => {
                warn!("skipping {}: {err}", path.display());
                skipped.push(Skipped::from_io_error(&err, &path));
            }
        }
    }

    let walk = |dir: &PathBuf| -> Result<SubtreeSizes> {
        let subtree_start = Instant::now();
        let sizes = size::walk_subtree(dir, cancel)?;
        debug!(
            "{}: {} directories, {} in {:.2}s",
            dir.display(),
            sizes.dirs.len(),
            normalize(sizes.total),
            subtree_start.elapsed().as_secs_f64()
        );
        Ok(sizes)
    };

    let results: Vec<Result<SubtreeSizes>> = if options.parallel {
        subdirs.par_iter().map(walk).collect()
    } else {
        subdirs.iter().map(walk).collect()
    };

    let mut snapshot = SizeSnapshot::new();
    for result in results {
        let subtree = result?;
        total = total.saturating_add(subtree.total);
        snapshot.extend(subtree.dirs);
        skipped.extend(subtree.skipped);
    }

    if cancel.is_cancelled() {
        return Err(Error::Cancelled);
    }

    skipped.sort_by(|a, b| a.path.cmp(&b.path));

    let duration = start.elapsed();
    info!(
        "measured {} directories, {} total, {} skipped, {:.2}s",
        snapshot.len(),
        normalize(total),
        skipped.len(),
        duration.as_secs_f64()
    );

    Ok(Measurement {
        root: root.to_path_buf(),
        snapshot,
        total_bytes: total,
        skipped,
        duration,
    })
}
