//! Size accounting for files and directory subtrees.
//!
//! Sizes are `lstat` sizes: a directory counts its own entry size plus
//! everything below it, a symlink counts only the link object. Links are never
//! followed, so cyclic links and targets outside the tree cost nothing.

use std::fs;
use std::path::Path;

use tracing::warn;
use walkdir::WalkDir;

use crate::error::{Error, Result};
use super::cancel::CancelToken;
use super::Skipped;

// how many entries to process between cancellation checks
const CANCEL_POLL_INTERVAL: usize = 512;

/// Result of walking one directory subtree.
pub(crate) struct SubtreeSizes {
    pub total: u64,
    /// every directory in the subtree, including its root, with its total size
    pub dirs: Vec<(String, u64)>,
    pub skipped: Vec<Skipped>,
}

/// Total size in bytes of a file, symlink or directory tree.
///
/// Fails only if `path` itself cannot be inspected. Unreadable entries further
/// down contribute zero and are logged.
pub fn size_of(path: &Path) -> Result<u64> {
    let metadata = fs::symlink_metadata(path).map_err(|e| Error::io(path, e))?;
    if !metadata.is_dir() {
        return Ok(metadata.len());
    }

    Ok(walk_subtree(path, &CancelToken::new())?.total)
}

/// Post-order walk of a directory subtree.
///
/// walkdir yields children before their parent with `contents_first`, so each
/// depth keeps a running sum that the parent directory collects when it is
/// finally yielded. One metadata lookup per entry; the dir/symlink decision
/// comes from the file type reported by the directory read.
pub(crate) fn walk_subtree(root: &Path, cancel: &CancelToken) -> Result<SubtreeSizes> {
    let mut pending: Vec<u64> = vec![0, 0];
    let mut dirs = Vec::new();
    let mut skipped = Vec::new();
    let mut total = 0u64;

    let walker = WalkDir::new(root)
        .follow_links(false)
        .follow_root_links(false)
        .contents_first(true);

    for (seen, item) in walker.into_iter().enumerate() {
        if seen % CANCEL_POLL_INTERVAL == 0 && cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let entry = match item {
            Ok(entry) => entry,
            Err(err) => {
                let skip = Skipped::from_walk_error(&err, root);
                warn!("skipping {}: {}", skip.path.display(), skip.reason);
                skipped.push(skip);
                continue;
            }
        };

        let depth = entry.depth();
        if pending.len() < depth + 2 {
            pending.resize(depth + 2, 0);
        }

        let own = match entry.metadata() {
            Ok(metadata) => metadata.len(),
            Err(err) => {
                let skip = Skipped::from_walk_error(&err, entry.path());
                warn!("skipping {}: {}", skip.path.display(), skip.reason);
                skipped.push(skip);
                0
            }
        };

        let size = if entry.file_type().is_dir() {
            let children = std::mem::take(&mut pending[depth + 1]);
            let size = own.saturating_add(children);
            dirs.push((entry.path().to_string_lossy().into_owned(), size));
            size
        } else {
            own
        };

        if depth == 0 {
            total = size;
        } else {
            pending[depth] = pending[depth].saturating_add(size);
        }
    }

    Ok(SubtreeSizes { total, dirs, skipped })
}
