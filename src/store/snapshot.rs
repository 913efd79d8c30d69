use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use atomicwrites::{AtomicFile, OverwriteBehavior};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// Bumped whenever the persisted layout changes; older files are discarded.
pub const STATE_VERSION: u32 = 1;

/// Default baseline location, relative to the working directory.
pub const DEFAULT_STATE_FILE: &str = ".sizewatch.json";

/// Absolute directory path -> size in bytes, ordered by path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SizeSnapshot {
    sizes: BTreeMap<String, u64>,
}

impl SizeSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, bytes: u64) {
        self.sizes.insert(path.into(), bytes);
    }

    pub fn get(&self, path: &str) -> Option<u64> {
        self.sizes.get(path).copied()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.sizes.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.sizes.iter().map(|(path, size)| (path.as_str(), *size))
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.sizes.keys().map(String::as_str)
    }
}

impl Extend<(String, u64)> for SizeSnapshot {
    fn extend<I: IntoIterator<Item = (String, u64)>>(&mut self, iter: I) {
        self.sizes.extend(iter);
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for SizeSnapshot {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        SizeSnapshot {
            sizes: iter.into_iter().map(|(path, size)| (path.into(), size)).collect(),
        }
    }
}

/// On-disk form of a baseline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedState {
    pub version: u32,
    pub root: String,
    pub taken_at: DateTime<Utc>,
    pub total_bytes: u64,
    pub sizes: SizeSnapshot,
}

/// The previous run's snapshot as seen at the start of a run.
#[derive(Debug, Clone)]
pub struct Baseline {
    pub snapshot: SizeSnapshot,
    /// false when there was no usable baseline: first execution
    pub existed: bool,
    pub taken_at: Option<DateTime<Utc>>,
}

impl Baseline {
    fn empty() -> Self {
        Baseline {
            snapshot: SizeSnapshot::new(),
            existed: false,
            taken_at: None,
        }
    }
}

/// Baseline file for one monitored root.
pub struct SnapshotStore {
    path: PathBuf,
    root: String,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>, root: &Path) -> Self {
        SnapshotStore {
            path: path.into(),
            root: root.to_string_lossy().into_owned(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted state as-is. `Ok(None)` when the file does not exist.
    pub fn peek(&self) -> Result<Option<PersistedState>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::io(&self.path, e)),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    /// Load the previous snapshot. Never fails: anything unusable is an empty
    /// baseline and marks the run as a first execution.
    pub fn load(&self) -> Baseline {
        let state = match self.peek() {
            Ok(Some(state)) => state,
            Ok(None) => {
                info!("no baseline at {}, first execution", self.path.display());
                return Baseline::empty();
            }
            Err(e) => {
                warn!("discarding unreadable baseline: {e}");
                return Baseline::empty();
            }
        };

        if state.version != STATE_VERSION {
            warn!(
                "discarding baseline {}: version {} (expected {STATE_VERSION})",
                self.path.display(),
                state.version
            );
            return Baseline::empty();
        }

        // `Path` equality ignores trailing separators and `.` components
        if Path::new(&state.root) != Path::new(&self.root) {
            warn!(
                "discarding baseline {}: recorded for {} not {}",
                self.path.display(),
                state.root,
                self.root
            );
            return Baseline::empty();
        }

        debug!("loaded baseline with {} directories", state.sizes.len());
        Baseline {
            snapshot: state.sizes,
            existed: true,
            taken_at: Some(state.taken_at),
        }
    }

    /// Replace the baseline with `snapshot`. The file is written to a temp
    /// file and renamed over the old one, so readers see old or new, never a
    /// truncated mix.
    pub fn save(&self, snapshot: &SizeSnapshot, total_bytes: u64) -> Result<()> {
        let state = PersistedState {
            version: STATE_VERSION,
            root: self.root.clone(),
            taken_at: Utc::now(),
            total_bytes,
            sizes: snapshot.clone(),
        };
        let bytes = serde_json::to_vec(&state)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| Error::StateWrite {
                path: self.path.clone(),
                source,
            })?;
        }

        AtomicFile::new(&self.path, OverwriteBehavior::AllowOverwrite)
            .write(|f| f.write_all(&bytes))
            .map_err(|e| {
                let source = match e {
                    atomicwrites::Error::Internal(e) | atomicwrites::Error::User(e) => e,
                };
                Error::StateWrite {
                    path: self.path.clone(),
                    source,
                }
            })?;

        debug!("saved baseline with {} directories to {}", snapshot.len(), self.path.display());
        Ok(())
    }
}
