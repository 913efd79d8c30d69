use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use fd_lock::{RwLock, RwLockWriteGuard};

use crate::error::{Error, Result};

/// Advisory lock beside the baseline file, held for the whole run.
///
/// Two runs writing the same baseline would make one of them diff against a
/// snapshot the other just replaced. The second run fails fast instead.
pub struct RunLock {
    path: PathBuf,
    lock: RwLock<File>,
}

impl RunLock {
    /// Open (creating if needed) the lock file for `state_path`.
    pub fn for_state_file(state_path: &Path) -> Result<Self> {
        let mut name = OsString::from(state_path.as_os_str());
        name.push(".lock");
        let path = PathBuf::from(name);

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(|e| Error::io(&path, e))?;

        Ok(RunLock {
            path,
            lock: RwLock::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn try_acquire(&mut self) -> Result<RwLockWriteGuard<'_, File>> {
        match self.lock.try_write() {
            Ok(guard) => Ok(guard),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                Err(Error::AlreadyRunning(self.path.clone()))
            }
            Err(e) => Err(Error::io(&self.path, e)),
        }
    }
}
