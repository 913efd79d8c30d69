use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: not a directory", .0.display())]
    InvalidRoot(PathBuf),

    #[error("invalid threshold: {0}")]
    InvalidThreshold(String),

    /// The new baseline could not be written. Fatal: reporting without a
    /// saved baseline would desynchronize the next comparison.
    #[error("failed to write baseline {}: {source}", .path.display())]
    StateWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("another run holds the lock on {}", .0.display())]
    AlreadyRunning(PathBuf),

    #[error("measurement cancelled")]
    Cancelled,
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io { path: path.into(), source }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
