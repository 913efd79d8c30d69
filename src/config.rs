//! Run configuration.
//!
//! Built-in defaults, overridden by an optional TOML file, overridden by
//! command-line flags. The file is `--config` if given, otherwise
//! `config.toml` in the platform config dir when it exists:
//!
//! ```toml
//! root = "/srv/data"
//! percent_threshold = 20.0
//! byte_threshold = 10485760
//! state_file = "/var/lib/sizewatch/data.json"
//! parallel = true
//! ```

use std::fs;
use std::path::{Component, Path, PathBuf};

use serde::Deserialize;

use crate::cli::{BaselineArgs, RunArgs};
use crate::error::{Error, Result};
use crate::platform;
use crate::store::diff::ThresholdPolicy;
use crate::store::snapshot::DEFAULT_STATE_FILE;

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub root: Option<PathBuf>,
    pub percent_threshold: Option<f64>,
    pub byte_threshold: Option<u64>,
    pub state_file: Option<PathBuf>,
    pub parallel: Option<bool>,
}

impl FileConfig {
    fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::parse(&content).map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }

    /// An explicit path must exist; the default location is optional.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        match default_config_path() {
            Some(path) if path.is_file() => Self::load(&path),
            _ => Ok(FileConfig::default()),
        }
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "sizewatch").map(|dirs| dirs.config_dir().join("config.toml"))
}

#[derive(Debug, Clone)]
pub struct Config {
    pub root: PathBuf,
    pub policy: ThresholdPolicy,
    pub state_file: PathBuf,
    pub parallel: bool,
    pub json_output: bool,
    pub output: Option<PathBuf>,
}

impl Config {
    pub fn from_run_args(args: &RunArgs) -> Result<Self> {
        let file = FileConfig::discover(args.config.as_deref())?;
        Self::merge(args, file)
    }

    fn merge(args: &RunArgs, file: FileConfig) -> Result<Self> {
        let root = args
            .root
            .clone()
            .or(file.root)
            .or_else(platform::home_dir)
            .ok_or_else(|| Error::Config("no root given and no home directory found".to_string()))?;

        let policy = ThresholdPolicy::new(
            args.percent.or(file.percent_threshold).unwrap_or(0.0),
            args.bytes.or(file.byte_threshold).unwrap_or(0),
        )?;

        let state_file = args
            .state_file
            .clone()
            .or(file.state_file)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_FILE));

        Ok(Config {
            root: absolute(root)?,
            policy,
            state_file: absolute(state_file)?,
            parallel: args.parallel || file.parallel.unwrap_or(false),
            json_output: args.json,
            output: args.output.clone(),
        })
    }
}

/// Resolve the baseline location for `sizewatch baseline`.
pub fn state_file_for(args: &BaselineArgs) -> Result<PathBuf> {
    let file = FileConfig::discover(args.config.as_deref())?;
    let state_file = args
        .state_file
        .clone()
        .or(file.state_file)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_FILE));
    absolute(state_file)
}

// baseline keys are absolute paths, so one directory must always be spelled
// the same way: `./data/` becomes `<cwd>/data`
fn absolute(path: PathBuf) -> Result<PathBuf> {
    let path = if path.is_absolute() {
        path
    } else {
        let cwd = std::env::current_dir().map_err(|e| Error::io(".", e))?;
        cwd.join(path)
    };
    Ok(path.components().filter(|c| !matches!(c, Component::CurDir)).collect())
}
