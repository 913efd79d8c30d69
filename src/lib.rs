//! Directory size snapshots and change detection.
//!
//! Each run measures every directory below a root, replaces the saved
//! baseline with that measurement, and reports directories that appeared,
//! disappeared, or changed size by more than a threshold since the last run.

pub mod cli;
pub mod config;
pub mod error;
pub mod monitor;
pub mod notify;
pub mod platform;
pub mod report;
pub mod scan;
pub mod store;
pub mod units;

pub use error::{Error, Result};
