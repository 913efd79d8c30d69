//! One monitoring run, start to finish.
//!
//! Order matters: the new baseline is saved right after measuring and before
//! anything is compared or reported. A run that cannot save its baseline
//! fails without producing a report.

use chrono::Local;
use tracing::info;

use crate::config::Config;
use crate::error::Result;
use crate::notify::{EventStatus, Notifier, RunEvent, Stage};
use crate::platform;
use crate::report::{self, Report, RunContext};
use crate::scan::{self, cancel::CancelToken, MeasureOptions, Measurement};
use crate::store::{self, RunLock, SnapshotDiff, SnapshotStore};
use crate::units::normalize;

#[derive(Debug)]
pub struct RunOutcome {
    pub measurement: Measurement,
    /// no usable baseline existed; the new one was saved but nothing is reported
    pub first_run: bool,
    pub diff: Option<SnapshotDiff>,
    pub report: Option<Report>,
}

pub fn run(config: &Config, notifier: &dyn Notifier, cancel: &CancelToken) -> Result<RunOutcome> {
    notifier.notify(&RunEvent {
        stage: Stage::Started,
        status: EventStatus::Info,
        message: format!("measuring {}", config.root.display()),
    });

    let result = run_inner(config, cancel);

    let event = match &result {
        Ok(outcome) => RunEvent {
            stage: Stage::Finished,
            status: EventStatus::Ok,
            message: summary(outcome),
        },
        Err(e) => RunEvent {
            stage: Stage::Finished,
            status: EventStatus::Error,
            message: e.to_string(),
        },
    };
    notifier.notify(&event);

    result
}

fn run_inner(config: &Config, cancel: &CancelToken) -> Result<RunOutcome> {
    let started_at = Local::now();

    let mut lock = RunLock::for_state_file(&config.state_file)?;
    let _guard = lock.try_acquire()?;

    let store = SnapshotStore::new(&config.state_file, &config.root);
    let baseline = store.load();

    let options = MeasureOptions { parallel: config.parallel };
    let measurement = scan::measure_tree(&config.root, &options, cancel)?;

    store.save(&measurement.snapshot, measurement.total_bytes)?;

    if !baseline.existed {
        info!("first execution for {}, baseline saved", config.root.display());
        return Ok(RunOutcome {
            measurement,
            first_run: true,
            diff: None,
            report: None,
        });
    }

    let diff = store::diff(&baseline.snapshot, &measurement.snapshot, &config.policy);
    info!(
        "{} new, {} deleted, {} changed ({} below thresholds)",
        diff.added.len(),
        diff.removed.len(),
        diff.changed.len(),
        diff.suppressed
    );

    let host = platform::host_name();
    let report = report::assemble(
        &diff,
        &RunContext {
            root: &config.root,
            host: &host,
            policy: &config.policy,
            directory_count: measurement.snapshot.len(),
            total_bytes: measurement.total_bytes,
            skipped: &measurement.skipped,
            started_at,
            finished_at: Local::now(),
        },
    );

    Ok(RunOutcome {
        measurement,
        first_run: false,
        diff: Some(diff),
        report: Some(report),
    })
}

fn summary(outcome: &RunOutcome) -> String {
    let total = normalize(outcome.measurement.total_bytes);
    match &outcome.diff {
        None => format!(
            "baseline created: {} directories, {total}",
            outcome.measurement.snapshot.len()
        ),
        Some(diff) => format!(
            "{} new, {} deleted, {} changed, {total}",
            diff.added.len(),
            diff.removed.len(),
            diff.changed.len()
        ),
    }
}
