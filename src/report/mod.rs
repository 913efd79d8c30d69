//! Turns a classified diff into titled line groups.
//!
//! Nothing here prints or sends anything: a [`Report`] is plain data, handed
//! to a renderer ([`text`], [`json`]) or whatever delivers it.

pub mod json;
pub mod text;

use std::fmt;
use std::path::Path;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::scan::Skipped;
use crate::store::diff::{DirectoryDelta, SnapshotDiff, ThresholdPolicy};
use crate::units::{normalize, UnitSize};

pub const DELETED_TITLE: &str = "Deleted directories";
pub const NEW_TITLE: &str = "New directories";
pub const CHANGED_TITLE: &str = "Changed directories";
pub const THRESHOLD_TITLE: &str = "Threshold Values";
pub const SKIPPED_TITLE: &str = "Skipped paths";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportLine {
    /// a new or deleted directory and its size
    Size { path: String, size: UnitSize },
    /// a changed directory; `delta` carries the sign
    Change {
        path: String,
        percent: Option<f64>,
        delta: UnitSize,
    },
    Text { text: String },
}

impl ReportLine {
    fn text(text: impl Into<String>) -> Self {
        ReportLine::Text { text: text.into() }
    }
}

impl fmt::Display for ReportLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportLine::Size { path, size } => {
                write!(f, " {:8.2} {}   ./{}", size.magnitude, size.unit, path)
            }
            ReportLine::Change { path, percent, delta } => {
                let magnitude = if delta.is_negative() { -delta.magnitude } else { delta.magnitude };
                match percent {
                    Some(pct) => write!(f, " {pct:8.2} % {magnitude:8.1} {}   ./{path}", delta.unit),
                    None => write!(f, " {:>8} % {magnitude:8.1} {}   ./{path}", "n/a", delta.unit),
                }
            }
            ReportLine::Text { text } => f.write_str(text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineGroup {
    pub title: String,
    pub lines: Vec<ReportLine>,
}

impl LineGroup {
    fn new(title: impl Into<String>, lines: Vec<ReportLine>) -> Self {
        LineGroup { title: title.into(), lines }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub header: String,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
    pub groups: Vec<LineGroup>,
}

impl Report {
    pub fn group(&self, title: &str) -> Option<&LineGroup> {
        self.groups.iter().find(|g| g.title == title)
    }
}

/// Everything about the run a report needs besides the diff itself.
pub struct RunContext<'a> {
    pub root: &'a Path,
    pub host: &'a str,
    pub policy: &'a ThresholdPolicy,
    pub directory_count: usize,
    pub total_bytes: u64,
    pub skipped: &'a [Skipped],
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
}

pub fn assemble(diff: &SnapshotDiff, ctx: &RunContext<'_>) -> Report {
    let size_line = |delta: &DirectoryDelta, bytes: u64| ReportLine::Size {
        path: relative(ctx.root, &delta.path),
        size: normalize(bytes),
    };

    let deleted = diff
        .removed
        .iter()
        .map(|d| size_line(d, d.previous.unwrap_or(0)))
        .collect();

    let added = diff
        .added
        .iter()
        .map(|d| size_line(d, d.current.unwrap_or(0)))
        .collect();

    let changed = diff
        .changed
        .iter()
        .map(|d| ReportLine::Change {
            path: relative(ctx.root, &d.path),
            percent: d.percent,
            delta: normalize(d.delta),
        })
        .collect();

    let mut groups = vec![
        LineGroup::new(DELETED_TITLE, deleted),
        LineGroup::new(NEW_TITLE, added),
        LineGroup::new(CHANGED_TITLE, changed),
    ];

    if !ctx.policy.is_default() {
        groups.push(threshold_group(ctx.policy));
    }

    let total = normalize(ctx.total_bytes);
    groups.push(LineGroup::new(
        format!("{} Statistics", ctx.root.display()),
        vec![
            ReportLine::text(format!("{:8} directories", ctx.directory_count)),
            ReportLine::text(format!("{:8.2} {}", total.magnitude, total.unit)),
        ],
    ));

    groups.push(LineGroup::new(
        SKIPPED_TITLE,
        ctx.skipped
            .iter()
            .map(|s| ReportLine::text(format!(" {}: {}", s.path.display(), s.reason)))
            .collect(),
    ));

    Report {
        header: format!("Changes in size of directories for {} on {}", ctx.root.display(), ctx.host),
        started_at: ctx.started_at,
        finished_at: ctx.finished_at,
        groups,
    }
}

fn threshold_group(policy: &ThresholdPolicy) -> LineGroup {
    let size = normalize(policy.absolute_byte_threshold);
    LineGroup::new(
        THRESHOLD_TITLE,
        vec![
            ReportLine::text(
                "The directories whose size differences are less than any of these values are ignored:",
            ),
            ReportLine::text(""),
            ReportLine::text(format!("Percentage: {:6} %", policy.percent_threshold)),
            ReportLine::text(format!("Size:       {:6.2} {}", size.magnitude, size.unit)),
        ],
    )
}

fn relative(root: &Path, path: &str) -> String {
    Path::new(path)
        .strip_prefix(root)
        .map(|rel| rel.display().to_string())
        .unwrap_or_else(|_| path.to_string())
}
