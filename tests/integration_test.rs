use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use sizewatch::config::Config;
use sizewatch::monitor;
use sizewatch::notify::NullNotifier;
use sizewatch::report::{self, CHANGED_TITLE, DELETED_TITLE, NEW_TITLE};
use sizewatch::scan::cancel::CancelToken;
use sizewatch::store::{SnapshotStore, ThresholdPolicy};
use tempfile::TempDir;

/// ```text
/// root/
///   docs/        (10 KiB file)
///   media/
///     photos/    (64 KiB file)
///   tmp/         (1 KiB file)
/// ```
fn build_tree(root: &Path) {
    fs::create_dir_all(root.join("docs")).unwrap();
    fs::create_dir_all(root.join("media/photos")).unwrap();
    fs::create_dir_all(root.join("tmp")).unwrap();
    write_bytes(&root.join("docs/notes.txt"), 10 * 1024);
    write_bytes(&root.join("media/photos/img.raw"), 64 * 1024);
    write_bytes(&root.join("tmp/scratch"), 1024);
}

fn write_bytes(path: &Path, n: usize) {
    let mut f = fs::File::create(path).unwrap();
    f.write_all(&vec![0u8; n]).unwrap();
}

fn config(root: &Path, state: PathBuf, policy: ThresholdPolicy) -> Config {
    Config {
        root: root.to_path_buf(),
        policy,
        state_file: state,
        parallel: true,
        json_output: false,
        output: None,
    }
}

fn lines(rendered: &report::Report, title: &str) -> Vec<String> {
    rendered
        .group(title)
        .map(|g| g.lines.iter().map(|l| l.to_string()).collect())
        .unwrap_or_default()
}

#[test]
fn full_lifecycle_reports_changes_above_thresholds() {
    let watched = TempDir::new().unwrap();
    let state_dir = TempDir::new().unwrap();
    build_tree(watched.path());

    // tmp's one-byte growth stays under the 4 KiB byte threshold
    let policy = ThresholdPolicy::new(50.0, 4096).unwrap();
    let cfg = config(watched.path(), state_dir.path().join("baseline.json"), policy);

    let first = monitor::run(&cfg, &NullNotifier, &CancelToken::new()).unwrap();
    assert!(first.first_run);
    assert!(first.report.is_none());

    write_bytes(&watched.path().join("docs/big.bin"), 256 * 1024);
    write_bytes(&watched.path().join("tmp/one"), 1);
    fs::remove_file(watched.path().join("media/photos/img.raw")).unwrap();
    fs::remove_dir(watched.path().join("media/photos")).unwrap();
    fs::create_dir(watched.path().join("new_dir")).unwrap();

    let second = monitor::run(&cfg, &NullNotifier, &CancelToken::new()).unwrap();
    assert!(!second.first_run);
    let second_report = second.report.unwrap();

    let deleted = lines(&second_report, DELETED_TITLE);
    assert_eq!(deleted.len(), 1);
    assert!(deleted[0].ends_with("./media/photos"), "{deleted:?}");

    let added = lines(&second_report, NEW_TITLE);
    assert_eq!(added.len(), 1);
    assert!(added[0].ends_with("./new_dir"), "{added:?}");

    // media shrank by ~64 KiB (well over 50%), docs grew ~256 KiB, tmp is noise
    let changed = lines(&second_report, CHANGED_TITLE);
    let changed_paths: Vec<&str> = changed.iter().filter_map(|l| l.rsplit("./").next()).collect();
    assert_eq!(changed_paths, vec!["docs", "media"], "{changed:?}");

    let diff = second.diff.unwrap();
    assert!(diff.suppressed >= 1);

    let text = report::text::render(&second_report);
    assert!(text.contains("THRESHOLD VALUES"));
    assert!(text.contains("STATISTICS"));
}

#[test]
fn unchanged_tree_reports_nothing() {
    let watched = TempDir::new().unwrap();
    let state_dir = TempDir::new().unwrap();
    build_tree(watched.path());
    let cfg = config(watched.path(), state_dir.path().join("b.json"), ThresholdPolicy::default());

    monitor::run(&cfg, &NullNotifier, &CancelToken::new()).unwrap();
    let outcome = monitor::run(&cfg, &NullNotifier, &CancelToken::new()).unwrap();

    assert!(outcome.diff.unwrap().is_empty());
    let text = report::text::render(&outcome.report.unwrap());
    assert!(!text.contains("NEW DIRECTORIES"));
    assert!(!text.contains("DELETED DIRECTORIES"));
    assert!(!text.contains("CHANGED DIRECTORIES"));
}

#[test]
fn baseline_always_reflects_latest_measurement() {
    let watched = TempDir::new().unwrap();
    let state_dir = TempDir::new().unwrap();
    build_tree(watched.path());
    let state = state_dir.path().join("b.json");
    let cfg = config(watched.path(), state.clone(), ThresholdPolicy::default());

    let first = monitor::run(&cfg, &NullNotifier, &CancelToken::new()).unwrap();
    let stored = SnapshotStore::new(&state, watched.path()).load();
    assert!(stored.existed);
    assert_eq!(stored.snapshot, first.measurement.snapshot);

    fs::create_dir(watched.path().join("later")).unwrap();
    let second = monitor::run(&cfg, &NullNotifier, &CancelToken::new()).unwrap();
    let stored = SnapshotStore::new(&state, watched.path()).load();
    assert_eq!(stored.snapshot, second.measurement.snapshot);
}

#[test]
fn corrupt_baseline_counts_as_first_run() {
    let watched = TempDir::new().unwrap();
    let state_dir = TempDir::new().unwrap();
    build_tree(watched.path());
    let state = state_dir.path().join("b.json");
    fs::write(&state, b"not json at all").unwrap();

    let cfg = config(watched.path(), state.clone(), ThresholdPolicy::default());
    let outcome = monitor::run(&cfg, &NullNotifier, &CancelToken::new()).unwrap();
    assert!(outcome.first_run);
    assert!(SnapshotStore::new(&state, watched.path()).load().existed);
}

#[test]
fn json_report_parses() {
    let watched = TempDir::new().unwrap();
    let state_dir = TempDir::new().unwrap();
    build_tree(watched.path());
    let cfg = config(watched.path(), state_dir.path().join("b.json"), ThresholdPolicy::default());

    monitor::run(&cfg, &NullNotifier, &CancelToken::new()).unwrap();
    fs::create_dir(watched.path().join("added")).unwrap();
    let outcome = monitor::run(&cfg, &NullNotifier, &CancelToken::new()).unwrap();

    let json = report::json::render(&outcome.report.unwrap()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let new_group = value["groups"]
        .as_array()
        .unwrap()
        .iter()
        .find(|g| g["title"] == NEW_TITLE)
        .unwrap();
    assert_eq!(new_group["lines"][0]["path"], "added");
    assert_eq!(new_group["lines"][0]["kind"], "size");
}
