//! Tests for the scan document loader.

use camino::Utf8PathBuf;
use pretty_assertions::assert_eq;
use renamefix_scan::{ScanLoadError, load_scan, load_scan_reports, merge_scans};
use std::fs;
use tempfile::TempDir;

fn artifacts_path(temp: &TempDir) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(temp.path().join("artifacts")).unwrap()
}

fn create_scan(dir: &Utf8PathBuf, scanner: &str, contents: &str) {
    let scanner_dir = dir.join(scanner);
    fs::create_dir_all(&scanner_dir).unwrap();
    fs::write(scanner_dir.join("scan.json"), contents).unwrap();
}

fn scan_for(path: &str, original: &str, fix: &str) -> String {
    serde_json::json!({
        "files": [{
            "filePath": path,
            "fileKind": "typescript",
            "matches": [{
                "category": "class",
                "line": 1,
                "column": 14,
                "originalText": original,
                "suggestedFix": fix,
                "severity": "high"
            }]
        }]
    })
    .to_string()
}

#[test]
fn missing_artifacts_dir_yields_nothing() {
    let temp = tempfile::tempdir().unwrap();
    let scans = load_scan_reports(&artifacts_path(&temp)).unwrap();
    assert!(scans.is_empty());
}

#[test]
fn every_scanner_directory_is_loaded_in_path_order() {
    let temp = tempfile::tempdir().unwrap();
    let artifacts = artifacts_path(&temp);
    create_scan(&artifacts, "zeta", &scan_for("a.ts", "SeedRam", "Seedream"));
    create_scan(&artifacts, "alpha", &scan_for("b.ts", "SeedRam", "Seedream"));
    create_scan(&artifacts, "renamefix", &scan_for("c.ts", "SeedRam", "Seedream"));

    let scans = load_scan_reports(&artifacts).unwrap();
    let ids: Vec<&str> = scans.iter().map(|s| s.scanner_id.as_str()).collect();
    assert_eq!(ids, vec!["alpha", "renamefix", "zeta"]);
    assert!(scans.iter().all(|s| s.scan.is_ok()));
}

#[test]
fn invalid_json_is_recorded_not_fatal() {
    let temp = tempfile::tempdir().unwrap();
    let artifacts = artifacts_path(&temp);
    create_scan(&artifacts, "broken", "{ not json");
    create_scan(&artifacts, "good", &scan_for("a.ts", "SeedRam", "Seedream"));

    let scans = load_scan_reports(&artifacts).unwrap();
    assert_eq!(scans.len(), 2);
    assert!(matches!(scans[0].scan, Err(ScanLoadError::Json { .. })));

    let merged = merge_scans(&scans);
    assert_eq!(merged.files.len(), 1);
}

#[test]
fn load_scan_io_error_for_missing_file() {
    let temp = tempfile::tempdir().unwrap();
    let path = artifacts_path(&temp).join("nope.json");
    assert!(matches!(load_scan(&path), Err(ScanLoadError::Io { .. })));
}

#[test]
fn merge_concatenates_matches_for_same_file() {
    let temp = tempfile::tempdir().unwrap();
    let artifacts = artifacts_path(&temp);
    create_scan(&artifacts, "one", &scan_for("a.ts", "SeedRam", "Seedream"));
    create_scan(&artifacts, "two", &scan_for("a.ts", "SEEDRAM", "SEEDREAM"));

    let merged = merge_scans(&load_scan_reports(&artifacts).unwrap());
    assert_eq!(merged.files.len(), 1);
    assert_eq!(merged.files[0].matches.len(), 2);
    assert_eq!(merged.files[0].matches[1].original_text, "SEEDRAM");
}
