use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use glob::glob;
use renamefix_types::scan::{ScanResult, ScannedFile};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct LoadedScan {
    pub path: Utf8PathBuf,
    /// Directory name under artifacts/... (best effort).
    pub scanner_id: String,
    pub scan: Result<ScanResult, ScanLoadError>,
}

#[derive(Debug, Error, Clone)]
pub enum ScanLoadError {
    #[error("io error: {message}")]
    Io { message: String },

    #[error("json parse error: {message}")]
    Json { message: String },
}

/// Read a single scan document.
pub fn load_scan(path: &Utf8Path) -> Result<ScanResult, ScanLoadError> {
    let contents = fs::read_to_string(path).map_err(|e| ScanLoadError::Io {
        message: e.to_string(),
    })?;
    serde_json::from_str::<ScanResult>(&contents).map_err(|e| ScanLoadError::Json {
        message: e.to_string(),
    })
}

/// Load every `artifacts_dir/*/scan.json`. Documents that fail to load are kept with their error.
pub fn load_scan_reports(artifacts_dir: &Utf8Path) -> anyhow::Result<Vec<LoadedScan>> {
    let pattern = artifacts_dir.join("*/scan.json");
    let pattern_str = pattern.as_str();

    debug!(pattern = %pattern_str, "scanning artifacts for scan documents");

    let mut out = Vec::new();
    for entry in glob(pattern_str).context("glob artifacts/*/scan.json")? {
        let path = entry
            .map_err(|e| anyhow::anyhow!("glob error: {e}"))?
            .to_string_lossy()
            .to_string();

        let utf8_path = Utf8PathBuf::from(path);
        let scanner_id = utf8_path
            .parent()
            .and_then(|p| p.file_name())
            .unwrap_or("unknown")
            .to_string();

        let scan = load_scan(&utf8_path);
        if let Err(err) = &scan {
            warn!(path = %utf8_path, error = %err, "scan document could not be loaded");
        }

        out.push(LoadedScan {
            path: utf8_path,
            scanner_id,
            scan,
        });
    }

    // Deterministic order matters.
    out.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(out)
}

/// Fold successfully loaded documents into one scan. Matches reported for the same file by
/// several documents are concatenated; files keep first-seen order.
pub fn merge_scans(loaded: &[LoadedScan]) -> ScanResult {
    let mut files: Vec<ScannedFile> = Vec::new();
    let mut index: BTreeMap<Utf8PathBuf, usize> = BTreeMap::new();

    for doc in loaded {
        let Ok(scan) = &doc.scan else {
            continue;
        };
        for file in &scan.files {
            match index.get(&file.file_path) {
                Some(&i) => files[i].matches.extend(file.matches.iter().cloned()),
                None => {
                    index.insert(file.file_path.clone(), files.len());
                    files.push(file.clone());
                }
            }
        }
    }

    ScanResult { files }
}
