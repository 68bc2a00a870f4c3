//! Scan document ingestion.
//!
//! renamefix consumes the output of an external naming-violation scanner. It does not enforce strict
//! schema validation here; it is tolerant so a plan can still be built when a scan document carries
//! extra fields or omits optional ones.

mod load;

pub use load::{LoadedScan, ScanLoadError, load_scan, load_scan_reports, merge_scans};
