use camino::Utf8PathBuf;
use thiserror::Error;

/// Failures that stop planning outright. Everything else degrades with a warning.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("project root is not accessible: {root}")]
    RootUnavailable { root: Utf8PathBuf },
}
