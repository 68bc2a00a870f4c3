use crate::config::AnalysisConfig;
use crate::error::PlanError;
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use std::collections::BTreeMap;
use tracing::debug;
use walkdir::WalkDir;

/// Read-only project access.
///
/// The dependency analyzer and planner only see the project through this trait. The external file
/// walker plugs in by implementing [`RepoView::source_files`].
pub trait RepoView {
    fn root(&self) -> &Utf8Path;

    /// Fails only when the project root itself is unusable.
    fn check_root(&self) -> anyhow::Result<()> {
        Ok(())
    }

    fn read_to_string(&self, rel: &Utf8Path) -> anyhow::Result<String>;

    fn is_file(&self, rel: &Utf8Path) -> bool;

    /// Project-relative paths of every candidate source file, sorted.
    fn source_files(&self, analysis: &AnalysisConfig) -> anyhow::Result<Vec<Utf8PathBuf>>;
}

/// File-system backed `RepoView`.
#[derive(Debug, Clone)]
pub struct FsRepoView {
    root: Utf8PathBuf,
}

impl FsRepoView {
    pub fn new(root: Utf8PathBuf) -> Self {
        Self { root }
    }

    fn abs(&self, rel: &Utf8Path) -> Utf8PathBuf {
        if rel.is_absolute() {
            rel.to_path_buf()
        } else {
            self.root.join(rel)
        }
    }
}

impl RepoView for FsRepoView {
    fn root(&self) -> &Utf8Path {
        &self.root
    }

    fn check_root(&self) -> anyhow::Result<()> {
        if self.root.is_dir() {
            Ok(())
        } else {
            Err(PlanError::RootUnavailable {
                root: self.root.clone(),
            }
            .into())
        }
    }

    fn read_to_string(&self, rel: &Utf8Path) -> anyhow::Result<String> {
        let abs = self.abs(rel);
        fs::read_to_string(&abs).with_context(|| format!("read {}", abs))
    }

    fn is_file(&self, rel: &Utf8Path) -> bool {
        self.abs(rel).is_file()
    }

    fn source_files(&self, analysis: &AnalysisConfig) -> anyhow::Result<Vec<Utf8PathBuf>> {
        self.check_root()?;

        // Prune excluded directories instead of filtering their contents.
        let walker = WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0
                    || !entry.file_type().is_dir()
                    || entry
                        .file_name()
                        .to_str()
                        .is_none_or(|name| !analysis.is_excluded_dir(name))
            });

        let mut out = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(err) => {
                    debug!(error = %err, "skipping unreadable directory entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(path) = Utf8Path::from_path(entry.path()) else {
                continue;
            };
            let Ok(rel) = path.strip_prefix(&self.root) else {
                continue;
            };
            if analysis.is_source_file(rel) {
                out.push(rel.to_path_buf());
            }
        }

        out.sort();
        debug!(root = %self.root, files = out.len(), "enumerated project files");
        Ok(out)
    }
}

/// In-memory `RepoView`, for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepoView {
    root: Utf8PathBuf,
    files: BTreeMap<Utf8PathBuf, String>,
}

impl MemoryRepoView {
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self {
            root: root.into(),
            files: BTreeMap::new(),
        }
    }

    pub fn with_file(mut self, rel: impl Into<Utf8PathBuf>, contents: impl Into<String>) -> Self {
        self.insert(rel, contents);
        self
    }

    pub fn insert(&mut self, rel: impl Into<Utf8PathBuf>, contents: impl Into<String>) {
        self.files.insert(rel.into(), contents.into());
    }
}

impl RepoView for MemoryRepoView {
    fn root(&self) -> &Utf8Path {
        &self.root
    }

    fn read_to_string(&self, rel: &Utf8Path) -> anyhow::Result<String> {
        self.files
            .get(rel)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("read {}: no such file", rel))
    }

    fn is_file(&self, rel: &Utf8Path) -> bool {
        self.files.contains_key(rel)
    }

    fn source_files(&self, analysis: &AnalysisConfig) -> anyhow::Result<Vec<Utf8PathBuf>> {
        Ok(self
            .files
            .keys()
            .filter(|p| analysis.is_source_file(p))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fs_repo_lists_sources_and_skips_excluded_dirs() {
        let temp = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
        fs::create_dir_all(root.join("src")).unwrap();
        fs::create_dir_all(root.join("node_modules/dep")).unwrap();
        fs::write(root.join("src/a.ts"), "export const a = 1;").unwrap();
        fs::write(root.join("src/notes.md"), "# notes").unwrap();
        fs::write(root.join("config.json"), "{}").unwrap();
        fs::write(root.join("node_modules/dep/index.js"), "").unwrap();

        let repo = FsRepoView::new(root);
        let files = repo.source_files(&AnalysisConfig::default()).unwrap();
        assert_eq!(
            files,
            vec![Utf8PathBuf::from("config.json"), Utf8PathBuf::from("src/a.ts")]
        );
    }

    #[test]
    fn fs_repo_prunes_excluded_trees() {
        let temp = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
        for i in 0..50 {
            let dir = root.join(format!("node_modules/pkg{i}/lib"));
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join("index.js"), "").unwrap();
        }
        fs::create_dir_all(root.join("src/dist")).unwrap();
        fs::create_dir_all(root.join("src/app")).unwrap();
        fs::write(root.join("src/dist/bundle.js"), "").unwrap();
        fs::write(root.join("src/app/main.ts"), "").unwrap();
        fs::write(root.join(".env"), "").unwrap();

        let repo = FsRepoView::new(root);
        let files = repo.source_files(&AnalysisConfig::default()).unwrap();
        assert_eq!(
            files,
            vec![Utf8PathBuf::from(".env"), Utf8PathBuf::from("src/app/main.ts")]
        );

        let analysis = AnalysisConfig::default();
        assert!(analysis.is_excluded_dir("node_modules"));
        assert!(!analysis.is_excluded_dir("src"));
    }

    #[test]
    fn fs_repo_missing_root_is_an_error() {
        let temp = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(temp.path().join("missing")).unwrap();
        let repo = FsRepoView::new(root);
        assert!(repo.check_root().is_err());
        assert!(repo.source_files(&AnalysisConfig::default()).is_err());
    }

    #[test]
    fn memory_repo_filters_by_extension() {
        let repo = MemoryRepoView::new("/repo")
            .with_file("a.ts", "")
            .with_file("README.md", "");
        let files = repo.source_files(&AnalysisConfig::default()).unwrap();
        assert_eq!(files, vec![Utf8PathBuf::from("a.ts")]);
        assert!(repo.is_file(Utf8Path::new("README.md")));
        assert!(repo.read_to_string(Utf8Path::new("missing.ts")).is_err());
    }
}
