//! Specifier resolution against the project tree.

use crate::config::AnalysisConfig;
use crate::ports::RepoView;
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};

/// Resolve `specifier`, written in project-relative file `from`, to a project-relative file.
///
/// - `./` and `../` specifiers are relative to `from`'s directory.
/// - `/` specifiers are relative to the project root, or absolute paths under it.
/// - Anything else is a package import and resolves to `None`.
///
/// Results that would leave the project root resolve to `None`.
pub fn resolve_specifier(
    repo: &dyn RepoView,
    analysis: &AnalysisConfig,
    from: &Utf8Path,
    specifier: &str,
) -> Option<Utf8PathBuf> {
    let body = strip_suffix(specifier).0;
    if body.is_empty() {
        return None;
    }

    let joined = if body == "." || body == ".." || body.starts_with("./") || body.starts_with("../")
    {
        from.parent().unwrap_or(Utf8Path::new("")).join(body)
    } else if let Some(stripped) = body.strip_prefix('/') {
        match Utf8Path::new(body).strip_prefix(repo.root()) {
            Ok(under_root) => under_root.to_path_buf(),
            Err(_) => Utf8PathBuf::from(stripped),
        }
    } else {
        return None;
    };

    let base = normalize(&joined)?;
    candidates(&base, analysis)
        .into_iter()
        .find(|c| repo.is_file(c))
}

/// Split `./a.ts?raw#x` into `("./a.ts", "?raw#x")`.
pub fn strip_suffix(specifier: &str) -> (&str, &str) {
    match specifier.find(['?', '#']) {
        Some(i) => specifier.split_at(i),
        None => (specifier, ""),
    }
}

/// Lexically normalize a relative path. `None` if it climbs above its start.
pub fn normalize(path: &Utf8Path) -> Option<Utf8PathBuf> {
    let mut out: Vec<&str> = Vec::new();
    for component in path.components() {
        match component {
            Utf8Component::Normal(seg) => out.push(seg),
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => {
                out.pop()?;
            }
            Utf8Component::RootDir | Utf8Component::Prefix(_) => return None,
        }
    }
    Some(out.into_iter().collect())
}

/// Express a scanner-reported path relative to `root`. `None` if it lies outside.
pub fn relativize(root: &Utf8Path, path: &Utf8Path) -> Option<Utf8PathBuf> {
    if path.is_absolute() {
        normalize(path.strip_prefix(root).ok()?)
    } else {
        normalize(path)
    }
}

fn candidates(base: &Utf8Path, analysis: &AnalysisConfig) -> Vec<Utf8PathBuf> {
    let mut out = Vec::new();
    if !base.as_str().is_empty() {
        out.push(base.to_path_buf());
        for ext in &analysis.extensions {
            out.push(Utf8PathBuf::from(format!("{base}.{ext}")));
        }
    }
    for index in &analysis.index_files {
        for ext in &analysis.extensions {
            out.push(base.join(format!("{index}.{ext}")));
        }
    }
    out
}
