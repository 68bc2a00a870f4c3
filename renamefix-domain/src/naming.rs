//! Deterministic basename normalization.

use crate::config::NamingRule;
use camino::{Utf8Path, Utf8PathBuf};
use regex::{Captures, Regex};
use renamefix_types::scan::ScanMatch;
use tracing::warn;

#[derive(Debug, Clone)]
struct CompiledRule {
    pattern: Regex,
    from: String,
    to: String,
}

/// Applies case-insensitive substring rules to file stems, in order.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    rules: Vec<CompiledRule>,
}

impl Normalizer {
    pub fn new(rules: &[NamingRule]) -> Self {
        let mut normalizer = Self::default();
        for rule in rules {
            normalizer.push(rule);
        }
        normalizer
    }

    /// Rules for one file: stem substitutions taken from its file-naming matches run first, then
    /// the configured rules.
    pub fn for_file(configured: &[NamingRule], matches: &[&ScanMatch]) -> Self {
        let mut normalizer = Self::default();
        for m in matches {
            let from = stem_of(&m.original_text);
            let to = stem_of(&m.suggested_fix);
            if !from.is_empty() && !to.is_empty() && from != to {
                normalizer.push(&NamingRule::new(from, to));
            }
        }
        for rule in configured {
            normalizer.push(rule);
        }
        normalizer
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    fn push(&mut self, rule: &NamingRule) {
        if rule.from.is_empty() {
            warn!(to = %rule.to, "ignoring naming rule with empty `from`");
            return;
        }
        match Regex::new(&format!("(?i){}", regex::escape(&rule.from))) {
            Ok(pattern) => self.rules.push(CompiledRule {
                pattern,
                from: rule.from.clone(),
                to: rule.to.clone(),
            }),
            Err(err) => warn!(from = %rule.from, error = %err, "ignoring invalid naming rule"),
        }
    }

    /// Apply every rule to `text`.
    pub fn apply(&self, text: &str) -> String {
        let mut out = text.to_string();
        for rule in &self.rules {
            out = rule
                .pattern
                .replace_all(&out, |caps: &Captures<'_>| {
                    adapt_case(&caps[0], &rule.from, &rule.to)
                })
                .into_owned();
        }
        out
    }

    /// Normalize the stem of `path`. Directory and extension are kept.
    pub fn normalize_path(&self, path: &Utf8Path) -> Utf8PathBuf {
        let Some(name) = path.file_name() else {
            return path.to_path_buf();
        };
        let (stem, ext) = match (path.file_stem(), path.extension()) {
            (Some(stem), Some(ext)) => (stem, Some(ext)),
            _ => (name, None),
        };

        let new_stem = self.apply(stem);
        let new_name = match ext {
            Some(ext) => format!("{new_stem}.{ext}"),
            None => new_stem,
        };
        path.with_file_name(new_name)
    }
}

fn stem_of(text: &str) -> &str {
    let path = Utf8Path::new(text.trim());
    path.file_stem().unwrap_or("")
}

/// Carry the matched text's case style onto the replacement.
fn adapt_case(matched: &str, from: &str, to: &str) -> String {
    if matched == from {
        return to.to_string();
    }
    let has_letters = matched.chars().any(char::is_alphabetic);
    if has_letters && !matched.chars().any(char::is_lowercase) {
        return to.to_uppercase();
    }
    if matched.chars().next().is_some_and(char::is_uppercase) {
        let mut chars = to.chars();
        return match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
    }
    to.to_string()
}
