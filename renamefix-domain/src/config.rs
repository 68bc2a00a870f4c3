//! Planner configuration.
//!
//! Discovers and loads `renamefix.toml` from the project root. Every section is optional and
//! falls back to defaults tuned for TypeScript/JavaScript projects.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use glob::Pattern;
use serde::Deserialize;
use tracing::{debug, warn};

/// The config file name to search for.
pub const CONFIG_FILE_NAME: &str = "renamefix.toml";

/// Top-level configuration from renamefix.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Reference extraction and resolution.
    pub analysis: AnalysisConfig,

    /// Basename normalization rules.
    pub naming: NamingConfig,

    /// Thresholds for conflicts, risk and suggestions.
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Extensions tried, in order, when a reference omits one (no leading dot).
    pub extensions: Vec<String>,

    /// Stems tried inside a directory when a reference names the directory.
    pub index_files: Vec<String>,

    /// Extensions of files treated as configuration.
    pub config_extensions: Vec<String>,

    /// Directory names never descended into.
    pub exclude_dirs: Vec<String>,

    /// Extra glob patterns (project-relative) excluded from analysis.
    pub exclude: Vec<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            extensions: ["ts", "tsx", "js", "jsx", "mjs", "cjs", "json"]
                .map(String::from)
                .to_vec(),
            index_files: vec!["index".to_string()],
            config_extensions: ["json", "yaml", "yml", "toml", "env"]
                .map(String::from)
                .to_vec(),
            exclude_dirs: ["node_modules", ".git", "dist", "build", "coverage"]
                .map(String::from)
                .to_vec(),
            exclude: Vec::new(),
        }
    }
}

impl AnalysisConfig {
    /// True for files the analyzer reads: code with a resolution extension, or configuration.
    pub fn is_source_file(&self, rel: &Utf8Path) -> bool {
        if self.is_excluded(rel) {
            return false;
        }
        let code = rel
            .extension()
            .is_some_and(|ext| self.extensions.iter().any(|e| e == ext));
        code || self.is_config_file(rel)
    }

    pub fn is_config_file(&self, rel: &Utf8Path) -> bool {
        let Some(name) = rel.file_name() else {
            return false;
        };
        // `.env` and `.env.local` have no extension in the usual sense.
        if self.config_extensions.iter().any(|e| e == "env")
            && (name == ".env" || name.starts_with(".env."))
        {
            return true;
        }
        rel.extension()
            .is_some_and(|ext| self.config_extensions.iter().any(|e| e == ext))
    }

    /// True for directory names the file walker never descends into.
    pub fn is_excluded_dir(&self, name: &str) -> bool {
        self.exclude_dirs.iter().any(|d| d == name)
    }

    pub fn is_excluded(&self, rel: &Utf8Path) -> bool {
        if rel.components().any(|c| self.is_excluded_dir(c.as_str())) {
            return true;
        }
        self.exclude.iter().any(|pat| match Pattern::new(pat) {
            Ok(p) => p.matches(rel.as_str()),
            Err(err) => {
                warn!(pattern = %pat, error = %err, "ignoring invalid exclude pattern");
                false
            }
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    /// Case-insensitive substring substitutions applied to file basenames.
    pub rules: Vec<NamingRule>,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            rules: vec![
                NamingRule::new("seed-ram", "seedream"),
                NamingRule::new("seed_ram", "seedream"),
                NamingRule::new("seedram", "seedream"),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NamingRule {
    pub from: String,
    pub to: String,
}

impl NamingRule {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Longest new path accepted without a path-length conflict.
    pub max_path_len: usize,

    /// Action count above which validation suggests batching.
    pub batch_threshold: usize,

    /// Action count above which the plan requires testing.
    pub testing_threshold: usize,

    /// Action count above which the plan is at least medium risk.
    pub risky_plan_actions: usize,

    /// Conflict count above which the plan is at least medium risk.
    pub conflict_threshold: usize,

    /// High-risk action count above which the plan is high risk.
    pub high_risk_action_limit: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_path_len: 260,
            batch_threshold: 50,
            testing_threshold: 10,
            risky_plan_actions: 20,
            conflict_threshold: 3,
            high_risk_action_limit: 5,
        }
    }
}

/// Discover the renamefix.toml config file.
///
/// Returns `None` if no config file is found in the project root.
pub fn discover_config(root: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = root.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

/// Load and parse a renamefix.toml config file.
pub fn load_config(path: &Utf8Path) -> anyhow::Result<PlannerConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

/// Parse a config file from a string.
pub fn parse_config(contents: &str) -> anyhow::Result<PlannerConfig> {
    let config: PlannerConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// Load config from the project root, or return defaults if absent.
pub fn load_or_default(root: &Utf8Path) -> anyhow::Result<PlannerConfig> {
    match discover_config(root) {
        Some(path) => load_config(&path),
        None => Ok(PlannerConfig::default()),
    }
}
