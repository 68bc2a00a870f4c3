use crate::conflict::Severity;
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// Output of the external naming-violation scanner.
///
/// renamefix is *tolerant* when reading scan documents:
/// - Unknown fields are ignored.
/// - Optional fields may be absent.
/// - Both `snake_case` and the scanner's `camelCase` field names are accepted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanResult {
    #[serde(default)]
    pub files: Vec<ScannedFile>,
}

impl ScanResult {
    pub fn total_matches(&self) -> usize {
        self.files.iter().map(|f| f.matches.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_matches() == 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannedFile {
    /// Absolute or project-relative path of the scanned file.
    #[serde(alias = "filePath")]
    pub file_path: Utf8PathBuf,

    /// Scanner-reported file kind (e.g. "typescript", "config").
    #[serde(default, alias = "fileKind")]
    pub file_kind: String,

    #[serde(default)]
    pub matches: Vec<ScanMatch>,
}

/// One located naming violation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanMatch {
    pub category: MatchCategory,

    pub line: u32,

    pub column: u32,

    #[serde(alias = "originalText")]
    pub original_text: String,

    #[serde(alias = "suggestedFix")]
    pub suggested_fix: String,

    #[serde(default)]
    pub context: String,

    #[serde(default)]
    pub severity: Severity,

    /// Identifier of the scanner pattern that produced this match.
    #[serde(default)]
    pub pattern: String,
}

impl ScanMatch {
    /// Length of the offending text in characters.
    pub fn length(&self) -> u32 {
        self.original_text.chars().count() as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchCategory {
    Environment,
    Config,
    Display,
    File,
    Class,
    Variable,
    Api,
    Database,
}

impl MatchCategory {
    /// File-naming violations turn into renames; everything else is an in-place text edit.
    pub fn is_file_naming(self) -> bool {
        matches!(self, MatchCategory::File)
    }
}
