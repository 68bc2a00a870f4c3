use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a plan action, unique within one plan.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(pub String);

impl ActionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Estimated risk of a single action, and of a plan as a whole.
///
/// - low: mechanical edit with no cross-file impact
/// - medium: touches references or structural text
/// - high: likely to break the build without follow-up verification
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn is_high(self) -> bool {
        matches!(self, RiskLevel::High)
    }
}

/// Discriminant of [`RefactorAction`], also the fallback execution priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    FileRename,
    ContentChange,
    ReferenceUpdate,
}

impl ActionKind {
    /// Lower runs earlier.
    pub fn default_priority(self) -> u32 {
        match self {
            ActionKind::FileRename => 1,
            ActionKind::ContentChange => 2,
            ActionKind::ReferenceUpdate => 3,
        }
    }

    pub fn id_prefix(self) -> &'static str {
        match self {
            ActionKind::FileRename => "rename",
            ActionKind::ContentChange => "content",
            ActionKind::ReferenceUpdate => "reference",
        }
    }
}

/// How one file names another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReferenceKind {
    /// `import`/`export ... from`, `require(..)`, dynamic `import(..)`.
    ModuleRef,
    /// A quoted path literal naming a configuration file.
    ConfigRef,
    /// A triple-slash `<reference path=".." />` directive.
    PathRef,
}

/// A single in-place text replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replacement {
    pub line: u32,
    pub column: u32,
    pub length: u32,
    pub original_text: String,
    pub new_text: String,
}

impl Replacement {
    /// Exclusive end column of the replaced range.
    pub fn end_column(&self) -> u32 {
        self.column.saturating_add(self.length)
    }

    /// Two replacements overlap only if they share a line and their
    /// `[column, column + length)` ranges intersect.
    pub fn overlaps(&self, other: &Replacement) -> bool {
        self.line == other.line
            && self.column < other.end_column()
            && other.column < self.end_column()
    }

    /// The replacement that undoes this one.
    pub fn inverse(&self) -> Replacement {
        Replacement {
            line: self.line,
            column: self.column,
            length: self.new_text.chars().count() as u32,
            original_text: self.new_text.clone(),
            new_text: self.original_text.clone(),
        }
    }
}

/// Condition the executor checks immediately before running an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Precondition {
    FileExists { path: Utf8PathBuf },
    FileAbsent { path: Utf8PathBuf },
}

/// Data needed to undo an action after it ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RollbackData {
    RestorePath {
        from: Utf8PathBuf,
        to: Utf8PathBuf,
    },
    RevertReplacements {
        replacements: Vec<Replacement>,
    },
    RestoreReference {
        file_path: Utf8PathBuf,
        from: String,
        to: String,
    },
}

/// Fields every action variant carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionMeta {
    pub id: ActionId,
    pub priority: u32,
    pub estimated_risk: RiskLevel,

    #[serde(default)]
    pub dependencies: Vec<ActionId>,

    #[serde(default)]
    pub preconditions: Vec<Precondition>,

    pub rollback: RollbackData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRename {
    #[serde(flatten)]
    pub meta: ActionMeta,
    pub old_path: Utf8PathBuf,
    pub new_path: Utf8PathBuf,
    pub update_references: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentChange {
    #[serde(flatten)]
    pub meta: ActionMeta,
    pub file_path: Utf8PathBuf,
    pub replacements: Vec<Replacement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceUpdate {
    #[serde(flatten)]
    pub meta: ActionMeta,
    /// File whose reference text is rewritten.
    pub file_path: Utf8PathBuf,
    /// Project-relative path the reference resolved to before the rename.
    pub old_reference: Utf8PathBuf,
    /// Project-relative path the reference must resolve to afterwards.
    pub new_reference: Utf8PathBuf,
    pub reference_kind: ReferenceKind,
    /// Literal specifier as written, e.g. `./a.ts`.
    pub old_specifier: String,
    /// Literal specifier to write, e.g. `./seedream-image-service.ts`.
    pub new_specifier: String,
    /// 1-based line of the first occurrence.
    pub line: u32,
}

/// A single atomic plan action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RefactorAction {
    FileRename(FileRename),
    ContentChange(ContentChange),
    ReferenceUpdate(ReferenceUpdate),
}

impl RefactorAction {
    pub fn meta(&self) -> &ActionMeta {
        match self {
            RefactorAction::FileRename(a) => &a.meta,
            RefactorAction::ContentChange(a) => &a.meta,
            RefactorAction::ReferenceUpdate(a) => &a.meta,
        }
    }

    pub fn meta_mut(&mut self) -> &mut ActionMeta {
        match self {
            RefactorAction::FileRename(a) => &mut a.meta,
            RefactorAction::ContentChange(a) => &mut a.meta,
            RefactorAction::ReferenceUpdate(a) => &mut a.meta,
        }
    }

    pub fn id(&self) -> &ActionId {
        &self.meta().id
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            RefactorAction::FileRename(_) => ActionKind::FileRename,
            RefactorAction::ContentChange(_) => ActionKind::ContentChange,
            RefactorAction::ReferenceUpdate(_) => ActionKind::ReferenceUpdate,
        }
    }

    /// The file this action operates on when it runs. For renames, the source.
    pub fn target_path(&self) -> &Utf8Path {
        match self {
            RefactorAction::FileRename(a) => &a.old_path,
            RefactorAction::ContentChange(a) => &a.file_path,
            RefactorAction::ReferenceUpdate(a) => &a.file_path,
        }
    }
}

impl From<FileRename> for RefactorAction {
    fn from(a: FileRename) -> Self {
        RefactorAction::FileRename(a)
    }
}

impl From<ContentChange> for RefactorAction {
    fn from(a: ContentChange) -> Self {
        RefactorAction::ContentChange(a)
    }
}

impl From<ReferenceUpdate> for RefactorAction {
    fn from(a: ReferenceUpdate) -> Self {
        RefactorAction::ReferenceUpdate(a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rep(line: u32, column: u32, original: &str, new: &str) -> Replacement {
        Replacement {
            line,
            column,
            length: original.chars().count() as u32,
            original_text: original.to_string(),
            new_text: new.to_string(),
        }
    }

    #[test]
    fn overlap_requires_same_line_and_intersecting_ranges() {
        let a = rep(3, 10, "SeedRam", "Seedream");
        assert!(a.overlaps(&rep(3, 16, "mImage", "x")));
        assert!(!a.overlaps(&rep(3, 17, "Image", "x")));
        assert!(!a.overlaps(&rep(4, 10, "SeedRam", "x")));
    }

    #[test]
    fn inverse_swaps_text_and_length() {
        let a = rep(1, 1, "ab", "abcd");
        let inv = a.inverse();
        assert_eq!(inv.length, 4);
        assert_eq!(inv.original_text, "abcd");
        assert_eq!(inv.new_text, "ab");
    }

    #[test]
    fn fallback_priority_orders_renames_first() {
        assert!(
            ActionKind::FileRename.default_priority() < ActionKind::ContentChange.default_priority()
        );
        assert!(
            ActionKind::ContentChange.default_priority()
                < ActionKind::ReferenceUpdate.default_priority()
        );
    }
}
