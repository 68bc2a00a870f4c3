use camino::Utf8PathBuf;
use pretty_assertions::assert_eq;
use renamefix_types::action::{
    ActionId, ActionMeta, FileRename, Precondition, RefactorAction, RiskLevel, RollbackData,
};
use renamefix_types::conflict::Severity;
use renamefix_types::plan::{OrderStrategy, RefactorPlan};
use renamefix_types::scan::{MatchCategory, ScanResult};

#[test]
fn scan_result_accepts_scanner_camel_case() {
    let doc = serde_json::json!({
        "files": [{
            "filePath": "src/a.ts",
            "fileKind": "typescript",
            "matches": [{
                "category": "class",
                "line": 3,
                "column": 14,
                "originalText": "SeedRamImageService",
                "suggestedFix": "SeedreamImageService",
                "context": "export class SeedRamImageService {",
                "severity": "high",
                "pattern": "seedram-class",
                "extra": "ignored"
            }]
        }]
    });

    let scan: ScanResult = serde_json::from_value(doc).expect("parse scan");
    assert_eq!(scan.files.len(), 1);
    assert_eq!(scan.files[0].file_path, Utf8PathBuf::from("src/a.ts"));
    let m = &scan.files[0].matches[0];
    assert_eq!(m.category, MatchCategory::Class);
    assert_eq!(m.severity, Severity::High);
    assert_eq!(m.length(), 19);
    assert_eq!(scan.total_matches(), 1);
}

#[test]
fn scan_result_defaults_optional_fields() {
    let doc = serde_json::json!({
        "files": [{
            "file_path": "a.ts",
            "matches": [{
                "category": "file",
                "line": 1,
                "column": 1,
                "original_text": "a.ts",
                "suggested_fix": "b.ts"
            }]
        }]
    });

    let scan: ScanResult = serde_json::from_value(doc).expect("parse scan");
    let m = &scan.files[0].matches[0];
    assert!(m.category.is_file_naming());
    assert_eq!(m.severity, Severity::Low);
    assert!(m.context.is_empty());
    assert!(scan.files[0].file_kind.is_empty());
}

#[test]
fn actions_serialize_with_type_tag_and_flat_meta() {
    let action = RefactorAction::FileRename(FileRename {
        meta: ActionMeta {
            id: ActionId::new("rename-0001"),
            priority: 1,
            estimated_risk: RiskLevel::Medium,
            dependencies: vec![],
            preconditions: vec![Precondition::FileExists {
                path: "a.ts".into(),
            }],
            rollback: RollbackData::RestorePath {
                from: "b.ts".into(),
                to: "a.ts".into(),
            },
        },
        old_path: "a.ts".into(),
        new_path: "b.ts".into(),
        update_references: true,
    });

    let v = serde_json::to_value(&action).expect("serialize");
    assert_eq!(v["type"], "file_rename");
    assert_eq!(v["id"], "rename-0001");
    assert_eq!(v["estimated_risk"], "medium");
    assert_eq!(v["preconditions"][0]["type"], "file_exists");
    assert_eq!(v["rollback"]["type"], "restore_path");

    let back: RefactorAction = serde_json::from_value(v).expect("deserialize");
    assert_eq!(back, action);
}

#[test]
fn new_plan_sets_schema_and_is_empty() {
    let plan = RefactorPlan::new(Utf8PathBuf::from("/repo"));
    assert_eq!(plan.schema, renamefix_types::schema::RENAMEFIX_PLAN_V1);
    assert!(plan.is_empty());
    assert!(plan.execution_order.is_empty());
    assert_eq!(plan.metadata.ordering, OrderStrategy::Topological);
    assert!(plan.actions().is_empty());
}
