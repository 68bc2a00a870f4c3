//! Lexical extraction of module-reference statements.

use crate::config::AnalysisConfig;
use camino::Utf8Path;
use once_cell::sync::Lazy;
use regex::Regex;
use renamefix_types::action::ReferenceKind;
use std::ops::Range;

/// `import .. from 'x'`, `import 'x'`, `export * from 'x'`, `export { a } from 'x'`.
static STATIC_REF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"\b(?:import|export)\s+(?:type\s+)?(?:[\w*${}\s,]+?\s+from\s+)?['"]([^'"\n]+)['"]"#,
    )
    .expect("static reference pattern")
});

/// `require('x')` and dynamic `import('x')`.
static CALL_REF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\b(?:require|import)\s*\(\s*['"]([^'"\n]+)['"]\s*\)"#)
        .expect("call reference pattern")
});

/// `/// <reference path="x" />`
static DIRECTIVE_REF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^[ \t]*///[ \t]*<reference\s+path\s*=\s*['"]([^'"\n]+)['"]"#)
        .expect("directive reference pattern")
});

/// Any quoted literal that looks like a relative or root-relative path.
static PATH_LITERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"['"`]((?:\.{1,2})?/[^'"`\s]+)['"`]"#).expect("path literal pattern")
});

/// A reference as written in the source, before resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawReference {
    pub specifier: String,
    pub kind: ReferenceKind,
    /// 1-based.
    pub line: u32,
}

/// Extract every reference in `text`, in source order.
///
/// Path literals only count when they name a configuration file and are not already part of a
/// module reference.
pub fn extract_references(text: &str, analysis: &AnalysisConfig) -> Vec<RawReference> {
    let mut found: Vec<(usize, RawReference)> = Vec::new();
    let mut claimed: Vec<Range<usize>> = Vec::new();

    let module_patterns: [(&Regex, ReferenceKind); 3] = [
        (&*STATIC_REF, ReferenceKind::ModuleRef),
        (&*CALL_REF, ReferenceKind::ModuleRef),
        (&*DIRECTIVE_REF, ReferenceKind::PathRef),
    ];

    for (re, kind) in module_patterns {
        for caps in re.captures_iter(text) {
            let Some(m) = caps.get(1) else { continue };
            // First pattern to capture a span owns it.
            if claimed.iter().any(|r| r.contains(&m.start())) {
                continue;
            }
            claimed.push(m.range());
            found.push((m.start(), raw(text, m.start(), m.as_str(), kind)));
        }
    }

    for caps in PATH_LITERAL.captures_iter(text) {
        let Some(m) = caps.get(1) else { continue };
        if claimed.iter().any(|r| r.contains(&m.start())) {
            continue;
        }
        if !analysis.is_config_file(Utf8Path::new(m.as_str())) {
            continue;
        }
        found.push((
            m.start(),
            raw(text, m.start(), m.as_str(), ReferenceKind::ConfigRef),
        ));
    }

    found.sort_by_key(|(offset, _)| *offset);
    found.into_iter().map(|(_, r)| r).collect()
}

fn raw(text: &str, offset: usize, specifier: &str, kind: ReferenceKind) -> RawReference {
    RawReference {
        specifier: specifier.to_string(),
        kind,
        line: line_at(text, offset),
    }
}

fn line_at(text: &str, offset: usize) -> u32 {
    let newlines = text.as_bytes()[..offset]
        .iter()
        .filter(|b| **b == b'\n')
        .count();
    newlines as u32 + 1
}
