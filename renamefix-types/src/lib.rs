//! Shared DTOs (schemas-as-code) for the renamefix workspace.
//!
//! # Design constraints
//! - Scan documents come from an external scanner and are read tolerantly.
//! - Plans are intended to be serialized by an external persistence layer.
//! - Prefer adding optional fields over changing semantics.

pub mod action;
pub mod conflict;
pub mod plan;
pub mod scan;
pub mod validation;

/// Schema identifiers.
pub mod schema {
    pub const RENAMEFIX_PLAN_V1: &str = "renamefix.plan.v1";
}
