//! Domain logic: turn scan matches + repo state into an ordered rename plan.
//!
//! This crate owns *what* has to change and in which order. It does not touch the file system
//! beyond reading; applying a plan is the executor's job.

pub mod analyzer;
pub mod config;
mod conflicts;
mod cycles;
mod error;
mod naming;
mod optimize;
mod order;
mod planner;
mod ports;
mod validate;

pub use analyzer::{DependencyAnalyzer, DependencyGraph, FoundReference};
pub use config::{PlannerConfig, load_or_default};
pub use conflicts::{ConflictDetector, syntax_risk};
pub use cycles::find_cycles;
pub use error::PlanError;
pub use naming::Normalizer;
pub use optimize::optimize_plan;
pub use order::execution_order;
pub use planner::{IdGen, Planner, rewrite_specifier, summarize_plan};
pub use ports::{FsRepoView, MemoryRepoView, RepoView};
pub use validate::validate_plan;
