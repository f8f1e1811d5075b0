//! # defmend-pipeline
//!
//! The branch-processing core: a per-branch state machine that rebases a
//! contribution branch onto trunk, repairs and canonicalizes the changed
//! records, and republishes the result as a fix branch.
//!
//! Branches share one working tree, so processing is strictly sequential
//! and the orchestrator owns the central resource invariant: the tree is
//! returned to trunk on every exit path. Only a failure to do that is
//! fatal to a run.
//!
//! The `inventory` module is the read-only counterpart: it never checks
//! anything out and is safe to run at any time.

pub mod inventory;
pub mod normalize;
pub mod outcome;
pub mod pipeline;
pub mod summary;

pub use inventory::{InventoryReport, InventoryRow, collect_inventory};
pub use normalize::BranchNaming;
pub use outcome::{BranchOutcome, BranchStatus, FileFix};
pub use pipeline::{Pipeline, PipelineConfig, PipelineError};
pub use summary::{failure_count, render_summary};
