//! # defmend-engine
//!
//! The record transformation layer:
//! - `FixTables`: curated per-identifier corrections (icons, links,
//!   package args, identifier remaps, suffix exemptions)
//! - the fix engine: idempotent table-driven repairs applied in place
//! - the canonicalization engine: identifier-domain and transport-suffix
//!   renames performed as all-or-nothing units
//!
//! Engines are pure functions of `(record, tables)` plus an explicit git
//! handle for the rename execution; nothing here holds global state.

pub mod canon;
pub mod fix;
pub mod tables;

pub use canon::{
    CanonError, CanonOutcome, Canonicalizer, Rename, SuffixDecision, decide_suffix, domain_remap,
};
pub use fix::apply_fixes;
pub use tables::{FixTables, OrgPageFix, TablesError};
