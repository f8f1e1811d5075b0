//! The canonicalization engine: identifier-domain and transport-suffix
//! renames.
//!
//! Both sub-operations are idempotent and skip-if-already-canonical. A
//! rename is one logical unit: id field, display name, and file move
//! happen together or not at all. On a failed move the original file
//! bytes are restored, so neither "old filename with new id" nor "new
//! filename with old id" can reach persisted state.

use crate::tables::FixTables;
use defmend_git::{GitClient, GitError};
use defmend_record::{
    RecordError, ServerRecord, ToolSuffix, basename_of, has_known_suffix, record_path,
    record::write_bytes_atomic,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::sync::LazyLock;

static CANONICAL_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9][a-z0-9._-]*$").expect("canonical id pattern should compile")
});

/// One performed rename, tracked for commit messages and reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rename {
    pub old_basename: String,
    pub new_basename: String,
    pub old_id: String,
    pub new_id: String,
}

/// Outcome of the suffix decision for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuffixDecision {
    /// Basename already ends in a known suffix.
    AlreadyCanonical,
    /// http transport or on the exemption list; no suffix by convention.
    Exempt,
    /// stdio with a recognized launcher: append this suffix.
    Apply(ToolSuffix),
    /// Launcher not recognized; flagged for manual attention, never
    /// guessed.
    UnknownLauncher(String),
}

/// Decide whether `record` (stored at `basename`) needs a tool suffix.
///
/// The http exemption is exhaustive: every http transport is `Exempt`,
/// whether or not it appears on the exemption list; an `-http` suffix is
/// never produced, only accepted as already canonical.
pub fn decide_suffix(
    record: &ServerRecord,
    basename: &str,
    tables: &FixTables,
) -> SuffixDecision {
    if tables.suffix_exempt.contains(basename) {
        return SuffixDecision::Exempt;
    }
    if has_known_suffix(basename) {
        return SuffixDecision::AlreadyCanonical;
    }
    match record.transport_type() {
        Some("http") => SuffixDecision::Exempt,
        Some("stdio") => {
            let command = record.command().unwrap_or("");
            if let Some(suffix) = ToolSuffix::from_runner_command(command) {
                SuffixDecision::Apply(suffix)
            } else if let Some(suffix) = tables.special_launchers.get(command) {
                SuffixDecision::Apply(*suffix)
            } else {
                SuffixDecision::UnknownLauncher(command.to_string())
            }
        }
        other => SuffixDecision::UnknownLauncher(other.unwrap_or("").to_string()),
    }
}

/// The canonical id for a record under a generic placeholder domain, when
/// its contributing account is known. `None` means the record stays put
/// (including the table-driven standards-body exceptions).
pub fn domain_remap<'t>(basename: &str, tables: &'t FixTables) -> Option<&'t str> {
    tables.id_remaps.get(basename).map(String::as_str)
}

/// Errors from canonicalization. Collision and unknown-launcher cases are
/// reported as flags in `CanonOutcome`, not errors; errors here mean the
/// record could not be processed at all.
#[derive(Debug, thiserror::Error)]
pub enum CanonError {
    #[error(transparent)]
    Record(#[from] RecordError),

    #[error(transparent)]
    Git(#[from] GitError),

    #[error("remapped id '{id}' is not a canonical identifier")]
    IdShape { id: String },
}

/// What canonicalizing one file produced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CanonOutcome {
    pub renames: Vec<Rename>,
    /// Records left untouched but needing manual attention.
    pub flags: Vec<String>,
}

/// Executes renames against one checked-out working tree.
pub struct Canonicalizer<'a> {
    git: &'a GitClient,
    records_dir: &'a str,
    tables: &'a FixTables,
    /// Record paths present on trunk; renames must never collide with
    /// these.
    trunk_files: BTreeSet<String>,
}

impl<'a> Canonicalizer<'a> {
    pub fn new(
        git: &'a GitClient,
        records_dir: &'a str,
        tables: &'a FixTables,
        trunk_files: BTreeSet<String>,
    ) -> Self {
        Self {
            git,
            records_dir,
            tables,
            trunk_files,
        }
    }

    /// Canonicalize one record file (repository-relative path): first the
    /// identifier domain, then the transport suffix. Returns the renames
    /// performed and any manual-attention flags.
    pub fn canonicalize_file(&self, rel_path: &str) -> Result<CanonOutcome, CanonError> {
        let mut outcome = CanonOutcome::default();
        let mut current_path = rel_path.to_string();

        let basename = basename_of(&current_path).to_string();
        if let Some(new_id) = domain_remap(&basename, self.tables) {
            let new_id = new_id.to_string();
            match self.rename_record(&current_path, &new_id, None)? {
                RenameStep::Done(rename) => {
                    current_path = record_path(self.records_dir, &rename.new_basename);
                    outcome.renames.push(rename);
                }
                RenameStep::Collision => {
                    outcome
                        .flags
                        .push(format!("{basename}: remap to '{new_id}' collides with trunk"));
                    return Ok(outcome);
                }
            }
        }

        let basename = basename_of(&current_path).to_string();
        let record = ServerRecord::from_path(self.git.repo_root().join(&current_path))?;
        match decide_suffix(&record, &basename, self.tables) {
            SuffixDecision::AlreadyCanonical | SuffixDecision::Exempt => {}
            SuffixDecision::UnknownLauncher(command) => {
                outcome
                    .flags
                    .push(format!("{basename}: unknown launcher '{command}'"));
            }
            SuffixDecision::Apply(suffix) => {
                let new_id = format!("{}{}", record.id(), suffix.file_suffix());
                match self.rename_record(&current_path, &new_id, suffix.display_label())? {
                    RenameStep::Done(rename) => outcome.renames.push(rename),
                    RenameStep::Collision => {
                        outcome.flags.push(format!(
                            "{basename}: suffix rename to '{new_id}' collides with trunk"
                        ));
                    }
                }
            }
        }

        Ok(outcome)
    }

    /// Perform one rename as an all-or-nothing unit.
    fn rename_record(
        &self,
        old_rel: &str,
        new_id: &str,
        name_label: Option<&str>,
    ) -> Result<RenameStep, CanonError> {
        if !CANONICAL_ID.is_match(new_id) {
            return Err(CanonError::IdShape {
                id: new_id.to_string(),
            });
        }

        let new_rel = record_path(self.records_dir, new_id);
        if self.trunk_files.contains(&new_rel) {
            return Ok(RenameStep::Collision);
        }

        let old_abs = self.git.repo_root().join(old_rel);
        let original_bytes = fs::read(&old_abs).map_err(|e| RecordError::Io {
            path: old_abs.display().to_string(),
            message: e.to_string(),
        })?;

        let mut record = ServerRecord::from_path(&old_abs)?;
        let old_id = record.id().to_string();
        record.set_id(new_id);
        if let Some(label) = name_label {
            let name = record.name().to_string();
            if !name.ends_with(label) {
                record.set_name(&format!("{name} {label}"));
            }
        }

        record.save(&old_abs)?;
        if let Err(err) = self.git.move_file(old_rel, &new_rel) {
            // Roll the file back so no partial rename persists.
            let _ = write_bytes_atomic(&old_abs, &original_bytes);
            return Err(err.into());
        }

        Ok(RenameStep::Done(Rename {
            old_basename: basename_of(old_rel).to_string(),
            new_basename: new_id.to_string(),
            old_id,
            new_id: new_id.to_string(),
        }))
    }
}

enum RenameStep {
    Done(Rename),
    Collision,
}
