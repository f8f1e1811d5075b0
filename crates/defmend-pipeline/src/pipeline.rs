//! The per-branch state machine.
//!
//! START -> CHECKED_OUT -> REBASED -> CHANGES_DETECTED -> FIXED ->
//! CANONICALIZED -> COMMITTED -> PUSHED -> DONE, with terminal failures
//! REBASE_CONFLICT, NO_CHANGES, CHECKOUT_ERROR, PUSH_ERROR. Every path
//! except CHECKOUT_ERROR (which never leaves trunk) ends with the working
//! tree back on trunk; failing that aborts the whole run, because a dirty
//! shared tree would corrupt every later branch.

use crate::normalize::BranchNaming;
use crate::outcome::{BranchOutcome, BranchStatus, FileFix};
use defmend_engine::{Canonicalizer, FixTables, apply_fixes};
use defmend_git::{GitClient, GitError, ReviewRequest, create_review};
use defmend_record::ServerRecord;
use std::collections::BTreeSet;

/// Run-wide settings for the orchestrator.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub trunk: String,
    pub records_dir: String,
    pub remote: String,
    pub naming: BranchNaming,
    pub author_override: Option<String>,
    pub create_reviews: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            trunk: "main".to_string(),
            records_dir: "servers".to_string(),
            remote: "origin".to_string(),
            naming: BranchNaming::default(),
            author_override: None,
            create_reviews: false,
        }
    }
}

/// Errors that end a whole run. Per-branch failures are outcomes, not
/// errors; only shared-tree corruption lands here.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Git(#[from] GitError),

    #[error("working tree could not be returned to '{trunk}' after {branch}: {source}")]
    TreeNotRecovered {
        trunk: String,
        branch: String,
        source: GitError,
    },
}

/// Drives branches through the state machine, one at a time.
pub struct Pipeline<'a> {
    git: &'a GitClient,
    tables: &'a FixTables,
    config: &'a PipelineConfig,
}

impl<'a> Pipeline<'a> {
    pub fn new(git: &'a GitClient, tables: &'a FixTables, config: &'a PipelineConfig) -> Self {
        Self {
            git,
            tables,
            config,
        }
    }

    /// Contribution branches to process, in stable sorted order.
    pub fn source_branches(&self) -> Result<Vec<String>, GitError> {
        self.git
            .list_remote_branches(&self.config.naming.source_prefix)
    }

    /// Make sure the shared tree starts on trunk.
    pub fn ensure_on_trunk(&self) -> Result<(), GitError> {
        self.git.checkout(&self.config.trunk)
    }

    /// Process every source branch sequentially.
    pub fn run(&self) -> Result<Vec<BranchOutcome>, PipelineError> {
        self.ensure_on_trunk()?;
        let mut outcomes = Vec::new();
        for branch in self.source_branches()? {
            outcomes.push(self.process_branch(&branch)?);
        }
        Ok(outcomes)
    }

    /// Drive one branch to a terminal state. `Err` means the shared tree
    /// is in an unknown state and the run must stop.
    pub fn process_branch(&self, branch: &str) -> Result<BranchOutcome, PipelineError> {
        let fix_branch = self.config.naming.fix_branch(branch);
        let base = format!("{}/{branch}", self.config.remote);

        // START -> CHECKED_OUT. A failed checkout never leaves trunk.
        if let Err(err) = self.git.checkout_new(&fix_branch, &base) {
            let mut outcome = BranchOutcome::new(branch, BranchStatus::CheckoutError);
            outcome.diagnostic = Some(err.diagnostic());
            return Ok(outcome);
        }

        let mut guard = TrunkReturn::new(self.git, &self.config.trunk);

        // CHECKED_OUT -> REBASED. Conflicts are terminal, never resolved:
        // abort, drop the local branch, leave the tree clean on trunk.
        if let Err(err) = self.git.rebase_onto(&self.config.trunk) {
            let _ = self.git.rebase_abort();
            self.return_to_trunk(branch, &mut guard)?;
            let _ = self.git.delete_branch(&fix_branch);
            let mut outcome = BranchOutcome::new(branch, BranchStatus::RebaseConflict);
            outcome.diagnostic = Some(err.diagnostic());
            return Ok(outcome);
        }

        // REBASED -> CHANGES_DETECTED. A failed listing still terminates
        // as NO_CHANGES, but the preserved diagnostic makes the outcome
        // count as an operational failure (`BranchOutcome::is_failure`).
        let (changed, diff_diagnostic) = match self
            .git
            .diff_names_against(&self.config.trunk, &self.config.records_dir)
        {
            Ok(files) => (files, None),
            Err(err) => (Vec::new(), Some(err.diagnostic())),
        };
        if changed.is_empty() {
            self.return_to_trunk(branch, &mut guard)?;
            let _ = self.git.delete_branch(&fix_branch);
            let mut outcome = BranchOutcome::new(branch, BranchStatus::NoChanges);
            outcome.diagnostic = diff_diagnostic;
            return Ok(outcome);
        }

        let mut outcome = BranchOutcome::new(branch, BranchStatus::Pushed);
        outcome.fix_branch = Some(fix_branch.clone());

        // CHANGES_DETECTED -> FIXED -> CANONICALIZED. A file that fails
        // to parse is a recorded defect; the rest of the branch still
        // gets processed.
        let trunk_files: BTreeSet<String> = match self
            .git
            .ls_tree_names(&self.config.trunk, &self.config.records_dir)
        {
            Ok(files) => files.into_iter().collect(),
            Err(err) => {
                outcome
                    .defects
                    .push(format!("trunk listing unavailable: {}", err.diagnostic()));
                BTreeSet::new()
            }
        };
        let canonicalizer = Canonicalizer::new(
            self.git,
            &self.config.records_dir,
            self.tables,
            trunk_files,
        );

        for file in &changed {
            if !file.ends_with(".json") {
                continue;
            }
            let abs = self.git.repo_root().join(file);
            if !abs.exists() {
                continue;
            }

            match ServerRecord::from_path(&abs) {
                Err(err) => {
                    outcome.defects.push(err.to_string());
                    continue;
                }
                Ok(mut record) => {
                    let fixes = apply_fixes(&mut record, self.tables);
                    if !fixes.is_empty() {
                        if let Err(err) = record.save(&abs) {
                            outcome.defects.push(err.to_string());
                            continue;
                        }
                        for note in fixes {
                            outcome.fixes.push(FileFix {
                                file: file.clone(),
                                note,
                            });
                        }
                    }
                }
            }

            match canonicalizer.canonicalize_file(file) {
                Ok(canon) => {
                    outcome.renames.extend(canon.renames);
                    outcome.defects.extend(canon.flags);
                }
                Err(err) => outcome.defects.push(format!("{file}: {err}")),
            }
        }

        // -> COMMITTED. A rebase-only branch with nothing to commit is
        // still worth pushing.
        if !outcome.fixes.is_empty() || !outcome.renames.is_empty() {
            let message = commit_message(&outcome.fixes, &outcome.renames);
            let commit_result = self.git.stage_all().and_then(|_| {
                self.git
                    .commit(&message, self.config.author_override.as_deref())
            });
            if let Err(err) = commit_result {
                self.return_to_trunk(branch, &mut guard)?;
                outcome.status = BranchStatus::PushError;
                outcome.diagnostic = Some(format!("commit: {}", err.diagnostic()));
                return Ok(outcome);
            }
        }

        // -> PUSHED.
        if let Err(err) = self
            .git
            .push_force_with_lease(&self.config.remote, &fix_branch)
        {
            outcome.status = BranchStatus::PushError;
            outcome.diagnostic = Some(err.diagnostic());
        } else if self.config.create_reviews {
            let request = ReviewRequest {
                base: self.config.trunk.clone(),
                head: fix_branch.clone(),
                title: format!(
                    "feat: add {} server definition",
                    self.config.naming.short_name(branch)
                ),
                body: review_body(&outcome, &changed),
            };
            match create_review(self.git.repo_root(), &request) {
                Ok(url) => outcome.review_url = Some(url),
                Err(err) => outcome.defects.push(format!("review request: {err}")),
            }
        }

        // -> DONE.
        self.return_to_trunk(branch, &mut guard)?;
        Ok(outcome)
    }

    fn return_to_trunk(
        &self,
        branch: &str,
        guard: &mut TrunkReturn<'_>,
    ) -> Result<(), PipelineError> {
        guard.disarm();
        self.git
            .checkout(&self.config.trunk)
            .map_err(|source| PipelineError::TreeNotRecovered {
                trunk: self.config.trunk.clone(),
                branch: branch.to_string(),
                source,
            })
    }
}

/// Backstop for early exits: checks trunk out on drop unless the
/// pipeline already did it explicitly (and could check the result).
struct TrunkReturn<'a> {
    git: &'a GitClient,
    trunk: &'a str,
    armed: bool,
}

impl<'a> TrunkReturn<'a> {
    fn new(git: &'a GitClient, trunk: &'a str) -> Self {
        Self {
            git,
            trunk,
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for TrunkReturn<'_> {
    fn drop(&mut self) {
        if self.armed {
            let _ = self.git.checkout(self.trunk);
        }
    }
}

/// Commit message: the first few fixes inline, every rename spelled out
/// as old id -> new id.
fn commit_message(fixes: &[FileFix], renames: &[defmend_engine::Rename]) -> String {
    let mut message = if fixes.is_empty() {
        "fix: rename server files with transport suffix".to_string()
    } else {
        let summary: Vec<&str> = fixes.iter().take(5).map(|f| f.note.as_str()).collect();
        format!("fix: update server definitions ({})", summary.join("; "))
    };
    if !renames.is_empty() {
        message.push_str("\n\n");
        for rename in renames {
            message.push_str(&format!("- {} -> {}\n", rename.old_id, rename.new_id));
        }
    }
    message
}

fn review_body(outcome: &BranchOutcome, files: &[String]) -> String {
    let listed: Vec<&str> = files
        .iter()
        .map(|f| f.rsplit('/').next().unwrap_or(f))
        .collect();
    format!(
        "Normalized server definition(s): {} fix(es), {} rename(s).\n\nFiles: {}",
        outcome.fixes.len(),
        outcome.renames.len(),
        listed.join(", ")
    )
}
