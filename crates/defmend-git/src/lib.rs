//! Git adapter for the branch-normalization pipeline.
//!
//! This crate is intentionally thin: it shells out to `git` (and `gh` for
//! review requests) and keeps no orchestration policy. Every operation
//! returns either captured stdout or an error carrying the failed argv and
//! stderr verbatim, so callers can report diagnostics without re-running
//! anything. Nothing here panics or terminates the process.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Errors from interacting with a git repository.
#[derive(Debug, thiserror::Error)]
pub enum GitError {
    #[error("git executable is not available in PATH")]
    NotInstalled,

    #[error("git command failed: git {args} ({message})")]
    CommandFailed { args: String, message: String },

    #[error("unable to parse git output: {0}")]
    Parse(String),
}

impl GitError {
    /// Captured stderr for operator triage, when the error carries one.
    pub fn diagnostic(&self) -> String {
        match self {
            Self::CommandFailed { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Errors from the review-request service (`gh`).
#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    #[error("gh executable is not available in PATH")]
    NotInstalled,

    #[error("review request failed: {0}")]
    Failed(String),
}

/// A requested code review for a pushed fix branch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewRequest {
    pub base: String,
    pub head: String,
    pub title: String,
    pub body: String,
}

/// Thin client around the `git` CLI, bound to one working tree.
#[derive(Debug, Clone)]
pub struct GitClient {
    repo_root: PathBuf,
}

impl GitClient {
    /// Returns true if `git` is available in PATH.
    pub fn is_available() -> bool {
        Command::new("git")
            .arg("--version")
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    /// Discover a git working tree from `path` via `git rev-parse`.
    pub fn discover(path: impl AsRef<Path>) -> Result<Self, GitError> {
        let stdout = run_git(path.as_ref(), &["rev-parse", "--show-toplevel"])?;
        let root = first_nonempty_line(&stdout)
            .ok_or_else(|| GitError::Parse("rev-parse returned empty output".to_string()))?;
        Ok(Self {
            repo_root: PathBuf::from(root),
        })
    }

    /// Bind to `path` without discovery (tests, bare-remote setups).
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            repo_root: path.into(),
        }
    }

    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    /// Name of the currently checked-out branch.
    pub fn current_branch(&self) -> Result<String, GitError> {
        let stdout = self.run(&["rev-parse", "--abbrev-ref", "HEAD"])?;
        first_nonempty_line(&stdout)
            .map(ToOwned::to_owned)
            .ok_or_else(|| GitError::Parse("rev-parse HEAD returned empty output".to_string()))
    }

    /// Remote-tracking branches under `origin/` whose short name starts
    /// with `prefix`, sorted, with the `origin/` qualifier stripped.
    pub fn list_remote_branches(&self, prefix: &str) -> Result<Vec<String>, GitError> {
        let pattern = format!("refs/remotes/origin/{prefix}*");
        let stdout = self.run(&["for-each-ref", "--format=%(refname:short)", &pattern])?;
        let mut branches: Vec<String> = nonempty_lines(&stdout)
            .map(|line| line.strip_prefix("origin/").unwrap_or(line).to_string())
            .collect();
        branches.sort();
        Ok(branches)
    }

    /// Local branches whose name starts with `prefix`, sorted.
    pub fn list_local_branches(&self, prefix: &str) -> Result<Vec<String>, GitError> {
        let pattern = format!("refs/heads/{prefix}*");
        let stdout = self.run(&["for-each-ref", "--format=%(refname:short)", &pattern])?;
        let mut branches: Vec<String> = nonempty_lines(&stdout).map(ToOwned::to_owned).collect();
        branches.sort();
        Ok(branches)
    }

    pub fn checkout(&self, refname: &str) -> Result<(), GitError> {
        self.run(&["checkout", refname]).map(|_| ())
    }

    /// Create a local branch at `base` and check it out.
    ///
    /// Delete-then-create semantics: any prior local branch with this name
    /// is forcibly removed first, so an interrupted earlier run self-heals
    /// on rerun instead of failing on "branch already exists".
    pub fn checkout_new(&self, local: &str, base: &str) -> Result<(), GitError> {
        let _ = self.delete_branch(local);
        self.run(&["checkout", "-b", local, base]).map(|_| ())
    }

    pub fn delete_branch(&self, name: &str) -> Result<(), GitError> {
        self.run(&["branch", "-D", name]).map(|_| ())
    }

    /// Replay the current branch's unique commits onto `trunk`.
    ///
    /// On conflict the caller must `rebase_abort` and clean up; this
    /// operation is never retried.
    pub fn rebase_onto(&self, trunk: &str) -> Result<(), GitError> {
        self.run(&["rebase", trunk]).map(|_| ())
    }

    pub fn rebase_abort(&self) -> Result<(), GitError> {
        self.run(&["rebase", "--abort"]).map(|_| ())
    }

    /// Paths changed relative to `trunk`, restricted to `path_prefix`.
    /// An empty result is a valid outcome, not an error.
    pub fn diff_names_against(
        &self,
        trunk: &str,
        path_prefix: &str,
    ) -> Result<Vec<String>, GitError> {
        let stdout = self.run(&["diff", trunk, "--name-only", "--", path_prefix])?;
        Ok(nonempty_lines(&stdout).map(ToOwned::to_owned).collect())
    }

    /// All tracked paths under `path_prefix` at `refname`, without touching
    /// the working tree.
    pub fn ls_tree_names(&self, refname: &str, path_prefix: &str) -> Result<Vec<String>, GitError> {
        let stdout = self.run(&["ls-tree", "-r", "--name-only", refname, "--", path_prefix])?;
        Ok(nonempty_lines(&stdout).map(ToOwned::to_owned).collect())
    }

    /// File content at `refname:path`, without touching the working tree.
    pub fn show_file(&self, refname: &str, path: &str) -> Result<String, GitError> {
        let spec = format!("{refname}:{path}");
        self.run(&["show", &spec])
    }

    pub fn stage_all(&self) -> Result<(), GitError> {
        self.run(&["add", "-A"]).map(|_| ())
    }

    /// Commit staged changes, optionally overriding the author signature.
    pub fn commit(&self, message: &str, author_override: Option<&str>) -> Result<(), GitError> {
        let mut args = vec!["commit", "-m", message];
        let author_arg;
        if let Some(author) = author_override {
            author_arg = format!("--author={author}");
            args.push(&author_arg);
        }
        self.run(&args).map(|_| ())
    }

    /// Force-push `branch` to `remote` with lease semantics, setting the
    /// upstream so the republished branch tracks its destination.
    pub fn push_force_with_lease(&self, remote: &str, branch: &str) -> Result<(), GitError> {
        self.run(&["push", "-u", remote, branch, "--force-with-lease"])
            .map(|_| ())
    }

    /// Version-control-aware rename preserving history linkage.
    pub fn move_file(&self, old: &str, new: &str) -> Result<(), GitError> {
        self.run(&["mv", old, new]).map(|_| ())
    }

    fn run(&self, args: &[&str]) -> Result<String, GitError> {
        run_git(&self.repo_root, args)
    }
}

/// Request a code review for a pushed branch via `gh pr create`.
///
/// The review service is a black box: on success the review URL is
/// returned; any failure is reported as an error string, never fatal.
pub fn create_review(repo_root: &Path, request: &ReviewRequest) -> Result<String, ReviewError> {
    let output = Command::new("gh")
        .args([
            "pr",
            "create",
            "--base",
            &request.base,
            "--head",
            &request.head,
            "--title",
            &request.title,
            "--body",
            &request.body,
        ])
        .current_dir(repo_root)
        .output()
        .map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                ReviewError::NotInstalled
            } else {
                ReviewError::Failed(err.to_string())
            }
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(ReviewError::Failed(stderr));
    }

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    nonempty_lines(&stdout)
        .find(|line| line.starts_with("http"))
        .map(ToOwned::to_owned)
        .ok_or_else(|| ReviewError::Failed("review service returned no URL".to_string()))
}

fn run_git(cwd: &Path, args: &[&str]) -> Result<String, GitError> {
    let output = Command::new("git")
        .args(args)
        .current_dir(cwd)
        .output()
        .map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                GitError::NotInstalled
            } else {
                GitError::CommandFailed {
                    args: args.join(" "),
                    message: err.to_string(),
                }
            }
        })?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let message = if stderr.is_empty() {
            "unknown error".to_string()
        } else {
            stderr
        };
        Err(GitError::CommandFailed {
            args: args.join(" "),
            message,
        })
    }
}

fn first_nonempty_line(input: &str) -> Option<&str> {
    nonempty_lines(input).next()
}

fn nonempty_lines(input: &str) -> impl Iterator<Item = &str> {
    input.lines().map(str::trim).filter(|line| !line.is_empty())
}
