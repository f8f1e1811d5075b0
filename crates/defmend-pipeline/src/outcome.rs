//! Per-branch results.

use defmend_engine::Rename;
use serde::{Deserialize, Serialize};

/// Terminal state of one processed branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BranchStatus {
    Pushed,
    NoChanges,
    RebaseConflict,
    CheckoutError,
    /// The publish phase failed: either the fix commit or the push
    /// itself. The diagnostic says which.
    PushError,
}

impl BranchStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BranchStatus::Pushed => "PUSHED",
            BranchStatus::NoChanges => "NO_CHANGES",
            BranchStatus::RebaseConflict => "REBASE_CONFLICT",
            BranchStatus::CheckoutError => "CHECKOUT_ERROR",
            BranchStatus::PushError => "PUSH_ERROR",
        }
    }

    /// States that should surface as a non-zero process exit for
    /// automation callers.
    pub fn is_failure(self) -> bool {
        matches!(
            self,
            BranchStatus::RebaseConflict | BranchStatus::CheckoutError | BranchStatus::PushError
        )
    }
}

/// One applied fix, attributed to its file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileFix {
    pub file: String,
    pub note: String,
}

/// Everything one branch produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchOutcome {
    pub source_branch: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix_branch: Option<String>,
    pub status: BranchStatus,
    pub fixes: Vec<FileFix>,
    pub renames: Vec<Rename>,
    /// Per-file anomalies that did not abort the branch (parse failures,
    /// unknown launchers, collisions).
    pub defects: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_url: Option<String>,
    /// Backend error text, preserved verbatim for operator triage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
}

impl BranchOutcome {
    /// Operational failure for exit-code purposes. A NO_CHANGES outcome
    /// carrying a diagnostic means the change listing itself failed, not
    /// that the branch was empty; that branch was skipped, not processed.
    pub fn is_failure(&self) -> bool {
        self.status.is_failure()
            || (self.status == BranchStatus::NoChanges && self.diagnostic.is_some())
    }

    pub fn new(source_branch: impl Into<String>, status: BranchStatus) -> Self {
        Self {
            source_branch: source_branch.into(),
            fix_branch: None,
            status,
            fixes: Vec::new(),
            renames: Vec::new(),
            defects: Vec::new(),
            review_url: None,
            diagnostic: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_statuses_are_the_three_operational_ones() {
        assert!(BranchStatus::RebaseConflict.is_failure());
        assert!(BranchStatus::CheckoutError.is_failure());
        assert!(BranchStatus::PushError.is_failure());
        assert!(!BranchStatus::Pushed.is_failure());
        assert!(!BranchStatus::NoChanges.is_failure());
    }

    #[test]
    fn no_changes_with_diagnostic_is_a_failure() {
        let mut outcome = BranchOutcome::new("claude/add-x", BranchStatus::NoChanges);
        assert!(!outcome.is_failure());
        outcome.diagnostic = Some("fatal: bad revision 'main'".to_string());
        assert!(outcome.is_failure());
    }

    #[test]
    fn status_serializes_screaming_snake() {
        let json = serde_json::to_string(&BranchStatus::RebaseConflict).unwrap();
        assert_eq!(json, "\"REBASE_CONFLICT\"");
    }
}
