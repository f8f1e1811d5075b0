//! Final run summary.

use crate::outcome::BranchOutcome;
use std::fmt::Write as _;

/// Branches that ended in an operational failure state, including a
/// NO_CHANGES whose change listing failed.
pub fn failure_count(outcomes: &[BranchOutcome]) -> usize {
    outcomes
        .iter()
        .filter(|outcome| outcome.is_failure())
        .count()
}

/// The tabulated end-of-run summary.
pub fn render_summary(outcomes: &[BranchOutcome]) -> String {
    let mut out = String::from("=== SUMMARY ===\n");
    for outcome in outcomes {
        let _ = writeln!(
            out,
            "  {:<20} {} ({} fixes)",
            outcome.status.as_str(),
            outcome.source_branch,
            outcome.fixes.len()
        );
    }
    out
}
