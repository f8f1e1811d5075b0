//! Branch-name normalization.
//!
//! Contribution branches arrive as `<source_prefix><name>[-<token>]`
//! where `<token>` is generated session noise. The short name feeds the
//! fix-branch name, so the stripping rule is declared here rather than
//! scattered as literal substring surgery:
//!
//! - strip the configured source prefix;
//! - strip one trailing `-<token>` where the token is exactly five
//!   alphanumerics containing at least one digit and at least one
//!   uppercase letter (ordinary package names never match);
//! - strip a now-trailing `-mcp` segment the token left behind.
//!
//! Examples: `claude/add-resend-mcp-nYwV7` -> `resend`,
//! `claude/add-postgres` -> `postgres`.

use serde::{Deserialize, Serialize};

/// Naming conventions for source and fix branches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchNaming {
    /// Prefix of contribution branches to enumerate and strip.
    pub source_prefix: String,
    /// Prefix of republished fix branches.
    pub fix_prefix: String,
}

impl Default for BranchNaming {
    fn default() -> Self {
        Self {
            source_prefix: "claude/add-".to_string(),
            fix_prefix: "fix/".to_string(),
        }
    }
}

impl BranchNaming {
    /// Normalized short name of a source branch.
    pub fn short_name<'a>(&self, branch: &'a str) -> &'a str {
        let mut rest = branch.strip_prefix(&self.source_prefix).unwrap_or(branch);
        if let Some(stripped) = strip_noise_token(rest) {
            rest = stripped.strip_suffix("-mcp").unwrap_or(stripped);
        }
        rest
    }

    /// Destination branch name for a source branch.
    pub fn fix_branch(&self, branch: &str) -> String {
        format!("{}{}", self.fix_prefix, self.short_name(branch))
    }
}

/// Strip one trailing generated-noise token, when present.
fn strip_noise_token(name: &str) -> Option<&str> {
    let pos = name.rfind('-')?;
    let token = &name[pos + 1..];
    let is_noise = token.len() == 5
        && token.chars().all(|c| c.is_ascii_alphanumeric())
        && token.chars().any(|c| c.is_ascii_digit())
        && token.chars().any(|c| c.is_ascii_uppercase());
    is_noise.then(|| &name[..pos])
}
