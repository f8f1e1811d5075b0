//! Read-only cross-branch inventory.
//!
//! Lists records present on each branch but absent from trunk, classifies
//! them by transport tool and by naming-suffix presence, and derives the
//! follow-up lists (files needing a suffix rename, distinct upstream
//! repositories). Reads everything through `git show`/`ls-tree`, so it
//! never touches the working tree and is safe to run at any time.

use defmend_git::{GitClient, GitError};
use defmend_record::{ServerRecord, basename_of, has_known_suffix};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::Write as _;

/// One new record found on a branch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryRow {
    pub branch: String,
    pub file: String,
    pub id: String,
    pub name: String,
    /// Transport classification: the stdio launcher command, `http`, or
    /// `?` when the record declares neither.
    pub tool: String,
    pub has_suffix: bool,
    pub repo: String,
}

/// The full scan plus derived summaries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InventoryReport {
    pub rows: Vec<InventoryRow>,
}

/// Scan every branch matching `branch_prefix` for records absent from
/// trunk. Unreadable branches and unparseable records are skipped, not
/// errors: the inventory tolerates a moving target.
pub fn collect_inventory(
    git: &GitClient,
    trunk: &str,
    records_dir: &str,
    branch_prefix: &str,
) -> Result<InventoryReport, GitError> {
    let trunk_files: BTreeSet<String> = git
        .ls_tree_names(trunk, records_dir)?
        .into_iter()
        .collect();
    let branches = git.list_local_branches(branch_prefix)?;

    let mut rows = Vec::new();
    for branch in branches {
        let Ok(files) = git.ls_tree_names(&branch, records_dir) else {
            continue;
        };
        for file in files {
            if trunk_files.contains(&file) || !file.ends_with(".json") {
                continue;
            }
            let origin = format!("{branch}:{file}");
            let Ok(text) = git.show_file(&branch, &file) else {
                continue;
            };
            let Ok(record) = ServerRecord::from_str(&text, &origin) else {
                continue;
            };

            let tool = match record.transport_type() {
                Some("stdio") => record.command().unwrap_or("").to_string(),
                Some("http") => "http".to_string(),
                _ => "?".to_string(),
            };
            rows.push(InventoryRow {
                branch: branch.clone(),
                id: record.id().to_string(),
                name: record.name().to_string(),
                tool,
                has_suffix: has_known_suffix(basename_of(&file)),
                repo: record.repository().unwrap_or("").to_string(),
                file,
            });
        }
    }

    Ok(InventoryReport { rows })
}

impl InventoryReport {
    /// Rows whose stdio tool implies a suffix the filename lacks, with
    /// the suggested new path.
    pub fn needing_rename(&self) -> Vec<(&InventoryRow, String)> {
        self.rows
            .iter()
            .filter(|row| {
                !row.has_suffix && matches!(row.tool.as_str(), "npx" | "uvx" | "docker")
            })
            .map(|row| {
                let suggested = row
                    .file
                    .strip_suffix(".json")
                    .map(|stem| format!("{stem}-{}.json", row.tool))
                    .unwrap_or_else(|| row.file.clone());
                (row, suggested)
            })
            .collect()
    }

    /// Sorted distinct upstream repository URLs, for manual verification
    /// of launch mechanisms.
    pub fn unique_repos(&self) -> Vec<&str> {
        let set: BTreeSet<&str> = self
            .rows
            .iter()
            .filter(|row| row.repo.contains("github.com"))
            .map(|row| row.repo.as_str())
            .collect();
        set.into_iter().collect()
    }

    /// Tabular listing plus the two derived summaries.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{:<25} {:<45} {:<8} {:<8} Repo",
            "Branch", "File", "Tool", "Suffix"
        );
        let _ = writeln!(out, "{}", "-".repeat(100));
        for row in &self.rows {
            let line = format!(
                "{:<25} {:<45} {:<8} {:<8} {}",
                row.branch,
                row.file,
                row.tool,
                if row.has_suffix { "yes" } else { "no" },
                row.repo
            );
            let _ = writeln!(out, "{}", line.trim_end());
        }

        let needing = self.needing_rename();
        let _ = writeln!(out, "\n=== FILES NEEDING RENAME (no transport suffix) ===");
        for (row, suggested) in &needing {
            let _ = writeln!(out, "  {}: {} -> {}", row.branch, row.file, suggested);
        }
        let _ = writeln!(out, "Total needing rename: {}", needing.len());

        let repos = self.unique_repos();
        let _ = writeln!(out, "\n=== UNIQUE REPOS TO CHECK ===");
        for repo in &repos {
            let _ = writeln!(out, "  {repo}");
        }
        let _ = writeln!(out, "Total repos: {}", repos.len());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(file: &str, tool: &str, has_suffix: bool, repo: &str) -> InventoryRow {
        InventoryRow {
            branch: "fix/example".to_string(),
            file: file.to_string(),
            id: basename_of(file).to_string(),
            name: "Example".to_string(),
            tool: tool.to_string(),
            has_suffix,
            repo: repo.to_string(),
        }
    }

    #[test]
    fn needing_rename_targets_unsuffixed_runner_tools() {
        let report = InventoryReport {
            rows: vec![
                row("servers/acme.tool.json", "uvx", false, ""),
                row("servers/community.tool-npx.json", "npx", true, ""),
                row("servers/com.acme-mcp.json", "http", false, ""),
                row("servers/com.snyk-mcp.json", "snyk", false, ""),
            ],
        };
        let needing = report.needing_rename();
        assert_eq!(needing.len(), 1);
        assert_eq!(needing[0].1, "servers/acme.tool-uvx.json");
    }

    #[test]
    fn unique_repos_deduplicates_and_sorts() {
        let report = InventoryReport {
            rows: vec![
                row("a.json", "npx", true, "https://github.com/zeta/tool"),
                row("b.json", "npx", true, "https://github.com/acme/tool"),
                row("c.json", "npx", true, "https://github.com/acme/tool"),
                row("d.json", "npx", true, "https://example.com/elsewhere"),
            ],
        };
        assert_eq!(
            report.unique_repos(),
            vec![
                "https://github.com/acme/tool",
                "https://github.com/zeta/tool"
            ]
        );
    }

    #[test]
    fn render_lists_rows_and_summaries() {
        let report = InventoryReport {
            rows: vec![
                row(
                    "servers/acme.tool.json",
                    "uvx",
                    false,
                    "https://github.com/acme/tool",
                ),
                row("servers/com.acme-mcp.json", "http", false, ""),
            ],
        };
        let rendered = report.render();
        assert!(rendered.contains("servers/acme.tool.json"));
        assert!(rendered.contains("=== FILES NEEDING RENAME (no transport suffix) ==="));
        assert!(rendered.contains("servers/acme.tool.json -> servers/acme.tool-uvx.json"));
        assert!(rendered.contains("Total needing rename: 1"));
        assert!(rendered.contains("Total repos: 1"));
        // No trailing whitespace on table rows (the http row has no repo).
        assert!(rendered.lines().all(|line| line == line.trim_end()));
    }
}
