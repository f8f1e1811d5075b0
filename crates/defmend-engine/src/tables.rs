//! Curated fix tables.
//!
//! These are maintained data, not derived facts: every entry exists
//! because a human verified the correct value upstream. The compiled-in
//! defaults carry the current curation; `--tables <file.json>` replaces
//! them wholesale. Absence from a table means "no known fix", never an
//! error.

use defmend_record::ToolSuffix;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Errors loading a tables file.
#[derive(Debug, thiserror::Error)]
pub enum TablesError {
    #[error("failed to read tables at {path}: {message}")]
    Io { path: String, message: String },

    #[error("failed to parse tables at {path}: {message}")]
    Parse { path: String, message: String },
}

/// The one identifier whose repository link is known to point at an
/// organization page instead of the project repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrgPageFix {
    pub id: String,
    pub repository: String,
}

/// All maintained correction tables, keyed by record id or by filename
/// basename as noted per field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FixTables {
    /// record id -> correct upstream icon URL
    pub icons: BTreeMap<String, String>,
    /// record id -> correct repository URL
    pub repositories: BTreeMap<String, String>,
    /// record id -> correct documentation URL
    pub documentation: BTreeMap<String, String>,
    /// record id -> corrected transport args (wrong installed package)
    pub package_args: BTreeMap<String, Vec<String>>,
    /// the org-page special case
    pub org_page: Option<OrgPageFix>,
    /// filename basename -> canonical id under the contributing account
    pub id_remaps: BTreeMap<String, String>,
    /// filename basenames exempt from suffix canonicalization (http-only)
    pub suffix_exempt: BTreeSet<String>,
    /// launcher command -> suffix, for launchers outside the standard
    /// runners (e.g. a vendor CLI that is its own launcher)
    pub special_launchers: BTreeMap<String, ToolSuffix>,
}

impl FixTables {
    /// The compiled-in curation.
    pub fn builtin() -> Self {
        let hub_icon = "https://avatars.githubusercontent.com/u/182288589?v=4";

        let icons = [
            // Hub-org projects keep the hub icon; everything else points
            // at its actual upstream.
            ("community.filesystem", hub_icon),
            ("community.puppeteer", hub_icon),
            ("community.sqlite", hub_icon),
            ("community.fetch", hub_icon),
            ("community.memory", hub_icon),
            ("community.sequential-thinking", hub_icon),
            (
                "community.postgresql",
                "https://www.postgresql.org/media/img/about/press/elephant.png",
            ),
            (
                "community.gitlab",
                "https://avatars.githubusercontent.com/u/1086321?v=4",
            ),
            (
                "community.google-maps",
                "https://avatars.githubusercontent.com/u/1342004?v=4",
            ),
        ];

        let repositories = [
            ("com.hubspot-mcp", "https://github.com/HubSpot/mcp-server"),
            ("com.resend-mcp", "https://github.com/resend/resend-mcp"),
            (
                "com.pagerduty-mcp",
                "https://github.com/PagerDuty/pagerduty-mcp-server",
            ),
        ];

        let documentation = [(
            "community.postgresql",
            "https://github.com/modelcontextprotocol/servers/tree/main/src/postgres#readme",
        )];

        let package_args = [("com.pagerduty-mcp", vec!["pagerduty-mcp".to_string()])];

        let id_remaps = [
            ("community.postgresql-uvx", "crystaldba.postgres-mcp-uvx"),
            ("community.airtable-npx", "domdomegg.airtable-mcp-npx"),
            ("community.axiom-npx", "thetabird.axiom-mcp-npx"),
            ("community.coda-npx", "orellazri.coda-mcp-npx"),
            ("community.jira-npx", "aashari.jira-mcp-npx"),
            ("community.1password-npx", "cakerepository.1password-mcp-npx"),
            // modelcontextprotocol/servers records stay under community.*
        ];

        let suffix_exempt = [
            "com.asana-mcp",
            "com.clerk-mcp",
            "com.cloudflare-observability",
            "com.figma-mcp",
            "com.honeycomb-mcp",
            "io.intercom-mcp",
            "io.sanity-mcp",
            "com.stytch-mcp",
            "com.vercel-mcp",
            "town.val-mcp",
        ];

        Self {
            icons: to_string_map(&icons),
            repositories: to_string_map(&repositories),
            documentation: to_string_map(&documentation),
            package_args: package_args
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            org_page: Some(OrgPageFix {
                id: "com.stytch-mcp".to_string(),
                repository: "https://github.com/stytchauth/stytch-mcp".to_string(),
            }),
            id_remaps: to_string_map(&id_remaps),
            suffix_exempt: suffix_exempt.iter().map(|s| s.to_string()).collect(),
            special_launchers: BTreeMap::from([("snyk".to_string(), ToolSuffix::Cli)]),
        }
    }

    /// Load tables from a JSON file, replacing the compiled-in defaults
    /// wholesale (missing sections are empty, not defaulted).
    pub fn from_json_path(path: impl AsRef<Path>) -> Result<Self, TablesError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| TablesError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        serde_json::from_slice(&bytes).map_err(|e| TablesError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }
}

fn to_string_map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
