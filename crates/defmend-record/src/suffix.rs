//! Transport tool-suffix vocabulary.
//!
//! A record launched through a multi-purpose runner carries the runner's
//! name as a filename/id suffix (`-npx`, `-uvx`, `-docker`, `-cli`).
//! http-only records name no local launcher, so the http convention is
//! suffix-free; `-http` exists only on files that already carried it.

use serde::{Deserialize, Serialize};

/// Suffixes recognized as already-canonical on a filename basename.
pub const KNOWN_SUFFIXES: [&str; 5] = ["-npx", "-uvx", "-docker", "-http", "-cli"];

/// A recognized transport tool suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolSuffix {
    Npx,
    Uvx,
    Docker,
    Cli,
    Http,
}

impl ToolSuffix {
    pub fn as_str(self) -> &'static str {
        match self {
            ToolSuffix::Npx => "npx",
            ToolSuffix::Uvx => "uvx",
            ToolSuffix::Docker => "docker",
            ToolSuffix::Cli => "cli",
            ToolSuffix::Http => "http",
        }
    }

    /// The filename/id suffix form, with leading dash.
    pub fn file_suffix(self) -> &'static str {
        match self {
            ToolSuffix::Npx => "-npx",
            ToolSuffix::Uvx => "-uvx",
            ToolSuffix::Docker => "-docker",
            ToolSuffix::Cli => "-cli",
            ToolSuffix::Http => "-http",
        }
    }

    /// Parenthetical annotation appended to the display name, when the
    /// suffix names a local launcher.
    pub fn display_label(self) -> Option<&'static str> {
        match self {
            ToolSuffix::Npx => Some("(npx)"),
            ToolSuffix::Uvx => Some("(uvx)"),
            ToolSuffix::Docker => Some("(Docker)"),
            ToolSuffix::Cli => Some("(CLI)"),
            ToolSuffix::Http => None,
        }
    }

    /// Map a stdio launcher command to its suffix, for the standard
    /// multi-purpose runners. Special-case launchers are table-driven and
    /// resolved by the caller.
    pub fn from_runner_command(command: &str) -> Option<Self> {
        match command {
            "npx" => Some(ToolSuffix::Npx),
            "uvx" => Some(ToolSuffix::Uvx),
            "docker" => Some(ToolSuffix::Docker),
            _ => None,
        }
    }
}

/// True when the basename (extension already stripped) ends in a
/// recognized tool suffix.
pub fn has_known_suffix(basename: &str) -> bool {
    KNOWN_SUFFIXES
        .iter()
        .any(|suffix| basename.ends_with(suffix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runner_commands_map_to_suffixes() {
        assert_eq!(ToolSuffix::from_runner_command("npx"), Some(ToolSuffix::Npx));
        assert_eq!(ToolSuffix::from_runner_command("uvx"), Some(ToolSuffix::Uvx));
        assert_eq!(
            ToolSuffix::from_runner_command("docker"),
            Some(ToolSuffix::Docker)
        );
        assert_eq!(ToolSuffix::from_runner_command("snyk"), None);
        assert_eq!(ToolSuffix::from_runner_command(""), None);
    }

    #[test]
    fn suffix_detection_on_basenames() {
        assert!(has_known_suffix("community.tool-npx"));
        assert!(has_known_suffix("com.linear-mcp-http"));
        assert!(!has_known_suffix("com.resend-mcp"));
        assert!(!has_known_suffix("community.postgresql"));
    }

    #[test]
    fn display_labels_skip_http() {
        assert_eq!(ToolSuffix::Docker.display_label(), Some("(Docker)"));
        assert_eq!(ToolSuffix::Http.display_label(), None);
    }
}
