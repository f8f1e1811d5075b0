//! The fixed enumeration of declared input kinds.
//!
//! Any `type` outside this set is a data-entry defect, not a design
//! choice; the fix engine coerces it to the default textual kind.

use serde::{Deserialize, Serialize};

/// The default coercion target for out-of-enumeration input types.
pub const DEFAULT_INPUT_TYPE: &str = "text";

/// Valid kinds for a transport metadata input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    Text,
    Number,
    Boolean,
    Url,
    Select,
    FilePath,
    DirectoryPath,
}

impl InputKind {
    pub const ALL: [InputKind; 7] = [
        InputKind::Text,
        InputKind::Number,
        InputKind::Boolean,
        InputKind::Url,
        InputKind::Select,
        InputKind::FilePath,
        InputKind::DirectoryPath,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            InputKind::Text => "text",
            InputKind::Number => "number",
            InputKind::Boolean => "boolean",
            InputKind::Url => "url",
            InputKind::Select => "select",
            InputKind::FilePath => "file_path",
            InputKind::DirectoryPath => "directory_path",
        }
    }
}

/// Membership test against the fixed enumeration.
pub fn is_valid_input_type(value: &str) -> bool {
    InputKind::ALL.iter().any(|kind| kind.as_str() == value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_declared_kind_is_valid() {
        for kind in InputKind::ALL {
            assert!(is_valid_input_type(kind.as_str()), "{}", kind.as_str());
        }
    }

    #[test]
    fn rejects_out_of_enumeration_kinds() {
        assert!(!is_valid_input_type("dir"));
        assert!(!is_valid_input_type("string"));
        assert!(!is_valid_input_type(""));
        assert!(!is_valid_input_type("TEXT"));
    }
}
