//! # defmend-record
//!
//! Storage layer for server definition records.
//!
//! This crate provides:
//! - `ServerRecord`: typed access over a parsed JSON record, preserving
//!   unknown fields and field order for byte-stable re-serialization
//! - atomic persistence (temp file + rename)
//! - the fixed input-kind enumeration
//! - the transport tool-suffix vocabulary
//!
//! It intentionally knows nothing about branches or fix tables. Those
//! concerns live in `defmend-git` and `defmend-engine`.

pub mod input;
pub mod record;
pub mod suffix;

pub use input::{DEFAULT_INPUT_TYPE, InputKind, is_valid_input_type};
pub use record::{RecordError, ServerRecord, basename_of, record_path};
pub use suffix::{KNOWN_SUFFIXES, ToolSuffix, has_known_suffix};
