//! `ServerRecord`: typed access over one parsed definition file.
//!
//! The record is held as a JSON object rather than a rigid struct so that
//! fields the pipeline never touches ride along untouched and keep their
//! position. Re-serializing an unmodified record reproduces its bytes
//! exactly (two-space indent, trailing newline), so working-tree diffs
//! only ever show real changes.

use serde_json::Value;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Errors from reading, parsing, or persisting a record.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("{path}: I/O error: {message}")]
    Io { path: String, message: String },

    #[error("{path}: parse error: {message}")]
    Parse { path: String, message: String },

    #[error("{path}: top-level value is not a JSON object")]
    NotAnObject { path: String },

    #[error("serialization error: {0}")]
    Serialize(String),
}

/// One server definition record.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerRecord {
    value: Value,
}

impl ServerRecord {
    /// Parse a record from JSON text. `origin` labels errors (a path, a
    /// `branch:path` spec, or similar).
    pub fn from_str(text: &str, origin: &str) -> Result<Self, RecordError> {
        let value: Value = serde_json::from_str(text).map_err(|e| RecordError::Parse {
            path: origin.to_string(),
            message: e.to_string(),
        })?;
        if !value.is_object() {
            return Err(RecordError::NotAnObject {
                path: origin.to_string(),
            });
        }
        Ok(Self { value })
    }

    /// Load a record from a file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RecordError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| RecordError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_str(&text, &path.display().to_string())
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn id(&self) -> &str {
        self.value.get("id").and_then(Value::as_str).unwrap_or("")
    }

    pub fn set_id(&mut self, id: &str) {
        self.insert_top("id", Value::String(id.to_string()));
    }

    pub fn name(&self) -> &str {
        self.value.get("name").and_then(Value::as_str).unwrap_or("")
    }

    pub fn set_name(&mut self, name: &str) {
        self.insert_top("name", Value::String(name.to_string()));
    }

    pub fn icon(&self) -> &str {
        self.value.get("icon").and_then(Value::as_str).unwrap_or("")
    }

    pub fn set_icon(&mut self, icon: &str) {
        self.insert_top("icon", Value::String(icon.to_string()));
    }

    pub fn repository(&self) -> Option<&str> {
        self.value.get("links")?.get("repository")?.as_str()
    }

    /// Set `links.repository`, creating the `links` object if absent.
    pub fn set_repository(&mut self, url: &str) {
        self.links_mut()
            .insert("repository".to_string(), Value::String(url.to_string()));
    }

    pub fn documentation(&self) -> Option<&str> {
        self.value.get("links")?.get("documentation")?.as_str()
    }

    /// Set `links.documentation`, creating the `links` object if absent.
    pub fn set_documentation(&mut self, url: &str) {
        self.links_mut()
            .insert("documentation".to_string(), Value::String(url.to_string()));
    }

    pub fn transport_type(&self) -> Option<&str> {
        self.value.get("transport")?.get("type")?.as_str()
    }

    /// The stdio launcher command, when the transport declares one.
    pub fn command(&self) -> Option<&str> {
        self.value.get("transport")?.get("command")?.as_str()
    }

    pub fn transport_url(&self) -> Option<&str> {
        self.value.get("transport")?.get("url")?.as_str()
    }

    /// Replace `transport.args` wholesale (package-name corrections).
    pub fn set_args(&mut self, args: &[String]) {
        let rendered = Value::Array(
            args.iter()
                .map(|arg| Value::String(arg.clone()))
                .collect(),
        );
        self.transport_obj_mut()
            .insert("args".to_string(), rendered);
    }

    /// Mutable view of `transport.metadata.inputs`, when present.
    pub fn inputs_mut(&mut self) -> Option<&mut Vec<Value>> {
        self.value
            .get_mut("transport")?
            .get_mut("metadata")?
            .get_mut("inputs")?
            .as_array_mut()
    }

    /// Serialize with stable formatting: two-space indent, trailing
    /// newline, field order preserved from input.
    pub fn to_bytes(&self) -> Result<Vec<u8>, RecordError> {
        let mut text = serde_json::to_string_pretty(&self.value)
            .map_err(|e| RecordError::Serialize(e.to_string()))?;
        text.push('\n');
        Ok(text.into_bytes())
    }

    /// Persist to `path` atomically: the bytes land under a unique temp
    /// name first and are renamed into place, so a failure mid-write
    /// never leaves a truncated record behind.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), RecordError> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;
        write_bytes_atomic(path, &bytes)
    }

    fn insert_top(&mut self, key: &str, value: Value) {
        if let Value::Object(map) = &mut self.value {
            map.insert(key.to_string(), value);
        }
    }

    fn links_mut(&mut self) -> &mut serde_json::Map<String, Value> {
        self.nested_obj_mut("links")
    }

    fn transport_obj_mut(&mut self) -> &mut serde_json::Map<String, Value> {
        self.nested_obj_mut("transport")
    }

    fn nested_obj_mut(&mut self, key: &str) -> &mut serde_json::Map<String, Value> {
        let map = self
            .value
            .as_object_mut()
            .expect("record invariant: top-level value is an object");
        let entry = map
            .entry(key.to_string())
            .or_insert_with(|| Value::Object(serde_json::Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(serde_json::Map::new());
        }
        entry.as_object_mut().expect("entry was just made an object")
    }
}

/// Write `bytes` to `path` through a unique temp file and rename.
pub fn write_bytes_atomic(path: &Path, bytes: &[u8]) -> Result<(), RecordError> {
    let io_err = |p: &Path, e: &dyn std::fmt::Display| RecordError::Io {
        path: p.display().to_string(),
        message: e.to_string(),
    };

    let tmp_path = tmp_write_path(path);
    let write_result = (|| -> Result<(), RecordError> {
        let mut file = File::create(&tmp_path).map_err(|e| io_err(&tmp_path, &e))?;
        file.write_all(bytes).map_err(|e| io_err(&tmp_path, &e))?;
        file.sync_all().map_err(|e| io_err(&tmp_path, &e))?;
        Ok(())
    })();

    if let Err(error) = write_result {
        let _ = fs::remove_file(&tmp_path);
        return Err(error);
    }

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        RecordError::Io {
            path: format!("{} -> {}", tmp_path.display(), path.display()),
            message: e.to_string(),
        }
    })
}

fn tmp_write_path(path: &Path) -> PathBuf {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let mut tmp: OsString = path.as_os_str().to_os_string();
    tmp.push(format!(".tmp.{}.{}", std::process::id(), unique));
    PathBuf::from(tmp)
}

/// Filename minus directory and `.json` extension.
pub fn basename_of(path: &str) -> &str {
    let name = path.rsplit('/').next().unwrap_or(path);
    name.strip_suffix(".json").unwrap_or(name)
}

/// Repository-relative path for a record basename.
pub fn record_path(records_dir: &str, basename: &str) -> String {
    format!("{}/{basename}.json", records_dir.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
  "id": "community.example-uvx",
  "name": "Example",
  "icon": "https://example.com/icon.png",
  "description": "An example service",
  "transport": {
    "type": "stdio",
    "command": "uvx",
    "args": [
      "example-server"
    ],
    "metadata": {
      "inputs": [
        {
          "id": "path",
          "type": "dir"
        }
      ]
    }
  }
}
"#;

    fn temp_path(prefix: &str) -> PathBuf {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "defmend-record-{prefix}-{}-{unique}.json",
            std::process::id()
        ))
    }

    #[test]
    fn unmodified_record_round_trips_byte_for_byte() {
        let record = ServerRecord::from_str(SAMPLE, "<test>").expect("sample should parse");
        let bytes = record.to_bytes().expect("sample should serialize");
        assert_eq!(String::from_utf8(bytes).unwrap(), SAMPLE);
    }

    #[test]
    fn typed_accessors_read_expected_fields() {
        let record = ServerRecord::from_str(SAMPLE, "<test>").expect("sample should parse");
        assert_eq!(record.id(), "community.example-uvx");
        assert_eq!(record.name(), "Example");
        assert_eq!(record.transport_type(), Some("stdio"));
        assert_eq!(record.command(), Some("uvx"));
        assert_eq!(record.repository(), None);
    }

    #[test]
    fn set_repository_creates_links_object() {
        let mut record = ServerRecord::from_str(SAMPLE, "<test>").expect("sample should parse");
        record.set_repository("https://github.com/example/example-server");
        assert_eq!(
            record.repository(),
            Some("https://github.com/example/example-server")
        );
        // The new object lands after the existing fields; everything
        // before it keeps its position.
        let text = String::from_utf8(record.to_bytes().unwrap()).unwrap();
        assert!(text.starts_with("{\n  \"id\": \"community.example-uvx\""));
    }

    #[test]
    fn set_args_replaces_transport_args() {
        let mut record = ServerRecord::from_str(SAMPLE, "<test>").expect("sample should parse");
        record.set_args(&["corrected-package".to_string()]);
        let args = record.value()["transport"]["args"]
            .as_array()
            .expect("args should be an array");
        assert_eq!(args.len(), 1);
        assert_eq!(args[0], "corrected-package");
    }

    #[test]
    fn rejects_non_object_top_level() {
        let result = ServerRecord::from_str("[1, 2, 3]", "<test>");
        assert!(matches!(result, Err(RecordError::NotAnObject { .. })));
    }

    #[test]
    fn save_replaces_file_atomically() {
        let path = temp_path("atomic");
        let mut record = ServerRecord::from_str(SAMPLE, "<test>").expect("sample should parse");
        record.save(&path).expect("first save should succeed");

        record.set_id("community.example-renamed");
        record.save(&path).expect("second save should succeed");

        let text = fs::read_to_string(&path).expect("record should exist");
        assert!(text.contains("community.example-renamed"));
        assert!(text.ends_with('\n'));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn basename_strips_directory_and_extension() {
        assert_eq!(basename_of("servers/com.resend-mcp.json"), "com.resend-mcp");
        assert_eq!(basename_of("com.resend-mcp.json"), "com.resend-mcp");
        assert_eq!(basename_of("servers/nested/a.b.json"), "a.b");
    }

    #[test]
    fn record_path_joins_basename() {
        assert_eq!(
            record_path("servers", "community.tool-npx"),
            "servers/community.tool-npx.json"
        );
        assert_eq!(record_path("servers/", "x.y"), "servers/x.y.json");
    }
}
