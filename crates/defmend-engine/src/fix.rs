//! The fix engine: idempotent per-record repairs.
//!
//! Rules run in a fixed order and touch disjoint fields. Every rule is
//! diff-gated: a value already equal to its correction produces neither a
//! mutation nor a fix entry, so a second pass over a fixed record returns
//! an empty list and the caller never writes an unchanged file.

use crate::tables::FixTables;
use defmend_record::{DEFAULT_INPUT_TYPE, ServerRecord, is_valid_input_type};
use serde_json::Value;

/// Apply all fix rules to `record` in place. Returns one human-readable
/// entry per repair, in rule order; empty means nothing changed.
pub fn apply_fixes(record: &mut ServerRecord, tables: &FixTables) -> Vec<String> {
    let mut fixes = Vec::new();

    // 1. Input-type repair: out-of-enumeration kinds coerce to text.
    if let Some(inputs) = record.inputs_mut() {
        for input in inputs.iter_mut() {
            let Some(entry) = input.as_object_mut() else {
                continue;
            };
            let current = entry
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string();
            if !is_valid_input_type(&current) {
                let input_id = entry
                    .get("id")
                    .and_then(Value::as_str)
                    .unwrap_or("?")
                    .to_string();
                entry.insert(
                    "type".to_string(),
                    Value::String(DEFAULT_INPUT_TYPE.to_string()),
                );
                fixes.push(format!(
                    "input type '{current}' -> '{DEFAULT_INPUT_TYPE}' for {input_id}"
                ));
            }
        }
    }

    let id = record.id().to_string();

    // 2. Icon repair: generic hub placeholder -> actual upstream image.
    if let Some(target) = tables.icons.get(&id)
        && record.icon() != target
    {
        record.set_icon(target);
        fixes.push("icon updated".to_string());
    }

    // 3. Repository-link repair.
    if let Some(target) = tables.repositories.get(&id)
        && record.repository() != Some(target.as_str())
    {
        record.set_repository(target);
        fixes.push("repo URL fixed".to_string());
    }

    // 4. Documentation-link repair.
    if let Some(target) = tables.documentation.get(&id)
        && record.documentation() != Some(target.as_str())
    {
        record.set_documentation(target);
        fixes.push("doc URL fixed".to_string());
    }

    // 5. Org-page repair: the link is definitionally wrong for this one
    // id, so no table lookup beyond the match itself.
    if let Some(org) = &tables.org_page
        && org.id == id
        && record.repository() != Some(org.repository.as_str())
    {
        record.set_repository(&org.repository);
        fixes.push("repo URL: org page -> specific repo".to_string());
    }

    // 6. Package-argument repair: the installed package name was wrong.
    if let Some(args) = tables.package_args.get(&id)
        && current_args(record).as_deref() != Some(args.as_slice())
    {
        record.set_args(args);
        fixes.push("fixed package name".to_string());
    }

    fixes
}

fn current_args(record: &ServerRecord) -> Option<Vec<String>> {
    let args = record.value().get("transport")?.get("args")?.as_array()?;
    Some(
        args.iter()
            .map(|v| v.as_str().unwrap_or("").to_string())
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::OrgPageFix;

    fn sample(id: &str) -> ServerRecord {
        let text = format!(
            r#"{{
  "id": "{id}",
  "name": "Example",
  "icon": "https://avatars.githubusercontent.com/u/182288589?v=4",
  "transport": {{
    "type": "stdio",
    "command": "uvx",
    "args": ["example-server"],
    "metadata": {{
      "inputs": [
        {{"id": "path", "type": "dir"}},
        {{"id": "token", "type": "text"}}
      ]
    }}
  }}
}}"#
        );
        ServerRecord::from_str(&text, "<test>").expect("sample should parse")
    }

    #[test]
    fn invalid_input_type_coerces_to_text() {
        let mut record = sample("x.example");
        let fixes = apply_fixes(&mut record, &FixTables::default());
        assert_eq!(fixes, vec!["input type 'dir' -> 'text' for path"]);
        let inputs = record.value()["transport"]["metadata"]["inputs"]
            .as_array()
            .unwrap();
        assert_eq!(inputs[0]["type"], "text");
        assert_eq!(inputs[1]["type"], "text");
    }

    #[test]
    fn icon_repair_applies_from_table() {
        let mut tables = FixTables::default();
        tables.icons.insert(
            "community.example-uvx".to_string(),
            "https://example.com/real-icon.png".to_string(),
        );
        let mut record = sample("community.example-uvx");
        let fixes = apply_fixes(&mut record, &tables);
        assert!(fixes.contains(&"icon updated".to_string()));
        assert_eq!(record.icon(), "https://example.com/real-icon.png");
    }

    #[test]
    fn absent_table_entry_is_a_silent_noop() {
        let mut tables = FixTables::default();
        tables
            .icons
            .insert("some.other-id".to_string(), "https://x".to_string());
        let mut record = sample("x.example");
        let original_icon = record.icon().to_string();
        let fixes = apply_fixes(&mut record, &tables);
        assert_eq!(fixes, vec!["input type 'dir' -> 'text' for path"]);
        assert_eq!(record.icon(), original_icon);
    }

    #[test]
    fn repository_repair_creates_links() {
        let mut tables = FixTables::default();
        tables.repositories.insert(
            "x.example".to_string(),
            "https://github.com/acme/example".to_string(),
        );
        let mut record = sample("x.example");
        let fixes = apply_fixes(&mut record, &tables);
        assert!(fixes.contains(&"repo URL fixed".to_string()));
        assert_eq!(record.repository(), Some("https://github.com/acme/example"));
    }

    #[test]
    fn org_page_repair_overwrites_repository() {
        let mut tables = FixTables::default();
        tables.org_page = Some(OrgPageFix {
            id: "x.example".to_string(),
            repository: "https://github.com/acme/specific-repo".to_string(),
        });
        let mut record = sample("x.example");
        record.set_repository("https://github.com/acme");
        let fixes = apply_fixes(&mut record, &tables);
        assert!(fixes.contains(&"repo URL: org page -> specific repo".to_string()));
        assert_eq!(
            record.repository(),
            Some("https://github.com/acme/specific-repo")
        );
    }

    #[test]
    fn package_args_repair_replaces_args() {
        let mut tables = FixTables::default();
        tables
            .package_args
            .insert("x.example".to_string(), vec!["corrected-pkg".to_string()]);
        let mut record = sample("x.example");
        let fixes = apply_fixes(&mut record, &tables);
        assert!(fixes.contains(&"fixed package name".to_string()));
        assert_eq!(record.value()["transport"]["args"][0], "corrected-pkg");
    }

    #[test]
    fn second_pass_is_a_noop() {
        let mut tables = FixTables::default();
        tables
            .icons
            .insert("x.example".to_string(), "https://real".to_string());
        tables.repositories.insert(
            "x.example".to_string(),
            "https://github.com/acme/example".to_string(),
        );
        tables
            .package_args
            .insert("x.example".to_string(), vec!["pkg".to_string()]);
        tables.org_page = Some(OrgPageFix {
            id: "x.example".to_string(),
            repository: "https://github.com/acme/example".to_string(),
        });

        let mut record = sample("x.example");
        let first = apply_fixes(&mut record, &tables);
        assert!(!first.is_empty());

        let snapshot = record.clone();
        let second = apply_fixes(&mut record, &tables);
        assert!(second.is_empty(), "second pass applied: {second:?}");
        assert_eq!(record, snapshot);
    }
}
