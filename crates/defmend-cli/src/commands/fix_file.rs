use crate::support;
use defmend_engine::apply_fixes;
use defmend_record::ServerRecord;
use serde_json::json;

pub fn run(path: String, tables: Option<String>, json: bool) {
    let tables = support::tables_or_exit(tables.as_deref());
    let mut record = ServerRecord::from_path(&path).unwrap_or_else(|err| {
        eprintln!("error: {err}");
        std::process::exit(2);
    });

    let fixes = apply_fixes(&mut record, &tables);
    // Only a changed record gets written back; diffs stay clean.
    if !fixes.is_empty()
        && let Err(err) = record.save(&path)
    {
        eprintln!("error: {err}");
        std::process::exit(2);
    }

    if json {
        support::print_json_or_exit(&json!({
            "schema": 1,
            "action": "fix-file",
            "path": path,
            "id": record.id(),
            "fixes": fixes,
        }));
    } else if fixes.is_empty() {
        println!("[fix-file] OK ({path}: nothing to fix)");
    } else {
        println!("[fix-file] FIXED ({path}: {} fixes)", fixes.len());
        for fix in &fixes {
            println!("  - {fix}");
        }
    }
}
