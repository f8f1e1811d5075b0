use crate::support;
use defmend_pipeline::collect_inventory;
use serde_json::json;

pub fn run(repo: String, trunk: String, records_dir: String, branch_prefix: String, json: bool) {
    let git = support::discover_or_exit(&repo);
    let report = collect_inventory(&git, &trunk, &records_dir, &branch_prefix).unwrap_or_else(
        |err| {
            eprintln!("error: inventory scan failed: {err}");
            std::process::exit(2);
        },
    );

    if json {
        let needing: Vec<_> = report
            .needing_rename()
            .into_iter()
            .map(|(row, suggested)| {
                json!({
                    "branch": row.branch,
                    "file": row.file,
                    "suggested": suggested,
                })
            })
            .collect();
        support::print_json_or_exit(&json!({
            "schema": 1,
            "action": "inventory",
            "rows": report.rows,
            "needingRename": needing,
            "repos": report.unique_repos(),
        }));
    } else {
        print!("{}", report.render());
    }
}
