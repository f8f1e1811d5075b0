use crate::support;
use defmend_pipeline::{BranchNaming, Pipeline, PipelineConfig, failure_count, render_summary};
use serde_json::json;

pub struct Args {
    pub repo: String,
    pub trunk: String,
    pub records_dir: String,
    pub branch_prefix: String,
    pub fix_prefix: String,
    pub remote: String,
    pub tables: Option<String>,
    pub author: Option<String>,
    pub create_reviews: bool,
    pub json: bool,
}

pub fn run(args: Args) {
    let git = support::discover_or_exit(&args.repo);
    let tables = support::tables_or_exit(args.tables.as_deref());
    let config = PipelineConfig {
        trunk: args.trunk,
        records_dir: args.records_dir,
        remote: args.remote,
        naming: BranchNaming {
            source_prefix: args.branch_prefix,
            fix_prefix: args.fix_prefix,
        },
        author_override: args.author,
        create_reviews: args.create_reviews,
    };
    let pipeline = Pipeline::new(&git, &tables, &config);

    if let Err(err) = pipeline.ensure_on_trunk() {
        eprintln!("error: cannot check out trunk: {err}");
        std::process::exit(2);
    }
    let branches = pipeline.source_branches().unwrap_or_else(|err| {
        eprintln!("error: cannot list contribution branches: {err}");
        std::process::exit(2);
    });

    if !args.json {
        println!("Found {} branches to process", branches.len());
    }

    let mut outcomes = Vec::with_capacity(branches.len());
    for (index, branch) in branches.iter().enumerate() {
        if !args.json {
            println!("\n[{}/{}] Processing {branch}...", index + 1, branches.len());
        }
        match pipeline.process_branch(branch) {
            Ok(outcome) => {
                if !args.json {
                    println!("  Status: {}", outcome.status.as_str());
                    for fix in &outcome.fixes {
                        println!("    Fix: {}", fix.note);
                    }
                    for rename in &outcome.renames {
                        println!("    Rename: {} -> {}", rename.old_id, rename.new_id);
                    }
                    for defect in &outcome.defects {
                        println!("    Defect: {defect}");
                    }
                    if let Some(diagnostic) = &outcome.diagnostic {
                        println!("    Diagnostic: {diagnostic}");
                    }
                }
                outcomes.push(outcome);
            }
            // The shared working tree is in an unknown state; stopping
            // here is safer than processing more branches on top of it.
            Err(err) => {
                eprintln!("error: {err}");
                std::process::exit(2);
            }
        }
    }

    let failures = failure_count(&outcomes);
    if args.json {
        support::print_json_or_exit(&json!({
            "schema": 1,
            "action": "process",
            "branches": outcomes.len(),
            "failures": failures,
            "outcomes": outcomes,
        }));
    } else {
        println!("\n\n{}", render_summary(&outcomes));
    }

    if failures > 0 {
        std::process::exit(1);
    }
}
