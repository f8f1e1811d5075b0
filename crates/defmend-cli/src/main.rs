//! Defmend CLI: the `defmend` command.

mod cli;
mod commands;
mod support;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Process {
            repo,
            trunk,
            records_dir,
            branch_prefix,
            fix_prefix,
            remote,
            tables,
            author,
            create_reviews,
            json,
        } => commands::process::run(commands::process::Args {
            repo,
            trunk,
            records_dir,
            branch_prefix,
            fix_prefix,
            remote,
            tables,
            author,
            create_reviews,
            json,
        }),

        Commands::Inventory {
            repo,
            trunk,
            records_dir,
            branch_prefix,
            json,
        } => commands::inventory::run(repo, trunk, records_dir, branch_prefix, json),

        Commands::FixFile { path, tables, json } => commands::fix_file::run(path, tables, json),
    }
}
