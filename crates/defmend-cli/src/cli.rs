use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "defmend",
    about = "Defmend: batch-normalize server definition records across contribution branches",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rebase, fix, canonicalize, and republish every contribution branch
    Process {
        /// Path inside the repository to operate on
        #[arg(long, default_value = ".")]
        repo: String,

        /// Trunk branch all contributions are rebased onto
        #[arg(long, default_value = "main")]
        trunk: String,

        /// Subdirectory holding the record files
        #[arg(long, default_value = "servers")]
        records_dir: String,

        /// Prefix of contribution branches to enumerate
        #[arg(long, default_value = "claude/add-")]
        branch_prefix: String,

        /// Prefix of republished fix branches
        #[arg(long, default_value = "fix/")]
        fix_prefix: String,

        /// Remote to pull contribution branches from and push fixes to
        #[arg(long, default_value = "origin")]
        remote: String,

        /// JSON file replacing the compiled-in fix tables
        #[arg(long)]
        tables: Option<String>,

        /// Commit author override ("Name <email>")
        #[arg(long)]
        author: Option<String>,

        /// Request a code review for each pushed fix branch
        #[arg(long)]
        create_reviews: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Cross-branch report of transport tooling and naming-suffix gaps
    Inventory {
        /// Path inside the repository to operate on
        #[arg(long, default_value = ".")]
        repo: String,

        /// Trunk branch to compare against
        #[arg(long, default_value = "main")]
        trunk: String,

        /// Subdirectory holding the record files
        #[arg(long, default_value = "servers")]
        records_dir: String,

        /// Prefix of local branches to scan
        #[arg(long, default_value = "fix/")]
        branch_prefix: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Apply the fix rules to one record file in place
    FixFile {
        /// Path to the record file
        path: String,

        /// JSON file replacing the compiled-in fix tables
        #[arg(long)]
        tables: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
