//! Canonicalization rename execution against a real throwaway git
//! repository: the failed-move rollback and the trunk-collision skip.
//! The git-backed test is skipped when git is not available.

use defmend_engine::{Canonicalizer, FixTables};
use defmend_git::GitClient;
use defmend_record::ServerRecord;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

struct TempDirGuard {
    path: PathBuf,
}

impl TempDirGuard {
    fn new(prefix: &str) -> Self {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        let path = std::env::temp_dir().join(format!(
            "defmend-canon-{prefix}-{}-{unique}",
            std::process::id()
        ));
        fs::create_dir_all(&path).expect("temp dir should be created");
        Self { path }
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempDirGuard {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

fn git_ok(cwd: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(cwd)
        .output()
        .expect("git command should execute");
    if !output.status.success() {
        panic!(
            "git {:?} failed in {}\nstderr:\n{}",
            args,
            cwd.display(),
            String::from_utf8_lossy(&output.stderr),
        );
    }
}

const RECORD: &str = r#"{
  "id": "community.example",
  "name": "Example",
  "transport": {
    "type": "stdio",
    "command": "uvx",
    "args": ["example-server"]
  }
}
"#;

/// An initialized repository with the record committed at
/// `servers/community.example.json`.
fn setup_repo(guard: &TempDirGuard) -> PathBuf {
    let work = guard.path().join("work");
    fs::create_dir_all(work.join("servers")).expect("servers dir should be created");
    git_ok(&work, &["init"]);
    git_ok(&work, &["config", "user.name", "Fixture"]);
    git_ok(&work, &["config", "user.email", "fixture@example.com"]);
    git_ok(&work, &["config", "commit.gpgsign", "false"]);
    fs::write(work.join("servers/community.example.json"), RECORD)
        .expect("record should write");
    git_ok(&work, &["add", "-A"]);
    git_ok(&work, &["commit", "-m", "init"]);
    work
}

#[test]
fn failed_move_restores_the_original_record_bytes() {
    if !GitClient::is_available() {
        return;
    }
    let guard = TempDirGuard::new("rollback");
    let work = setup_repo(&guard);

    // An untracked file at the destination makes `git mv` refuse.
    fs::write(
        work.join("servers/community.example-uvx.json"),
        "occupied\n",
    )
    .expect("blocker should write");

    let git_client = GitClient::at(&work);
    let tables = FixTables::builtin();
    let canonicalizer = Canonicalizer::new(&git_client, "servers", &tables, BTreeSet::new());

    let result = canonicalizer.canonicalize_file("servers/community.example.json");
    assert!(result.is_err(), "move failure should surface as an error");

    // Neither mixed state persists: the old path holds the original
    // bytes with the original id, the destination is untouched.
    let old = fs::read_to_string(work.join("servers/community.example.json"))
        .expect("original file should still exist");
    assert_eq!(old, RECORD);
    let record = ServerRecord::from_path(work.join("servers/community.example.json"))
        .expect("restored record should parse");
    assert_eq!(record.id(), "community.example");
    let blocker = fs::read_to_string(work.join("servers/community.example-uvx.json"))
        .expect("destination should still exist");
    assert_eq!(blocker, "occupied\n");
}

#[test]
fn trunk_collision_leaves_the_record_untouched_and_flags_it() {
    let guard = TempDirGuard::new("collision");
    let work = guard.path().join("work");
    fs::create_dir_all(work.join("servers")).expect("servers dir should be created");
    fs::write(work.join("servers/community.example.json"), RECORD)
        .expect("record should write");

    let git_client = GitClient::at(&work);
    let tables = FixTables::builtin();
    let trunk_files: BTreeSet<String> =
        ["servers/community.example-uvx.json".to_string()].into();
    let canonicalizer = Canonicalizer::new(&git_client, "servers", &tables, trunk_files);

    // The collision is detected before any mutation, so no git repository
    // is needed for this path.
    let outcome = canonicalizer
        .canonicalize_file("servers/community.example.json")
        .expect("collision is a flag, not an error");
    assert!(outcome.renames.is_empty(), "renames: {:?}", outcome.renames);
    assert_eq!(outcome.flags.len(), 1);
    assert!(
        outcome.flags[0].contains("collides with trunk"),
        "flags: {:?}",
        outcome.flags
    );
    let unchanged = fs::read_to_string(work.join("servers/community.example.json"))
        .expect("record should still exist");
    assert_eq!(unchanged, RECORD);
}
