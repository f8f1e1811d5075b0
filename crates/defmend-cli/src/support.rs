use defmend_engine::FixTables;
use defmend_git::GitClient;

pub fn discover_or_exit(repo: &str) -> GitClient {
    GitClient::discover(repo).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(2);
    })
}

pub fn tables_or_exit(path: Option<&str>) -> FixTables {
    match path {
        None => FixTables::builtin(),
        Some(path) => FixTables::from_json_path(path).unwrap_or_else(|e| {
            eprintln!("error: {e}");
            std::process::exit(2);
        }),
    }
}

pub fn print_json_or_exit(payload: &serde_json::Value) {
    let rendered = serde_json::to_string_pretty(payload).unwrap_or_else(|e| {
        eprintln!("error: failed to render payload: {e}");
        std::process::exit(2);
    });
    println!("{rendered}");
}
