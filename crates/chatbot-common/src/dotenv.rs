//! Minimal `.env` support so API keys can live next to the binary.

use std::path::PathBuf;

/// Load `KEY=VALUE` lines from the first `.env` found in the current
/// directory or the workspace root. Variables already set in the
/// environment are left alone. Returns the file that was read.
pub fn load_dotenv() -> Option<PathBuf> {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let candidates = [
        PathBuf::from(".env"),
        // Workspace root, two levels up from crates/chatbot-common/
        manifest_dir.join("..").join("..").join(".env"),
    ];

    for path in candidates {
        if let Ok(contents) = std::fs::read_to_string(&path) {
            for (key, value) in parse_dotenv(&contents) {
                if std::env::var_os(key).is_none() {
                    std::env::set_var(key, value);
                }
            }
            return Some(path);
        }
    }
    None
}

/// Parse `.env` contents. Blank lines, `#` comments and lines without `=`
/// are skipped; surrounding quotes on values are stripped.
pub fn parse_dotenv(contents: &str) -> Vec<(&str, &str)> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| {
            let key = key.trim();
            let key = key.strip_prefix("export ").unwrap_or(key).trim();
            let value = value.trim().trim_matches('"').trim_matches('\'');
            (key, value)
        })
        .filter(|(key, _)| !key.is_empty())
        .collect()
}
