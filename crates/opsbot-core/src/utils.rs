//! Utility helpers — data paths and log-friendly string previews.

use std::path::PathBuf;

/// Get the Opsbot data directory (e.g. `~/.opsbot/`).
pub fn get_data_path() -> PathBuf {
    let home = home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".opsbot")
}

/// Get the REPL history file (e.g. `~/.opsbot/history/cli_history`).
pub fn get_history_path() -> PathBuf {
    get_data_path().join("history").join("cli_history")
}

/// Truncate a string to `max_len` characters, adding "..." if truncated.
/// Unicode-safe.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

/// Render a JSON value for a log line: strings as-is, everything else compact JSON.
pub fn preview_value(value: &serde_json::Value, max_len: usize) -> String {
    let rendered = match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    truncate_string(&rendered, max_len)
}

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| std::env::var("USERPROFILE").ok().map(PathBuf::from))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truncate_short_string() {
        assert_eq!(truncate_string("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_exact_length() {
        assert_eq!(truncate_string("hello", 5), "hello");
    }

    #[test]
    fn test_truncate_long_string() {
        let result = truncate_string("hello world, this is a long string", 15);
        assert_eq!(result, "hello world,...");
        assert!(result.len() <= 15);
    }

    #[test]
    fn test_truncate_unicode() {
        let result = truncate_string("こんにちは世界です", 5);
        assert_eq!(result, "こん...");
    }

    #[test]
    fn test_preview_string_is_unquoted() {
        assert_eq!(preview_value(&json!("London"), 100), "London");
    }

    #[test]
    fn test_preview_object_is_compact_json() {
        let v = json!({"temperature": 15});
        assert_eq!(preview_value(&v, 100), r#"{"temperature":15}"#);
        assert_eq!(preview_value(&v, 8), "{\"tem...");
    }

    #[test]
    fn test_data_path_ends_with_opsbot() {
        assert!(get_data_path().ends_with(".opsbot"));
    }

    #[test]
    fn test_history_path_under_data_dir() {
        let path = get_history_path();
        assert!(path.ends_with("history/cli_history"));
        assert!(path.starts_with(get_data_path()));
    }
}
