//! Placeholder resolution — substitute earlier step outputs into tool arguments.
//!
//! A string argument containing `{{step_N.path}}` (any number of braces) is
//! replaced by the value found at `path` inside step N's output. Only the first
//! placeholder in a string is honored and it replaces the *whole* string:
//! `"repo {{step_1.name}}"` resolves to just the name, not `"repo <name>"`.
//!
//! When a reference cannot be satisfied the original string is kept, so the
//! tool sees an informative literal instead of nothing.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::warn;

use crate::plan::ResultContext;

/// `{+step_<digits><path>}+`; the path is everything up to the first `}`.
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{+step_([0-9]+)(.*?)\}+").expect("placeholder regex is valid")
});

/// `name[index]` or a bare `[index]` path segment.
static INDEXED_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\w*)\[([0-9]+)\]$").expect("segment regex is valid"));

static NULL: Value = Value::Null;

/// Resolve every argument of a step against the outputs recorded so far.
///
/// Keys are preserved; non-string values pass through untouched.
pub fn resolve_args(args: &Map<String, Value>, context: &ResultContext) -> Map<String, Value> {
    args.iter()
        .map(|(key, value)| {
            let resolved = match value {
                Value::String(raw) => resolve_str(raw, context),
                other => other.clone(),
            };
            (key.clone(), resolved)
        })
        .collect()
}

/// Resolve a single string argument.
pub fn resolve_str(raw: &str, context: &ResultContext) -> Value {
    let Some(caps) = PLACEHOLDER.captures(raw) else {
        return Value::String(raw.to_string());
    };

    let Ok(step_id) = caps[1].parse::<u64>() else {
        warn!(placeholder = raw, "step id out of range, keeping literal");
        return Value::String(raw.to_string());
    };
    let path = caps.get(2).map_or("", |m| m.as_str());

    let Some(output) = context.get(step_id) else {
        warn!(placeholder = raw, step_id, "referenced step has no output, keeping literal");
        return Value::String(raw.to_string());
    };

    match traverse(output, path) {
        Some(value) if !value.is_null() => value.clone(),
        _ => {
            warn!(placeholder = raw, step_id, path, "could not resolve placeholder path, keeping literal");
            Value::String(raw.to_string())
        }
    }
}

/// Walk a dotted path (`.repo.stars`, `[0].name`, `items[2].url`, `.0`) from `root`.
///
/// `None` means the walk aborted. A missing mapping key does not abort: it
/// yields `null` and the walk continues (a further segment on `null` aborts).
fn traverse<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = root;

    for segment in path.trim_matches('.').split('.') {
        if segment.is_empty() {
            continue;
        }

        if let Some(caps) = INDEXED_SEGMENT.captures(segment) {
            let index: usize = caps[2].parse().ok()?;
            let container = match &caps[1] {
                "" => current,
                name => current.as_object()?.get(name)?,
            };
            current = container.as_array()?.get(index)?;
        } else if current.is_array() && segment.bytes().all(|b| b.is_ascii_digit()) {
            let index: usize = segment.parse().ok()?;
            current = current.as_array()?.get(index)?;
        } else {
            current = current.as_object()?.get(segment).unwrap_or(&NULL);
        }
    }

    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn repos_ctx() -> ResultContext {
        ResultContext::from([(1, json!([{ "name": "a" }, { "name": "b" }]))])
    }

    fn args(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(m) => m,
            _ => panic!("test args must be an object"),
        }
    }

    #[test]
    fn test_array_index_then_key() {
        assert_eq!(resolve_str("{{step_1[1].name}}", &repos_ctx()), json!("b"));
        assert_eq!(resolve_str("{{step_1[0].name}}", &repos_ctx()), json!("a"));
    }

    #[test]
    fn test_dotted_keys() {
        let ctx = ResultContext::from([(1, json!({ "repo": { "stars": 42 } }))]);
        assert_eq!(resolve_str("{{step_1.repo.stars}}", &ctx), json!(42));
    }

    #[test]
    fn test_whole_output() {
        assert_eq!(
            resolve_str("{{step_1}}", &repos_ctx()),
            json!([{ "name": "a" }, { "name": "b" }])
        );
    }

    #[test]
    fn test_single_braces() {
        let ctx = ResultContext::from([(2, json!({ "name": "tokio" }))]);
        assert_eq!(resolve_str("{step_2.name}", &ctx), json!("tokio"));
    }

    #[test]
    fn test_named_index_segment() {
        let ctx = ResultContext::from([(1, json!({ "items": [{ "url": "u0" }, { "url": "u1" }] }))]);
        assert_eq!(resolve_str("{{step_1.items[1].url}}", &ctx), json!("u1"));
    }

    #[test]
    fn test_numeric_segment_on_array_and_object() {
        let ctx = ResultContext::from([
            (1, json!(["zero", "one"])),
            (2, json!({ "0": "key zero" })),
        ]);
        assert_eq!(resolve_str("{{step_1.1}}", &ctx), json!("one"));
        assert_eq!(resolve_str("{{step_2.0}}", &ctx), json!("key zero"));
    }

    #[test]
    fn test_non_reference_unchanged() {
        let ctx = repos_ctx();
        for raw in ["London", "", "{{step_}}", "step_1", "{{ step_1 }}", "{{other_1}}"] {
            assert_eq!(resolve_str(raw, &ctx), json!(raw));
        }
    }

    #[test]
    fn test_non_strings_pass_through() {
        let raw = args(json!({ "limit": 5, "flag": true, "nested": { "x": "{{step_1}}" }, "none": null }));
        assert_eq!(resolve_args(&raw, &repos_ctx()), raw);
    }

    #[test]
    fn test_missing_step_falls_back() {
        assert_eq!(resolve_str("{{step_9.name}}", &repos_ctx()), json!("{{step_9.name}}"));
    }

    #[test]
    fn test_out_of_range_falls_back() {
        let ctx = repos_ctx();
        assert_eq!(resolve_str("{{step_1[5].name}}", &ctx), json!("{{step_1[5].name}}"));
        assert_eq!(resolve_str("{{step_1.7}}", &ctx), json!("{{step_1.7}}"));
    }

    #[test]
    fn test_type_mismatch_falls_back() {
        let ctx = ResultContext::from([(1, json!("plain text")), (2, json!({ "list": 3 }))]);
        assert_eq!(resolve_str("{{step_1.name}}", &ctx), json!("{{step_1.name}}"));
        assert_eq!(resolve_str("{{step_2.list[0]}}", &ctx), json!("{{step_2.list[0]}}"));
        assert_eq!(resolve_str("{{step_2.list.x}}", &ctx), json!("{{step_2.list.x}}"));
        assert_eq!(
            resolve_str("{{step_1[0]}}", &ResultContext::from([(1, json!({ "a": 1 }))])),
            json!("{{step_1[0]}}")
        );
    }

    #[test]
    fn test_missing_key_yields_null_then_falls_back() {
        let ctx = ResultContext::from([(1, json!({ "repo": { "stars": 42 }, "empty": null }))]);
        // missing final key
        assert_eq!(resolve_str("{{step_1.repo.forks}}", &ctx), json!("{{step_1.repo.forks}}"));
        // missing intermediate key, then another segment on null
        assert_eq!(resolve_str("{{step_1.owner.login}}", &ctx), json!("{{step_1.owner.login}}"));
        // present but null
        assert_eq!(resolve_str("{{step_1.empty}}", &ctx), json!("{{step_1.empty}}"));
    }

    #[test]
    fn test_null_output_falls_back() {
        let ctx = ResultContext::from([(1, Value::Null)]);
        assert_eq!(resolve_str("{{step_1}}", &ctx), json!("{{step_1}}"));
    }

    #[test]
    fn test_surrounding_text_discarded() {
        let ctx = ResultContext::from([(1, json!({ "name": "tokio-rs/tokio" }))]);
        assert_eq!(
            resolve_str("repo: {{step_1.name}} please", &ctx),
            json!("tokio-rs/tokio")
        );
    }

    #[test]
    fn test_first_match_wins() {
        let ctx = ResultContext::from([(1, json!("one")), (2, json!("two"))]);
        assert_eq!(resolve_str("{{step_2}} and {{step_1}}", &ctx), json!("two"));
    }

    #[test]
    fn test_huge_step_id_falls_back() {
        let raw = "{{step_99999999999999999999999}}";
        assert_eq!(resolve_str(raw, &repos_ctx()), json!(raw));
    }

    #[test]
    fn test_resolve_args_keeps_keys() {
        let raw = args(json!({ "repo_name": "{{step_1[0].name}}", "path": "README.md" }));
        let resolved = resolve_args(&raw, &repos_ctx());
        assert_eq!(resolved, args(json!({ "repo_name": "a", "path": "README.md" })));
    }
}
