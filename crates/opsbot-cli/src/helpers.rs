//! Shared CLI helpers — path expansion, banners, and progress rendering.

use std::path::PathBuf;

use colored::Colorize;
use serde_json::Value;

use opsbot_agent::{LoopObserver, Plan, Verification};

/// Expand `~` at the start of a path to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_next::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs_next::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

/// Print the provider/model line shown after startup.
pub fn print_ready(provider: &str, model: &str, max_retries: u32) {
    println!("{}", "Ready! (Type 'quit' to exit)".green());
    println!(
        "Using Provider: {}, Model: {} {}",
        provider.cyan(),
        model.cyan(),
        format!("(verifier retries: {max_retries})").dimmed()
    );
}

/// Print the banner shown at REPL start.
pub fn print_banner() {
    let version = env!("CARGO_PKG_VERSION");
    println!();
    println!("{}  v{}", "Opsbot".cyan().bold(), version.dimmed());
    println!("{}", "Type a request, or \"exit\" to quit.".dimmed());
}

fn pretty<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}

/// Renders control-loop progress to stdout.
pub struct ConsoleObserver {
    max_retries: u32,
}

impl ConsoleObserver {
    pub fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }
}

impl LoopObserver for ConsoleObserver {
    fn on_plan(&self, plan: &Plan) {
        println!("{} {}", "[Planner] Plan:".bold(), pretty(plan));
        println!("\n{}", "[Executor] Executing plan...".bold());
    }

    fn on_verifying(&self, retries: u32) {
        println!("\n{}", verifying_banner(retries).bold());
    }

    fn on_retry(&self, attempt: u32, plan: &Plan) {
        println!(
            "\n{}",
            format!(
                "[Verifier] Retry plan proposed (attempt {attempt}/{}).",
                self.max_retries
            )
            .yellow()
        );
        println!("{} {}", "[Verifier] Retry Plan:".bold(), pretty(plan));
        println!("\n{}", "[Executor] Executing retry plan...".bold());
    }
}

fn verifying_banner(retries: u32) -> &'static str {
    if retries == 0 {
        "[Verifier] Verifying results..."
    } else {
        "[Verifier] Re-verifying results..."
    }
}

/// Lines of the final response section, without styling.
pub fn final_response_lines(verification: &Verification) -> Vec<String> {
    if verification.status.is_success() {
        vec![answer_text(&verification.final_answer)]
    } else {
        vec![
            "Task Failed or Incomplete.".to_string(),
            format!("Reason: {}", verification.missing_info),
            format!("Partial Answer: {}", verification.final_answer),
        ]
    }
}

/// Answers that are JSON documents are re-indented for the terminal.
fn answer_text(answer: &str) -> String {
    match serde_json::from_str::<Value>(answer) {
        Ok(value @ (Value::Object(_) | Value::Array(_))) => pretty(&value),
        _ => answer.to_string(),
    }
}

pub fn print_final_response(verification: &Verification) {
    println!("\n{}", "=== Final Response ===".cyan().bold());
    for (i, line) in final_response_lines(verification).iter().enumerate() {
        if i == 0 && !verification.status.is_success() {
            println!("{}", line.red().bold());
        } else {
            println!("{line}");
        }
    }
    println!("{}", "========================".cyan().bold());
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsbot_agent::VerificationStatus;

    fn verification(status: VerificationStatus, answer: &str) -> Verification {
        Verification {
            status,
            final_answer: answer.into(),
            missing_info: "README contents".into(),
            retry_plan: None,
        }
    }

    #[test]
    fn final_response_success() {
        let v = verification(VerificationStatus::Success, "It is 15°C in London.");
        assert_eq!(final_response_lines(&v), vec!["It is 15°C in London."]);
    }

    #[test]
    fn final_response_json_answer_is_pretty() {
        let v = verification(VerificationStatus::Success, r#"{"temperature":15}"#);
        assert_eq!(final_response_lines(&v), vec!["{\n  \"temperature\": 15\n}"]);
    }

    #[test]
    fn final_response_failure() {
        let v = verification(VerificationStatus::Failure, "Found the repo.");
        assert_eq!(
            final_response_lines(&v),
            vec![
                "Task Failed or Incomplete.",
                "Reason: README contents",
                "Partial Answer: Found the repo.",
            ]
        );
    }

    #[test]
    fn verifying_banner_after_retry() {
        assert_eq!(verifying_banner(0), "[Verifier] Verifying results...");
        assert_eq!(verifying_banner(2), "[Verifier] Re-verifying results...");
    }

    #[test]
    fn expand_tilde_home() {
        let result = expand_tilde("~/foo/bar");
        assert!(result.ends_with("foo/bar"));
        assert!(!result.starts_with("~"));
    }

    #[test]
    fn expand_tilde_no_tilde() {
        assert_eq!(expand_tilde("/absolute/path"), PathBuf::from("/absolute/path"));
        assert_eq!(expand_tilde("relative/path"), PathBuf::from("relative/path"));
    }
}
