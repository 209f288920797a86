//! GitHub tools — repository search and repository/file content.
//!
//! Both go through the public REST API. Failures come back as
//! `{"error": ...}` values rather than `Err`, so the verifier can see them.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use opsbot_core::config::GithubConfig;

use super::base::{optional_i64, optional_string, require_string, Tool};

const USER_AGENT: &str = concat!("opsbot/", env!("CARGO_PKG_VERSION"));

/// Default number of search results.
const DEFAULT_SEARCH_LIMIT: i64 = 5;

// ─────────────────────────────────────────────
// Shared client
// ─────────────────────────────────────────────

/// Authenticated (or anonymous) GitHub REST client shared by both tools.
#[derive(Clone)]
pub struct GithubClient {
    client: Client,
    api_base: String,
    token: Option<String>,
}

impl GithubClient {
    pub fn new(config: &GithubConfig) -> Self {
        Self {
            client: Client::builder()
                .user_agent(USER_AGENT)
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .unwrap_or_default(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            token: config.token.clone().filter(|t| !t.is_empty()),
        }
    }

    fn get(&self, path: &str) -> RequestBuilder {
        let request = self
            .client
            .get(format!("{}{}", self.api_base, path))
            .header("Accept", "application/vnd.github+json");
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get_json(&self, request: RequestBuilder) -> Result<Value, reqwest::Error> {
        request.send().await?.error_for_status()?.json().await
    }
}

// ─────────────────────────────────────────────
// github_search
// ─────────────────────────────────────────────

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Deserialize)]
struct SearchItem {
    full_name: String,
    description: Option<String>,
    stargazers_count: u64,
    html_url: String,
}

/// `github_search` — repositories matching a query, most-starred first.
pub struct GithubSearchTool {
    github: GithubClient,
}

impl GithubSearchTool {
    pub fn new(github: GithubClient) -> Self {
        Self { github }
    }
}

#[async_trait]
impl Tool for GithubSearchTool {
    fn name(&self) -> &str {
        "github_search"
    }

    fn description(&self) -> &str {
        "Search for repositories on GitHub."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query (e.g., 'python agents')"
                },
                "limit": {
                    "type": "integer",
                    "description": "Number of results to return",
                    "default": DEFAULT_SEARCH_LIMIT
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<Value> {
        let query = require_string(&params, "query")?;
        let limit = optional_i64(&params, "limit").unwrap_or(DEFAULT_SEARCH_LIMIT);

        debug!(query = %query, limit, "searching GitHub");

        let request = self.github.get("/search/repositories").query(&[
            ("q", query),
            ("per_page", limit.to_string()),
            ("sort", "stars".to_string()),
        ]);

        let body = match self.github.get_json(request).await {
            Ok(body) => body,
            Err(e) => return Ok(json!([{ "error": e.to_string() }])),
        };

        let search: SearchResponse = match serde_json::from_value(body) {
            Ok(s) => s,
            Err(e) => return Ok(json!([{ "error": e.to_string() }])),
        };

        let results: Vec<Value> = search
            .items
            .into_iter()
            .map(|item| {
                json!({
                    "name": item.full_name,
                    "description": item.description,
                    "stars": item.stargazers_count,
                    "url": item.html_url,
                })
            })
            .collect();
        Ok(Value::Array(results))
    }
}

// ─────────────────────────────────────────────
// github_content
// ─────────────────────────────────────────────

/// `github_content` — repository metadata, or a file/directory listing when
/// `path` is given.
pub struct GithubContentTool {
    github: GithubClient,
}

impl GithubContentTool {
    pub fn new(github: GithubClient) -> Self {
        Self { github }
    }
}

#[async_trait]
impl Tool for GithubContentTool {
    fn name(&self) -> &str {
        "github_content"
    }

    fn description(&self) -> &str {
        "Get details or content of a GitHub repository."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "repo_name": {
                    "type": "string",
                    "description": "Full repository name (e.g., 'owner/repo')"
                },
                "path": {
                    "type": "string",
                    "description": "File path to fetch (optional)",
                    "default": ""
                }
            },
            "required": ["repo_name"]
        })
    }

    async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<Value> {
        let repo_name = optional_string(&params, "repo_name").unwrap_or_default();
        if repo_name.is_empty() {
            return Ok(json!({ "error": "repo_name cannot be empty" }));
        }
        let path = optional_string(&params, "path").unwrap_or_default();

        let mut url = format!("/repos/{repo_name}");
        if !path.is_empty() {
            url.push_str("/contents/");
            url.push_str(path.trim_start_matches('/'));
        }

        debug!(url = %url, "fetching GitHub content");

        match self.github.get_json(self.github.get(&url)).await {
            Ok(body) => Ok(body),
            Err(e) => Ok(json!({ "error": e.to_string() })),
        }
    }
}
