use super::{parse_arguments, ToolDescriptor, ToolError};
use crate::http::GitHubApi;
use crate::mcp::CallToolResult;
use crate::types::{
    AssignedIssuesParams, Issue, ListReposParams, PullRequestSummary, Repository,
    RepositorySummary,
};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const LIST_REPOSITORIES: &str = "list_repositories";
pub const GET_ASSIGNED_PULL_REQUESTS: &str = "get_assigned_pull_requests";

const DEFAULT_PER_PAGE: u32 = 30;
const NO_DESCRIPTION: &str = "No description";
const UNKNOWN: &str = "Unknown";

pub fn descriptors() -> Vec<ToolDescriptor> {
    let list_repositories = ToolDescriptor {
        name: LIST_REPOSITORIES.into(),
        description: "List GitHub repositories for a user or organization".into(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "owner": {
                    "type": "string",
                    "description": "GitHub username or organization name"
                },
                "type": {
                    "type": "string",
                    "enum": ["all", "owner", "member"],
                    "description": "Type of repositories to list (default: owner)"
                },
                "sort": {
                    "type": "string",
                    "enum": ["created", "updated", "pushed", "full_name"],
                    "description": "How to sort the repositories (default: full_name)"
                },
                "per_page": {
                    "type": "number",
                    "description": "Number of repositories per page (default: 30, max: 100)"
                }
            },
            "required": ["owner"]
        }),
    };

    let get_assigned_pull_requests = ToolDescriptor {
        name: GET_ASSIGNED_PULL_REQUESTS.into(),
        description: "Get pull requests assigned to the authenticated user".into(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "state": {
                    "type": "string",
                    "enum": ["open", "closed", "all"],
                    "description": "State of pull requests to fetch (default: open)"
                },
                "sort": {
                    "type": "string",
                    "enum": ["created", "updated", "comments"],
                    "description": "How to sort the pull requests (default: created)"
                },
                "direction": {
                    "type": "string",
                    "enum": ["asc", "desc"],
                    "description": "Sort direction (default: desc)"
                },
                "per_page": {
                    "type": "number",
                    "description": "Number of pull requests per page (default: 30, max: 100)"
                }
            },
            "required": []
        }),
    };

    vec![list_repositories, get_assigned_pull_requests]
}

pub async fn call_tool(
    api: &dyn GitHubApi,
    name: &str,
    arguments: Value,
) -> Result<CallToolResult, ToolError> {
    match name {
        LIST_REPOSITORIES => {
            let input = parse_arguments(name, arguments)?;
            Ok(list_repositories(api, input).await)
        }
        GET_ASSIGNED_PULL_REQUESTS => {
            let input = parse_arguments(name, arguments)?;
            Ok(get_assigned_pull_requests(api, input).await)
        }
        other => Err(ToolError::UnknownGitHubTool(other.to_string())),
    }
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct ListRepositoriesInput {
    pub owner: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub sort: Option<String>,
    pub per_page: Option<Value>,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct GetAssignedPullRequestsInput {
    pub state: Option<String>,
    pub sort: Option<String>,
    pub direction: Option<String>,
    pub per_page: Option<Value>,
}

// Empty strings count as "not supplied".
fn or_default(value: Option<String>, default: &str) -> String {
    value
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

// The schema advertises a JSON number, so integral floats (`10.0`) and numeric
// strings are accepted. Zero, negatives, fractions and anything else take the default.
fn per_page_or_default(value: Option<Value>) -> u32 {
    let n = match value {
        Some(Value::Number(n)) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 1.0 && *f <= f64::from(u32::MAX))
                .map(|f| f as u64)
        }),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    n.filter(|n| *n > 0)
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(DEFAULT_PER_PAGE)
}

impl ListRepositoriesInput {
    pub fn into_params(self) -> ListReposParams {
        ListReposParams {
            owner: self.owner,
            kind: or_default(self.kind, "owner"),
            sort: or_default(self.sort, "full_name"),
            per_page: per_page_or_default(self.per_page),
        }
    }
}

impl GetAssignedPullRequestsInput {
    pub fn into_params(self) -> AssignedIssuesParams {
        AssignedIssuesParams {
            filter: "assigned".into(),
            state: or_default(self.state, "open"),
            sort: or_default(self.sort, "created"),
            direction: or_default(self.direction, "desc"),
            per_page: per_page_or_default(self.per_page),
        }
    }
}

pub fn summarize_repository(repo: Repository) -> RepositorySummary {
    RepositorySummary {
        name: repo.name,
        full_name: repo.full_name,
        description: or_default(repo.description, NO_DESCRIPTION),
        url: repo.html_url,
        stars: repo.stargazers_count,
        forks: repo.forks_count,
        language: or_default(repo.language, UNKNOWN),
        private: repo.private,
        updated_at: repo.updated_at,
    }
}

/// `owner/name` from an API resource URL such as
/// `https://api.github.com/repos/octocat/hello-world`.
pub fn repo_from_api_url(url: &str) -> String {
    let segments: Vec<&str> = url.split('/').collect();
    segments[segments.len().saturating_sub(2)..].join("/")
}

pub fn summarize_pull_request(issue: Issue) -> PullRequestSummary {
    PullRequestSummary {
        repo: repo_from_api_url(&issue.repository_url),
        title: issue.title,
        number: issue.number,
        url: issue.html_url,
        state: issue.state,
        author: or_default(issue.user.map(|u| u.login), UNKNOWN),
        created_at: issue.created_at,
        updated_at: issue.updated_at,
    }
}

fn json_result<T: Serialize>(items: &[T], error_prefix: &str) -> CallToolResult {
    match serde_json::to_string_pretty(items) {
        Ok(text) => CallToolResult::text(text),
        Err(e) => CallToolResult::error_text(format!("{}: {}", error_prefix, e)),
    }
}

pub async fn list_repositories(api: &dyn GitHubApi, input: ListRepositoriesInput) -> CallToolResult {
    const PREFIX: &str = "Error listing repositories";
    let params = input.into_params();
    debug!(
        "list_repositories owner={} type={} sort={} per_page={}",
        params.owner, params.kind, params.sort, params.per_page
    );
    match api.list_repos_for_user(&params).await {
        Ok(repos) => {
            let summaries: Vec<RepositorySummary> =
                repos.into_iter().map(summarize_repository).collect();
            json_result(&summaries, PREFIX)
        }
        Err(e) => {
            warn!("list_repositories failed for {}: {}", params.owner, e);
            CallToolResult::error_text(format!("{}: {}", PREFIX, e))
        }
    }
}

pub async fn get_assigned_pull_requests(
    api: &dyn GitHubApi,
    input: GetAssignedPullRequestsInput,
) -> CallToolResult {
    const PREFIX: &str = "Error fetching assigned pull requests";
    let params = input.into_params();
    debug!(
        "get_assigned_pull_requests state={} sort={} direction={} per_page={}",
        params.state, params.sort, params.direction, params.per_page
    );
    match api.list_issues_for_authenticated_user(&params).await {
        Ok(issues) => {
            let summaries: Vec<PullRequestSummary> = issues
                .into_iter()
                .filter(Issue::is_pull_request)
                .map(summarize_pull_request)
                .collect();
            json_result(&summaries, PREFIX)
        }
        Err(e) => {
            warn!("get_assigned_pull_requests failed: {}", e);
            CallToolResult::error_text(format!("{}: {}", PREFIX, e))
        }
    }
}
