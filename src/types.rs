use serde::{Deserialize, Serialize};

// Rate metadata parsed from GitHub REST response headers.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct RateMeta {
    pub remaining: Option<i32>,
    pub used: Option<i32>,
    pub reset_at: Option<String>,
}

// Upstream records. Only the fields the tools read are declared; serde ignores the rest.

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Repository {
    pub name: String,
    pub full_name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub html_url: String,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct User {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Issue {
    pub title: String,
    pub number: i64,
    pub html_url: String,
    pub repository_url: String,
    pub state: String,
    #[serde(default)]
    pub user: Option<User>,
    pub created_at: String,
    pub updated_at: String,
    // Present (an object of PR links) only when the issue is a pull request.
    #[serde(default)]
    pub pull_request: Option<serde_json::Value>,
}

impl Issue {
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }
}

// Query parameters after defaults have been applied.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListReposParams {
    pub owner: String,
    pub kind: String,
    pub sort: String,
    pub per_page: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignedIssuesParams {
    pub filter: String,
    pub state: String,
    pub sort: String,
    pub direction: String,
    pub per_page: u32,
}

// Tool output shapes. Field order is the serialized order.

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RepositorySummary {
    pub name: String,
    pub full_name: String,
    pub description: String,
    pub url: String,
    pub stars: u64,
    pub forks: u64,
    pub language: String,
    pub private: bool,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PullRequestSummary {
    pub title: String,
    pub number: i64,
    pub url: String,
    pub repo: String,
    pub state: String,
    pub author: String,
    pub created_at: String,
    pub updated_at: String,
}
