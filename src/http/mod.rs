use crate::config::Config;
use crate::types::{AssignedIssuesParams, Issue, ListReposParams, RateMeta, Repository};
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Failure of a single GitHub REST call. The `Display` text is what tools
/// surface to callers after their own prefix.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("{message}")]
    Status { status: StatusCode, message: String },
    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Invalid client configuration: {0}")]
    Config(String),
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status(),
            _ => None,
        }
    }
}

/// The two GitHub capabilities the tools consume. Implemented by
/// [`RestClient`] for the real API and by stand-ins in tests.
#[async_trait]
pub trait GitHubApi: Send + Sync {
    /// `GET /users/{owner}/repos`
    async fn list_repos_for_user(
        &self,
        params: &ListReposParams,
    ) -> Result<Vec<Repository>, ApiError>;

    /// `GET /issues` for the authenticated user.
    async fn list_issues_for_authenticated_user(
        &self,
        params: &AssignedIssuesParams,
    ) -> Result<Vec<Issue>, ApiError>;
}

pub fn build_client(cfg: &Config) -> Result<Client, ApiError> {
    let mut default_headers = HeaderMap::new();
    let ua = HeaderValue::from_str(&cfg.user_agent)
        .map_err(|e| ApiError::Config(format!("user agent: {}", e)))?;
    default_headers.insert(USER_AGENT, ua);
    // Authorization header is injected per request so the token never lands in default headers.
    let client = Client::builder()
        .default_headers(default_headers)
        .timeout(Duration::from_secs(cfg.timeout_secs))
        .use_rustls_tls()
        .build()?;
    Ok(client)
}

fn auth_header(token: &str) -> Result<HeaderValue, ApiError> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
        .map_err(|e| ApiError::Config(format!("token: {}", e)))?;
    value.set_sensitive(true);
    Ok(value)
}

/// Percent-encode a value for use as a single URL path segment.
pub fn encode_path_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

pub fn extract_rate_from_rest(headers: &HeaderMap) -> RateMeta {
    let remaining = headers
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<i32>().ok());
    let used = headers
        .get("x-ratelimit-used")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<i32>().ok());
    let reset_at = headers
        .get("x-ratelimit-reset")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<i64>().ok())
        .and_then(|epoch| chrono::DateTime::<chrono::Utc>::from_timestamp(epoch, 0))
        .map(|dt| dt.to_rfc3339());
    RateMeta {
        remaining,
        used,
        reset_at,
    }
}

#[derive(Deserialize)]
struct GitHubErrorBody {
    message: Option<String>,
    documentation_url: Option<String>,
}

/// Build the error for a non-success response. GitHub bodies look like
/// `{"message": "Not Found", "documentation_url": "..."}`.
pub fn status_error(status: StatusCode, body: &str) -> ApiError {
    let parsed = serde_json::from_str::<GitHubErrorBody>(body).ok();
    let message = match parsed {
        Some(GitHubErrorBody {
            message: Some(msg),
            documentation_url,
        }) => match documentation_url {
            Some(doc) => format!("{} - {}", msg, doc),
            None => msg,
        },
        _ if !body.trim().is_empty() && !body.trim_start().starts_with('{') => {
            body.trim().to_string()
        }
        _ => status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string(),
    };
    ApiError::Status { status, message }
}

/// GitHub REST client backed by reqwest. One request per call, no retries.
#[derive(Debug, Clone)]
pub struct RestClient {
    client: Client,
    cfg: Config,
}

impl RestClient {
    pub fn new(cfg: Config) -> Result<Self, ApiError> {
        let client = build_client(&cfg)?;
        Ok(Self { client, cfg })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Url::parse(&format!("{}{}", self.cfg.api_url, path))
            .map_err(|e| ApiError::Config(format!("api url: {}", e)))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        debug!("REST GET {}", url);
        let mut req = self
            .client
            .get(url.clone())
            .header("X-GitHub-Api-Version", &self.cfg.api_version)
            .header(
                ACCEPT,
                HeaderValue::from_static("application/vnd.github+json"),
            );
        if let Some(token) = &self.cfg.token {
            req = req.header(AUTHORIZATION, auth_header(token)?);
        }

        let res = req.send().await.map_err(|e| {
            warn!("REST GET error sending request: {}", e);
            ApiError::Transport(e)
        })?;

        let status = res.status();
        let rate = extract_rate_from_rest(res.headers());
        debug!(
            "REST GET {} -> {} (rate remaining={:?}, used={:?})",
            url.path(),
            status,
            rate.remaining,
            rate.used
        );
        if rate.remaining == Some(0) {
            warn!(
                "GitHub rate limit exhausted; resets at {}",
                rate.reset_at.as_deref().unwrap_or("unknown")
            );
        }

        let text = res.text().await?;
        if !status.is_success() {
            warn!("REST GET {} failed with status {}", url.path(), status);
            return Err(status_error(status, &text));
        }
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl GitHubApi for RestClient {
    async fn list_repos_for_user(
        &self,
        params: &ListReposParams,
    ) -> Result<Vec<Repository>, ApiError> {
        let path = format!("/users/{}/repos", encode_path_segment(&params.owner));
        let mut url = self.endpoint(&path)?;
        url.query_pairs_mut()
            .append_pair("type", &params.kind)
            .append_pair("sort", &params.sort)
            .append_pair("per_page", &params.per_page.to_string());
        self.get_json(url).await
    }

    async fn list_issues_for_authenticated_user(
        &self,
        params: &AssignedIssuesParams,
    ) -> Result<Vec<Issue>, ApiError> {
        let mut url = self.endpoint("/issues")?;
        url.query_pairs_mut()
            .append_pair("filter", &params.filter)
            .append_pair("state", &params.state)
            .append_pair("sort", &params.sort)
            .append_pair("direction", &params.direction)
            .append_pair("per_page", &params.per_page.to_string());
        self.get_json(url).await
    }
}
