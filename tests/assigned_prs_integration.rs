use assert_cmd::Command;
use httpmock::{Method::GET, MockServer};

fn run_with_env(req: &serde_json::Value, envs: &[(&str, &str)]) -> anyhow::Result<serde_json::Value> {
    let mut cmd = Command::cargo_bin("kite-mcp")?;
    for (k, v) in envs {
        cmd.env(k, v);
    }
    let input = serde_json::to_string(req)?;
    let assert = cmd.arg("--log-level").arg("warn").write_stdin(input).assert();
    let output = String::from_utf8(assert.get_output().stdout.clone())?;
    Ok(serde_json::from_str(output.trim())?)
}

fn feed() -> serde_json::Value {
    serde_json::json!([
        {
            "title": "Add feature", "number": 12,
            "html_url": "https://github.com/octocat/hello-world/pull/12",
            "repository_url": "https://api.github.com/repos/octocat/hello-world",
            "state": "open", "user": {"login": "alice"},
            "created_at": "2024-01-01T00:00:00Z", "updated_at": "2024-01-03T00:00:00Z",
            "pull_request": {"url": "https://api.github.com/repos/octocat/hello-world/pulls/12"}
        },
        {
            "title": "Plain issue", "number": 13,
            "html_url": "https://github.com/octocat/hello-world/issues/13",
            "repository_url": "https://api.github.com/repos/octocat/hello-world",
            "state": "open", "user": {"login": "bob"},
            "created_at": "2024-01-02T00:00:00Z", "updated_at": "2024-01-02T00:00:00Z"
        },
        {
            "title": "Orphan PR", "number": 4,
            "html_url": "https://github.com/acme/tools/pull/4",
            "repository_url": "https://api.github.com/repos/acme/tools",
            "state": "open", "user": null,
            "created_at": "2023-12-01T00:00:00Z", "updated_at": "2023-12-02T00:00:00Z",
            "pull_request": {"url": "https://api.github.com/repos/acme/tools/pulls/4"}
        }
    ])
}

#[test]
fn assigned_prs_defaults_filter_and_mapping() -> anyhow::Result<()> {
    let server = MockServer::start();
    let m = server.mock(|when, then| {
        when.method(GET)
            .path("/issues")
            .query_param("filter", "assigned")
            .query_param("state", "open")
            .query_param("sort", "created")
            .query_param("direction", "desc")
            .query_param("per_page", "30");
        then.status(200).json_body(feed());
    });
    // No arguments at all: every default applies.
    let req = serde_json::json!({
        "jsonrpc": "2.0", "method": "tools/call", "id": 1,
        "params": {"name": "get_assigned_pull_requests"}
    });
    let out = run_with_env(
        &req,
        &[("GITHUB_TOKEN", "t"), ("GITHUB_API_URL", server.base_url().as_str())],
    )?;
    m.assert();

    assert!(out["result"].get("isError").is_none());
    let text = out["result"]["content"][0]["text"].as_str().unwrap();
    let prs: Vec<serde_json::Value> = serde_json::from_str(text)?;
    assert_eq!(prs.len(), 2);
    assert_eq!(prs[0]["number"], 12);
    assert_eq!(prs[0]["repo"], "octocat/hello-world");
    assert_eq!(prs[0]["author"], "alice");
    assert_eq!(prs[0]["url"], "https://github.com/octocat/hello-world/pull/12");
    assert_eq!(prs[1]["repo"], "acme/tools");
    assert_eq!(prs[1]["author"], "Unknown");
    Ok(())
}

#[test]
fn assigned_prs_forwards_overrides() -> anyhow::Result<()> {
    let server = MockServer::start();
    let m = server.mock(|when, then| {
        when.method(GET)
            .path("/issues")
            .query_param("filter", "assigned")
            .query_param("state", "closed")
            .query_param("sort", "updated")
            .query_param("direction", "asc")
            .query_param("per_page", "5");
        then.status(200).json_body(serde_json::json!([]));
    });
    let req = serde_json::json!({
        "jsonrpc": "2.0", "method": "tools/call", "id": 2,
        "params": {"name": "get_assigned_pull_requests",
                   "arguments": {"state": "closed", "sort": "updated", "direction": "asc", "per_page": 5}}
    });
    let out = run_with_env(
        &req,
        &[("GITHUB_TOKEN", "t"), ("GITHUB_API_URL", server.base_url().as_str())],
    )?;
    m.assert();
    assert_eq!(out["result"]["content"][0]["text"], "[]");
    Ok(())
}

#[test]
fn assigned_prs_reports_auth_failure() -> anyhow::Result<()> {
    let server = MockServer::start();
    let _m = server.mock(|when, then| {
        when.method(GET).path("/issues");
        then.status(401).json_body(serde_json::json!({
            "message": "Bad credentials",
            "documentation_url": "https://docs.github.com/rest"
        }));
    });
    let req = serde_json::json!({
        "jsonrpc": "2.0", "method": "tools/call", "id": 3,
        "params": {"name": "get_assigned_pull_requests", "arguments": {}}
    });
    let out = run_with_env(
        &req,
        &[("GITHUB_TOKEN", "bad"), ("GITHUB_API_URL", server.base_url().as_str())],
    )?;
    assert!(out.get("error").is_none());
    assert_eq!(out["result"]["isError"], true);
    assert_eq!(
        out["result"]["content"][0]["text"],
        "Error fetching assigned pull requests: Bad credentials - https://docs.github.com/rest"
    );
    Ok(())
}
