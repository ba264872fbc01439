// Console rendering for the client subcommands. Input is the JSON text a tool returned.

use crate::types::{PullRequestSummary, RepositorySummary};
use std::fmt::Write;

fn human_time(ts: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(ts)
        .map(|dt| {
            dt.with_timezone(&chrono::Utc)
                .format("%Y-%m-%d %H:%M UTC")
                .to_string()
        })
        .unwrap_or_else(|_| ts.to_string())
}

pub fn render_repositories(json: &str) -> anyhow::Result<String> {
    let repos: Vec<RepositorySummary> = serde_json::from_str(json)?;
    if repos.is_empty() {
        return Ok("No repositories found.\n".to_string());
    }
    let mut out = String::new();
    writeln!(out, "Found {} repositories:\n", repos.len())?;
    for repo in &repos {
        writeln!(out, "{}", repo.full_name)?;
        writeln!(out, "   {}", repo.description)?;
        writeln!(
            out,
            "   stars: {} | forks: {} | language: {}",
            repo.stars, repo.forks, repo.language
        )?;
        writeln!(out, "   {}\n", repo.url)?;
    }
    Ok(out)
}

pub fn render_pull_requests(json: &str) -> anyhow::Result<String> {
    let prs: Vec<PullRequestSummary> = serde_json::from_str(json)?;
    if prs.is_empty() {
        return Ok("No pull requests assigned to you.\n".to_string());
    }
    let mut out = String::new();
    writeln!(out, "Found {} assigned pull request(s):\n", prs.len())?;
    for pr in &prs {
        writeln!(out, "#{}: {}", pr.number, pr.title)?;
        writeln!(out, "   {}", pr.repo)?;
        writeln!(out, "   @{} | {}", pr.author, pr.state)?;
        writeln!(out, "   Updated: {}", human_time(&pr.updated_at))?;
        writeln!(out, "   {}\n", pr.url)?;
    }
    Ok(out)
}
