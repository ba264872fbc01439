use clap::ArgMatches;
use kite_mcp::config::Config;
use kite_mcp::http::{GitHubApi, RestClient};
use kite_mcp::{cli, report, server, tools};
use log::warn;
use serde_json::{json, Map, Value};
use std::sync::Arc;

#[tokio::main(flavor = "current_thread")] // one request at a time over stdio
async fn main() -> anyhow::Result<()> {
    let matches = cli::build_cli().get_matches();
    cli::init_logging(matches.get_one::<String>("log-level").map(String::as_str));

    if matches.get_flag("version") {
        println!("kite-mcp {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let cfg = Config::from_env();
    if !cfg.has_token() {
        warn!("GITHUB_TOKEN/GH_TOKEN not set; GitHub requests will be unauthenticated");
    }
    let api: Arc<dyn GitHubApi> = Arc::new(RestClient::new(cfg)?);

    match matches.subcommand() {
        None | Some(("serve", _)) => server::run_stdio_server(api).await,
        Some(("hello", _)) => {
            let text = call(api.as_ref(), "hello_world", Value::Null).await?;
            println!("{}", text);
            Ok(())
        }
        Some(("repos", sub)) => {
            let mut args = string_args(sub, &[("type", "type"), ("sort", "sort")]);
            if let Some(owner) = sub.get_one::<String>("owner") {
                args.insert("owner".into(), json!(owner));
            }
            insert_per_page(sub, &mut args);
            let text = call(api.as_ref(), "list_repositories", Value::Object(args)).await?;
            print!("{}", report::render_repositories(&text)?);
            Ok(())
        }
        Some(("assigned-prs", sub)) => {
            let mut args = string_args(
                sub,
                &[("state", "state"), ("sort", "sort"), ("direction", "direction")],
            );
            insert_per_page(sub, &mut args);
            let text =
                call(api.as_ref(), "get_assigned_pull_requests", Value::Object(args)).await?;
            print!("{}", report::render_pull_requests(&text)?);
            Ok(())
        }
        Some((other, _)) => anyhow::bail!("unsupported command: {}", other),
    }
}

fn string_args(sub: &ArgMatches, keys: &[(&str, &str)]) -> Map<String, Value> {
    let mut args = Map::new();
    for (flag, field) in keys {
        if let Some(v) = sub.get_one::<String>(flag) {
            args.insert((*field).to_string(), json!(v));
        }
    }
    args
}

fn insert_per_page(sub: &ArgMatches, args: &mut Map<String, Value>) {
    if let Some(n) = sub.get_one::<u32>("per-page") {
        args.insert("per_page".into(), json!(n));
    }
}

// Invoke a tool in-process; a flagged result becomes a process error.
async fn call(api: &dyn GitHubApi, name: &str, arguments: Value) -> anyhow::Result<String> {
    let result = tools::call_tool(api, name, arguments).await?;
    let text = result.first_text().unwrap_or_default().to_string();
    if result.is_error() {
        anyhow::bail!(text);
    }
    Ok(text)
}
