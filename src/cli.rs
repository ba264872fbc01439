use clap::{value_parser, Arg, ArgAction, Command};

pub fn build_cli() -> Command {
    Command::new("kite-mcp")
        .about("Kite MCP server (stdio JSON-RPC) with GitHub tools")
        .disable_version_flag(true)
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .global(true)
                .num_args(1)
                .help("Override RUST_LOG level (e.g., info, debug)"),
        )
        .arg(
            Arg::new("version")
                .long("version")
                .help("Print version and exit")
                .action(ArgAction::SetTrue),
        )
        .subcommand(Command::new("serve").about("Run the stdio MCP server (default)"))
        .subcommand(Command::new("hello").about("Call hello_world and print the greeting"))
        .subcommand(
            Command::new("repos")
                .about("List repositories for a user or organization")
                .arg(Arg::new("owner").required(true).help("GitHub username or organization"))
                .arg(
                    Arg::new("type")
                        .long("type")
                        .value_parser(["all", "owner", "member"]),
                )
                .arg(
                    Arg::new("sort")
                        .long("sort")
                        .value_parser(["created", "updated", "pushed", "full_name"]),
                )
                .arg(
                    Arg::new("per-page")
                        .long("per-page")
                        .value_parser(value_parser!(u32)),
                ),
        )
        .subcommand(
            Command::new("assigned-prs")
                .about("List pull requests assigned to the authenticated user")
                .arg(
                    Arg::new("state")
                        .long("state")
                        .value_parser(["open", "closed", "all"]),
                )
                .arg(
                    Arg::new("sort")
                        .long("sort")
                        .value_parser(["created", "updated", "comments"]),
                )
                .arg(
                    Arg::new("direction")
                        .long("direction")
                        .value_parser(["asc", "desc"]),
                )
                .arg(
                    Arg::new("per-page")
                        .long("per-page")
                        .value_parser(value_parser!(u32)),
                ),
        )
}

pub fn init_logging(level: Option<&str>) {
    // Explicit level wins, then RUST_LOG, then info. Logs go to stderr; stdout carries frames.
    let env = env_logger::Env::default().default_filter_or("info");
    let mut builder = env_logger::Builder::from_env(env);
    if let Some(lvl) = level {
        builder.parse_filters(lvl);
    }
    builder.target(env_logger::Target::Stderr).init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        build_cli().debug_assert();
    }

    #[test]
    fn repos_parses_overrides() {
        let m = build_cli()
            .try_get_matches_from(["kite-mcp", "repos", "octocat", "--sort", "updated", "--per-page", "10"])
            .unwrap();
        let (name, sub) = m.subcommand().unwrap();
        assert_eq!(name, "repos");
        assert_eq!(sub.get_one::<String>("owner").unwrap(), "octocat");
        assert_eq!(sub.get_one::<u32>("per-page"), Some(&10));
    }

    #[test]
    fn rejects_unknown_enum_value() {
        let res = build_cli().try_get_matches_from(["kite-mcp", "assigned-prs", "--state", "merged"]);
        assert!(res.is_err());
    }
}
