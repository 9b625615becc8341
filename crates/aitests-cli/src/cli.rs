use clap::{value_parser, Arg, ArgAction, Command};

pub(crate) const STRATEGIES: [&str; 4] = ["suggest-only", "write-and-run", "repair-loop", "llm-generate"];

fn dry_run() -> Arg {
    Arg::new("dry-run")
        .long("dry-run")
        .action(ArgAction::SetTrue)
        .help("Report what would happen without touching the workspace")
}

fn timeout_secs() -> Arg {
    Arg::new("timeout-secs")
        .long("timeout-secs")
        .value_parser(value_parser!(u64))
        .help("Kill the test command after this many seconds")
}

pub(crate) fn command() -> Command {
    Command::new("aitests")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Plan, generate, run and repair tests for a workspace")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("root")
                .long("root")
                .global(true)
                .default_value(".")
                .help("Workspace root"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Print results as JSON"),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .global(true)
                .default_value("plain")
                .value_parser(["plain", "json"])
                .help("Log output format (logs go to stderr)"),
        )
        .subcommand(
            Command::new("init")
                .about("Create the tests directory and record metadata")
                .arg(
                    Arg::new("tests-dir")
                        .long("tests-dir")
                        .help("Tests directory override"),
                )
                .arg(dry_run()),
        )
        .subcommand(
            Command::new("plan")
                .about("Build the coverage plan")
                .arg(
                    Arg::new("source")
                        .long("source")
                        .action(ArgAction::Append)
                        .help("Source glob (repeatable), replaces configured sources"),
                )
                .arg(
                    Arg::new("incremental")
                        .long("incremental")
                        .action(ArgAction::SetTrue)
                        .help("Update the persisted plan instead of replacing it"),
                )
                .arg(dry_run()),
        )
        .subcommand(
            Command::new("generate")
                .about("Generate tests for uncovered targets")
                .arg(
                    Arg::new("target")
                        .long("target")
                        .action(ArgAction::Append)
                        .help("Restrict to a path or display name (repeatable)"),
                )
                .arg(
                    Arg::new("strategy")
                        .long("strategy")
                        .value_parser(STRATEGIES)
                        .help("Strategy override"),
                )
                .arg(dry_run()),
        )
        .subcommand(
            Command::new("run")
                .about("Run the configured test command")
                .arg(timeout_secs())
                .arg(dry_run()),
        )
        .subcommand(
            Command::new("repair")
                .about("Run one bounded repair attempt against the last run")
                .arg(
                    Arg::new("max-attempts")
                        .long("max-attempts")
                        .value_parser(value_parser!(u32))
                        .help("Lower the configured attempt budget"),
                )
                .arg(timeout_secs())
                .arg(dry_run()),
        )
        .subcommand(
            Command::new("audit")
                .about("Score workspace health")
                .arg(
                    Arg::new("no-plan")
                        .long("no-plan")
                        .action(ArgAction::SetTrue)
                        .help("Ignore the plan artifact"),
                )
                .arg(
                    Arg::new("no-runs")
                        .long("no-runs")
                        .action(ArgAction::SetTrue)
                        .help("Ignore the last run"),
                )
                .arg(dry_run()),
        )
}
