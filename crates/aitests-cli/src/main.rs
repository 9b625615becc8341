//! `aitests` command line

mod cli;

use aitests_adapters::services_for;
use aitests_core::Strategy;
use aitests_engine::{
    AuditInput, AuditOutput, GenerateInput, GenerateOutput, InitInput, InitOutput, PlanInput,
    PlanOutput, RepairInput, RepairOutput, RunInput, RunOutput, TestsEngine,
};
use anyhow::Context;
use clap::ArgMatches;
use serde::Serialize;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter
const LOG_ENV: &str = "AITESTS_LOG";

fn init_tracing(format: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn strings(args: &ArgMatches, id: &str) -> Option<Vec<String>> {
    args.get_many::<String>(id).map(|values| values.cloned().collect())
}

fn emit<T: Serialize>(json: bool, output: &T, human: impl FnOnce(&T)) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(output)?);
    } else {
        human(output);
    }
    Ok(())
}

fn print_init(out: &InitOutput) {
    println!("{}", out.summary);
    for path in &out.created {
        println!("  created {path}");
    }
    for path in &out.skipped {
        println!("  exists  {path}");
    }
}

fn print_plan(out: &PlanOutput) {
    println!("Plan: {}", out.plan_path);
    println!(
        "Targets: {} · Not covered: {} · Uncovered: {}",
        out.total_targets, out.not_covered, out.uncovered
    );
}

fn print_generate(out: &GenerateOutput) {
    println!("{}", out.summary);
    for artifact in &out.artifacts {
        println!("  {artifact}");
    }
}

fn print_run(out: &RunOutput) {
    let summary = &out.result.summary;
    println!(
        "Run {} · passed {} · failed {} · skipped {} · {}ms",
        out.result.status, summary.passed, summary.failed, summary.skipped, out.result.duration_ms
    );
    println!("  result {}", out.run_path);
    println!("  log    {}", out.log_path);
}

fn print_repair(out: &RepairOutput) {
    println!(
        "Attempt {}: {}",
        out.iteration.attempt_index(),
        out.iteration.status()
    );
    for note in out.iteration.notes().unwrap_or_default() {
        println!("  {note}");
    }
    for fix in out.iteration.fixes().unwrap_or_default() {
        println!("  suggestion {} -> {}", fix.file_path, fix.suggestion_path);
    }
    println!(
        "Max attempts reached: {} (limit {})",
        out.max_attempts_reached, out.limit
    );
}

fn print_audit(out: &AuditOutput) {
    println!("{}", out.summary);
    println!("  report {}", out.report_path);
}

async fn dispatch(engine: &TestsEngine, matches: &ArgMatches) -> anyhow::Result<()> {
    let Some((name, args)) = matches.subcommand() else {
        anyhow::bail!("no command given");
    };
    let json = args.get_flag("json");
    let dry_run = args.get_flag("dry-run");
    tracing::debug!(command = name, dry_run, "dispatching");

    match name {
        "init" => {
            let out = engine
                .init(InitInput {
                    tests_dir: args.get_one::<String>("tests-dir").cloned(),
                    dry_run,
                })
                .await?;
            emit(json, &out, print_init)
        }
        "plan" => {
            let out = engine
                .plan(PlanInput {
                    sources: strings(args, "source"),
                    dry_run,
                    incremental: args.get_flag("incremental"),
                })
                .await?;
            emit(json, &out, print_plan)
        }
        "generate" => {
            let strategy = args
                .get_one::<String>("strategy")
                .map(|s| s.parse::<Strategy>())
                .transpose()?;
            let out = engine
                .generate(GenerateInput {
                    targets: strings(args, "target"),
                    dry_run,
                    strategy,
                })
                .await?;
            emit(json, &out, print_generate)
        }
        "run" => {
            let out = engine
                .run(RunInput {
                    dry_run,
                    timeout: args.get_one::<u64>("timeout-secs").copied().map(Duration::from_secs),
                })
                .await?;
            emit(json, &out, print_run)
        }
        "repair" => {
            let out = engine
                .repair(RepairInput {
                    dry_run,
                    max_attempts: args.get_one::<u32>("max-attempts").copied(),
                    timeout: args.get_one::<u64>("timeout-secs").copied().map(Duration::from_secs),
                })
                .await?;
            emit(json, &out, print_repair)
        }
        "audit" => {
            let out = engine
                .audit(AuditInput {
                    include_plan: !args.get_flag("no-plan"),
                    include_runs: !args.get_flag("no-runs"),
                    dry_run,
                })
                .await?;
            emit(json, &out, print_audit)
        }
        other => anyhow::bail!("unknown command '{other}'"),
    }
}

async fn run(matches: ArgMatches) -> anyhow::Result<()> {
    let root = matches
        .get_one::<String>("root")
        .map_or(".", String::as_str);
    std::env::set_current_dir(root)
        .with_context(|| format!("cannot enter workspace root {root}"))?;

    let engine = TestsEngine::new(services_for("."));
    dispatch(&engine, &matches).await
}

#[tokio::main]
async fn main() -> ExitCode {
    let matches = cli::command().get_matches();
    init_tracing(
        matches
            .get_one::<String>("log-format")
            .map_or("plain", String::as_str),
    );

    match run(matches).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "command failed");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
