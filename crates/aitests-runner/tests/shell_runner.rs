#![cfg(unix)]

use aitests_core::{RawConfig, RawRunnerConfig, RunStatus, RunnerSetting, Settings};
use aitests_runner::{CommandRunner, RunOptions, TestRunner, TIMEOUT_EXIT_CODE};
use std::collections::BTreeMap;
use std::time::Duration;

fn shell(command: &str) -> Settings {
    Settings::normalize(Some(
        RawConfig::default().with_runner(RunnerSetting::Named(command.to_string())),
    ))
}

#[tokio::test]
async fn successful_command_reports_success() {
    let out = CommandRunner::default()
        .run(&shell("echo hello"), RunOptions::default())
        .await;

    assert_eq!(out.result.status, RunStatus::Success);
    assert_eq!(out.result.runner.exit_code, 0);
    assert_eq!(out.result.runner.stdout.as_deref(), Some("hello\n"));
    assert_eq!(out.result.summary.passed, 1);
    assert!(out.log.starts_with("command=echo hello\nstatus=success\nexitCode=0"));
}

#[tokio::test]
async fn non_zero_exit_is_failed_run() {
    let out = CommandRunner::default()
        .run(&shell("echo broken >&2; exit 3"), RunOptions::default())
        .await;

    assert_eq!(out.result.status, RunStatus::Failed);
    assert_eq!(out.result.runner.exit_code, 3);
    let file = &out.result.files[0];
    assert_eq!(file.failed, 1);
    assert_eq!(file.first_error(), Some("broken\n"));
    assert_eq!(out.result.failed_file_paths(), vec!["echo broken >&2; exit 3"]);
}

#[tokio::test]
async fn silent_failure_still_carries_message() {
    let out = CommandRunner::default()
        .run(&shell("exit 2"), RunOptions::default())
        .await;
    assert_eq!(
        out.result.files[0].first_error(),
        Some("command exited with status 2")
    );
}

#[tokio::test]
async fn timeout_is_failed_run() {
    let out = CommandRunner::default()
        .run(
            &shell("sleep 5"),
            RunOptions::default().with_timeout(Duration::from_millis(100)),
        )
        .await;

    assert_eq!(out.result.status, RunStatus::Failed);
    assert_eq!(out.result.runner.exit_code, TIMEOUT_EXIT_CODE);
    assert!(out.result.files[0]
        .first_error()
        .is_some_and(|m| m.contains("timed out")));
}

#[tokio::test]
async fn env_and_cwd_are_applied() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("marker.txt"), "present").unwrap();

    let settings = Settings::normalize(Some(RawConfig::default().with_runner(
        RunnerSetting::Detailed(RawRunnerConfig {
            mode: None,
            command: Some("cat marker.txt; printf \" $AITESTS_PROBE\"".into()),
            env: Some(BTreeMap::from([("AITESTS_PROBE".to_string(), "42".to_string())])),
            cwd: Some(dir.path().to_path_buf()),
        }),
    )));

    let out = CommandRunner::default()
        .run(&settings, RunOptions::default())
        .await;
    assert_eq!(out.result.status, RunStatus::Success);
    assert_eq!(out.result.runner.stdout.as_deref(), Some("present 42"));
}
