//! AI Tests Runner - uniform test execution
//!
//! A single [`TestRunner`] entry point over two modes:
//! - `shell`: spawns the configured command and captures its output
//! - `mock`: deterministic stand-in, no process
//!
//! Execution failures never surface as errors. A non-zero exit, a spawn
//! failure or a timeout all become a `failed` [`RunResult`].
//!
//! [`RunResult`]: aitests_core::RunResult

#![warn(unreachable_pub)]

mod report;
mod shell;

pub use report::{clip_chars, RunnerOutput, MAX_ERROR_CHARS};
pub use shell::{DRY_RUN_MARKER, MAX_CAPTURE_BYTES, TIMEOUT_EXIT_CODE};

use aitests_core::{Clock, RunStatus, RunnerMode, Settings, SystemClock};
use report::Outcome;
use std::sync::Arc;
use std::time::Duration;

/// Command label recorded for mock runs
pub const MOCK_COMMAND_LABEL: &str = "mock-runner";

/// Fixed duration reported by the mock runner
pub const MOCK_DURATION: Duration = Duration::from_millis(250);

/// Per-invocation options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Skip execution and report success
    pub dry_run: bool,
    /// Kill the command after this long
    pub timeout: Option<Duration>,
}

impl RunOptions {
    /// Dry-run options
    #[inline]
    #[must_use]
    pub fn dry_run() -> Self {
        Self {
            dry_run: true,
            timeout: None,
        }
    }

    /// With timeout
    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Executes the configured tests
#[async_trait::async_trait]
pub trait TestRunner: Send + Sync {
    /// Run tests under `settings`
    async fn run(&self, settings: &Settings, options: RunOptions) -> RunnerOutput;
}

/// Runner dispatching on [`RunnerMode`]
#[derive(Clone)]
pub struct CommandRunner {
    clock: Arc<dyn Clock>,
}

impl CommandRunner {
    /// Create new runner
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    fn run_mock(&self, settings: &Settings) -> RunnerOutput {
        let started_at = self.clock.now();
        let finished_at = started_at
            + chrono::Duration::from_std(MOCK_DURATION).unwrap_or_else(|_| chrono::Duration::zero());

        let outcome = if settings.thresholds.tolerates_failures() {
            Outcome {
                status: RunStatus::Partial,
                exit_code: 1,
                stdout: format!("Mock runner executed for {}", settings.tests_dir),
                stderr: "One or more mock tests failed.".to_string(),
            }
        } else {
            Outcome::success(format!("Mock runner executed for {}", settings.tests_dir), "")
        };

        report::assemble(
            RunnerMode::Mock,
            MOCK_COMMAND_LABEL,
            started_at,
            finished_at,
            outcome,
        )
    }

    async fn run_shell(&self, settings: &Settings, options: RunOptions) -> RunnerOutput {
        let command = settings.runner.command_or_default();
        let started_at = self.clock.now();

        if options.dry_run {
            tracing::info!(command, "dry run, skipping test command");
            return report::assemble(
                RunnerMode::Shell,
                command,
                started_at,
                started_at,
                Outcome::success(DRY_RUN_MARKER, ""),
            );
        }

        tracing::info!(command, cwd = ?settings.runner.cwd, "running test command");
        let outcome = shell::execute(command, &settings.runner, options.timeout).await;
        let finished_at = self.clock.now();

        tracing::info!(
            command,
            status = %outcome.status,
            exit_code = outcome.exit_code,
            "test command finished"
        );
        report::assemble(RunnerMode::Shell, command, started_at, finished_at, outcome)
    }
}

impl Default for CommandRunner {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl std::fmt::Debug for CommandRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRunner").finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl TestRunner for CommandRunner {
    async fn run(&self, settings: &Settings, options: RunOptions) -> RunnerOutput {
        match settings.runner.mode {
            RunnerMode::Mock => self.run_mock(settings),
            RunnerMode::Shell => self.run_shell(settings, options).await,
        }
    }
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;
    use aitests_core::{FixedClock, RawConfig, RawThresholds, RunnerSetting};
    use chrono::{DateTime, Utc};
    use pretty_assertions::assert_eq;

    fn at() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn runner() -> CommandRunner {
        CommandRunner::new(Arc::new(FixedClock(at())))
    }

    fn mock_settings(fraction: Option<f64>) -> Settings {
        Settings::normalize(Some(
            RawConfig::default()
                .with_runner(RunnerSetting::Named("mock".into()))
                .with_thresholds(RawThresholds {
                    repair: None,
                    allowed_failure_percentage: fraction,
                }),
        ))
    }

    #[tokio::test]
    async fn mock_without_threshold_succeeds() {
        let out = runner().run(&mock_settings(None), RunOptions::default()).await;
        assert_eq!(out.result.status, RunStatus::Success);
        assert_eq!(out.result.duration_ms, 250);
        assert_eq!(out.result.runner.command.as_deref(), Some(MOCK_COMMAND_LABEL));
        assert_eq!(out.result.runner.stdout.as_deref(), Some("Mock runner executed for tests"));
        assert_eq!(out.result.runner.exit_code, 0);
    }

    #[tokio::test]
    async fn mock_with_positive_threshold_is_partial() {
        let out = runner().run(&mock_settings(Some(0.1)), RunOptions::default()).await;
        assert_eq!(out.result.status, RunStatus::Partial);
        assert_eq!(out.result.summary.skipped, 1);
        assert_eq!(out.result.runner.exit_code, 1);
        assert!(out.log.contains("One or more mock tests failed."));
    }

    #[tokio::test]
    async fn mock_with_zero_threshold_succeeds() {
        let out = runner().run(&mock_settings(Some(0.0)), RunOptions::default()).await;
        assert_eq!(out.result.status, RunStatus::Success);
    }

    #[tokio::test]
    async fn shell_dry_run_skips_execution() {
        let settings = Settings::normalize(Some(
            RawConfig::default().with_runner(RunnerSetting::Named("exit 9".into())),
        ));
        let out = runner().run(&settings, RunOptions::dry_run()).await;
        assert_eq!(out.result.status, RunStatus::Success);
        assert_eq!(out.result.duration_ms, 0);
        assert_eq!(out.result.runner.stdout.as_deref(), Some(DRY_RUN_MARKER));
        assert_eq!(out.result.files[0].file_path, "exit 9");
    }
}
