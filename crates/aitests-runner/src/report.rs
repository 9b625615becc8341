//! Uniform run result assembly
//!
//! Both runners report one synthetic file record named after the command
//! label; counts are derived from the status alone.

use aitests_core::{FileRunResult, RunError, RunResult, RunStatus, RunnerMeta, RunnerMode};
use chrono::{DateTime, Utc};

/// Longest stderr excerpt surfaced as an error message
pub const MAX_ERROR_CHARS: usize = 2000;

/// Run result plus human-readable execution log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerOutput {
    /// Structured result
    pub result: RunResult,
    /// Free-text log
    pub log: String,
}

/// Raw process outcome before assembly
#[derive(Debug, Clone)]
pub(crate) struct Outcome {
    pub(crate) status: RunStatus,
    pub(crate) exit_code: i32,
    pub(crate) stdout: String,
    pub(crate) stderr: String,
}

impl Outcome {
    pub(crate) fn success(stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            status: RunStatus::Success,
            exit_code: 0,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    pub(crate) fn failed(
        exit_code: i32,
        stdout: impl Into<String>,
        stderr: impl Into<String>,
    ) -> Self {
        Self {
            status: RunStatus::Failed,
            exit_code,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }
}

/// First `max` characters of `text`
#[must_use]
pub fn clip_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn non_empty(text: String) -> Option<String> {
    (!text.is_empty()).then_some(text)
}

pub(crate) fn assemble(
    mode: RunnerMode,
    label: &str,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    outcome: Outcome,
) -> RunnerOutput {
    let duration_ms = u64::try_from((finished_at - started_at).num_milliseconds()).unwrap_or(0);
    let summary = outcome.status.unit_counts();

    let errors = if summary.failed > 0 && !outcome.stderr.is_empty() {
        vec![RunError::message(clip_chars(&outcome.stderr, MAX_ERROR_CHARS))]
    } else {
        Vec::new()
    };

    let log = render_log(label, outcome.status, outcome.exit_code, &outcome.stdout, &outcome.stderr);

    let result = RunResult {
        status: outcome.status,
        started_at,
        finished_at,
        duration_ms,
        summary,
        files: vec![FileRunResult {
            file_path: label.to_string(),
            passed: summary.passed,
            failed: summary.failed,
            skipped: summary.skipped,
            duration_ms: Some(duration_ms),
            errors,
        }],
        runner: RunnerMeta {
            mode,
            command: Some(label.to_string()),
            exit_code: outcome.exit_code,
            stdout: non_empty(outcome.stdout),
            stderr: non_empty(outcome.stderr),
        },
    };

    RunnerOutput { result, log }
}

fn render_log(label: &str, status: RunStatus, exit_code: i32, stdout: &str, stderr: &str) -> String {
    let mut lines = vec![
        format!("command={label}"),
        format!("status={status}"),
        format!("exitCode={exit_code}"),
    ];
    if !stdout.is_empty() {
        lines.push(format!("stdout:\n{stdout}"));
    }
    if !stderr.is_empty() {
        lines.push(format!("stderr:\n{stderr}"));
    }
    lines.join("\n")
}
