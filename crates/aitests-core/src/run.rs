//! Test run results

use crate::config::RunnerMode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Overall run outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// Everything passed
    Success,
    /// Command failed
    Failed,
    /// Failures tolerated
    Partial,
}

impl RunStatus {
    /// Wire spelling
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RunStatus::Success => "success",
            RunStatus::Failed => "failed",
            RunStatus::Partial => "partial",
        }
    }

    /// Counts for the single synthetic record: (passed, failed, skipped)
    #[inline]
    #[must_use]
    pub fn unit_counts(self) -> RunSummary {
        match self {
            RunStatus::Success => RunSummary::new(1, 0, 0),
            RunStatus::Failed => RunSummary::new(0, 1, 0),
            RunStatus::Partial => RunSummary::new(0, 0, 1),
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate pass/fail/skip counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunSummary {
    /// Passed
    pub passed: usize,
    /// Failed
    pub failed: usize,
    /// Skipped
    pub skipped: usize,
}

impl RunSummary {
    /// Create new summary
    #[inline]
    #[must_use]
    pub fn new(passed: usize, failed: usize, skipped: usize) -> Self {
        Self {
            passed,
            failed,
            skipped,
        }
    }
}

/// Structured failure captured for a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunError {
    /// Failing test, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_name: Option<String>,
    /// Failure message
    pub message: String,
    /// Stack trace
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl RunError {
    /// Error carrying only a message
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            test_name: None,
            message: message.into(),
            stack: None,
        }
    }
}

/// Per-file result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRunResult {
    /// File (or synthetic command label)
    pub file_path: String,
    /// Passed
    pub passed: usize,
    /// Failed
    pub failed: usize,
    /// Skipped
    pub skipped: usize,
    /// Elapsed time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    /// Captured failures
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<RunError>,
}

impl FileRunResult {
    /// First captured error message
    #[inline]
    #[must_use]
    pub fn first_error(&self) -> Option<&str> {
        self.errors.first().map(|e| e.message.as_str())
    }
}

/// Runner metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunnerMeta {
    /// Mode used
    pub mode: RunnerMode,
    /// Command label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Process exit code
    pub exit_code: i32,
    /// Captured stdout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdout: Option<String>,
    /// Captured stderr
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
}

/// Outcome of one runner invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    /// Overall status
    pub status: RunStatus,
    /// Start time
    pub started_at: DateTime<Utc>,
    /// Finish time
    pub finished_at: DateTime<Utc>,
    /// Elapsed milliseconds
    pub duration_ms: u64,
    /// Aggregate counts
    pub summary: RunSummary,
    /// Per-file records
    pub files: Vec<FileRunResult>,
    /// Runner metadata
    pub runner: RunnerMeta,
}

impl RunResult {
    /// File records with at least one failure
    pub fn failing_files(&self) -> impl Iterator<Item = &FileRunResult> {
        self.files.iter().filter(|file| file.failed > 0)
    }

    /// Paths of failing files
    #[must_use]
    pub fn failed_file_paths(&self) -> Vec<String> {
        self.failing_files().map(|f| f.file_path.clone()).collect()
    }

    /// Whether the run succeeded
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Success
    }
}
