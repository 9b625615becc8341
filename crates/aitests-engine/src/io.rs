//! Operation input and output records

use aitests_core::{GenerationResult, IterationRecord, PlanSummary, RunResult, Strategy};
use serde::Serialize;
use std::time::Duration;

/// `init` input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitInput {
    /// Tests directory override
    pub tests_dir: Option<String>,
    /// Report without touching the workspace
    pub dry_run: bool,
}

/// `init` output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitOutput {
    /// Effective tests directory
    pub tests_dir: String,
    /// Paths created
    pub created: Vec<String>,
    /// Paths that already existed
    pub skipped: Vec<String>,
    /// Metadata artifact, absent on dry runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata_path: Option<String>,
    /// One-line summary
    pub summary: String,
}

/// `plan` input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanInput {
    /// Source globs override
    pub sources: Option<Vec<String>>,
    /// Skip persistence
    pub dry_run: bool,
    /// Upsert into the persisted plan instead of replacing it
    pub incremental: bool,
}

/// `plan` output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanOutput {
    /// Plan artifact, `stdout` on dry runs
    pub plan_path: String,
    /// Summary counts
    pub summary: PlanSummary,
    /// Total targets
    pub total_targets: usize,
    /// Targets not covered
    pub not_covered: usize,
    /// Not covered plus partial
    pub uncovered: usize,
}

/// `generate` input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateInput {
    /// Restrict to these paths or display names
    pub targets: Option<Vec<String>>,
    /// Never write test files
    pub dry_run: bool,
    /// Strategy override
    pub strategy: Option<Strategy>,
}

/// `generate` output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateOutput {
    /// Classified results
    pub generated: Vec<GenerationResult>,
    /// Artifacts touched, iterations first
    pub artifacts: Vec<String>,
    /// One-line summary
    pub summary: String,
}

/// `run` input
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunInput {
    /// Skip execution
    pub dry_run: bool,
    /// Kill the command after this long
    pub timeout: Option<Duration>,
}

/// `run` output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunOutput {
    /// Run artifact, `dry-run` on dry runs
    pub run_path: String,
    /// Log artifact, `dry-run` on dry runs
    pub log_path: String,
    /// Run result
    pub result: RunResult,
}

/// `repair` input
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepairInput {
    /// Reuse the prior run instead of re-running
    pub dry_run: bool,
    /// Lower the configured attempt budget
    pub max_attempts: Option<u32>,
    /// Kill the re-run after this long
    pub timeout: Option<Duration>,
}

/// `repair` output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairOutput {
    /// Completed attempt
    pub iteration: IterationRecord,
    /// Budget fully consumed after this attempt
    pub max_attempts_reached: bool,
    /// Effective attempt limit
    pub limit: usize,
}

/// `audit` input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditInput {
    /// Consider the plan artifact
    pub include_plan: bool,
    /// Consider the last run
    pub include_runs: bool,
    /// Skip persistence
    pub dry_run: bool,
}

impl Default for AuditInput {
    fn default() -> Self {
        Self {
            include_plan: true,
            include_runs: true,
            dry_run: false,
        }
    }
}

/// `audit` output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditOutput {
    /// Report artifact, `dry-run` on dry runs
    pub report_path: String,
    /// Health score
    pub score: u32,
    /// One-line summary
    pub summary: String,
}
