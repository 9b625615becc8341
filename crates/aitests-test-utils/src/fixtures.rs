//! Fixture builders

use aitests_core::{
    CoveragePlan, CoverageStatus, CoverageTarget, FileRunResult, Priority, RunError, RunResult,
    RunStatus, RunSummary, RunnerMeta, RunnerMode, TestKind,
};
use chrono::{DateTime, Utc};

pub fn epoch() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

/// Run result with one record per `(path, error)`; an empty list yields
/// the single synthetic record a command runner produces
pub fn run_result(status: RunStatus, failing: &[(&str, &str)]) -> RunResult {
    let files = if failing.is_empty() {
        let counts = status.unit_counts();
        vec![FileRunResult {
            file_path: "pnpm test".to_string(),
            passed: counts.passed,
            failed: counts.failed,
            skipped: counts.skipped,
            duration_ms: Some(10),
            errors: Vec::new(),
        }]
    } else {
        failing
            .iter()
            .map(|(path, error)| FileRunResult {
                file_path: (*path).to_string(),
                passed: 0,
                failed: 1,
                skipped: 0,
                duration_ms: Some(10),
                errors: if error.is_empty() {
                    Vec::new()
                } else {
                    vec![RunError::message(*error)]
                },
            })
            .collect()
    };
    let summary = if failing.is_empty() {
        status.unit_counts()
    } else {
        RunSummary::new(0, failing.len(), 0)
    };

    RunResult {
        status,
        started_at: epoch(),
        finished_at: epoch(),
        duration_ms: 10,
        summary,
        files,
        runner: RunnerMeta {
            mode: RunnerMode::Shell,
            command: Some("pnpm test".to_string()),
            exit_code: i32::from(status != RunStatus::Success),
            stdout: None,
            stderr: None,
        },
    }
}

pub fn uncovered(path: &str, priority: Priority) -> CoverageTarget {
    CoverageTarget::new(path, TestKind::Unit, priority, CoverageStatus::NotCovered)
        .with_display_name(aitests_core::paths::display_name(path))
}

pub fn covered(path: &str) -> CoverageTarget {
    CoverageTarget::new(path, TestKind::Unit, Priority::Important, CoverageStatus::Ok)
}

pub fn plan_with(targets: Vec<CoverageTarget>) -> CoveragePlan {
    CoveragePlan::empty(vec!["src/**/*.ts".to_string()], epoch()).update_targets(targets, epoch())
}
