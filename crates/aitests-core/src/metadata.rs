//! Workspace metadata and audit scoring

use crate::config::{RunnerMode, Settings, Strategy};
use crate::run::RunStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Introductory document placed in a fresh tests directory
pub const TESTS_README: &str = "# Tests\n\n\
Generated and curated test suites live here.\n\n\
- Plan coverage with `aitests plan`.\n\
- Generate candidate tests with `aitests generate`.\n\
- Execute them with `aitests run` and iterate with `aitests repair`.\n";

/// Snapshot written by `init`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    /// Tool version
    pub plugin_version: String,
    /// Canonical settings at init time
    pub config_snapshot: Settings,
    /// Runner mode
    pub runner_mode: RunnerMode,
    /// Strategy
    pub strategy: Strategy,
    /// Last update
    pub last_updated: DateTime<Utc>,
}

impl Metadata {
    /// Snapshot of `settings`
    #[must_use]
    pub fn snapshot(version: impl Into<String>, settings: Settings, now: DateTime<Utc>) -> Self {
        Self {
            plugin_version: version.into(),
            runner_mode: settings.runner.mode,
            strategy: settings.strategy,
            config_snapshot: settings,
            last_updated: now,
        }
    }
}

/// Audit inputs and derived score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditReport {
    /// Whether a plan artifact exists
    pub plan_exists: bool,
    /// Status of the last persisted run
    pub last_run: Option<RunStatus>,
    /// Number of logged iterations
    pub iterations: usize,
}

impl AuditReport {
    /// Health score in [40, 100]
    #[must_use]
    pub fn score(&self) -> u32 {
        let mut score = 40;
        if self.plan_exists {
            score += 30;
        }
        if self.last_run == Some(RunStatus::Success) {
            score += 20;
        }
        if self.iterations > 0 {
            score += 10;
        }
        score.min(100)
    }

    /// One-line summary
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Plan={} · Run={} · Score={}",
            self.plan_exists,
            self.last_run_label(),
            self.score()
        )
    }

    /// Markdown report
    #[must_use]
    pub fn to_markdown(&self) -> String {
        [
            "# AI Tests Audit Report".to_string(),
            String::new(),
            format!(
                "- Plan: {}",
                if self.plan_exists { "available" } else { "missing" }
            ),
            format!("- Last run status: {}", self.last_run_label()),
            format!("- Iterations logged: {}", self.iterations),
            format!("- Score: {}", self.score()),
        ]
        .join("\n")
    }

    fn last_run_label(&self) -> &'static str {
        self.last_run.map_or("n/a", RunStatus::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_components() {
        let bare = AuditReport {
            plan_exists: false,
            last_run: None,
            iterations: 0,
        };
        assert_eq!(bare.score(), 40);

        let full = AuditReport {
            plan_exists: true,
            last_run: Some(RunStatus::Success),
            iterations: 3,
        };
        assert_eq!(full.score(), 100);

        let failing = AuditReport {
            last_run: Some(RunStatus::Failed),
            ..full
        };
        assert_eq!(failing.score(), 80);
    }

    #[test]
    fn markdown_mentions_every_input() {
        let report = AuditReport {
            plan_exists: true,
            last_run: Some(RunStatus::Partial),
            iterations: 2,
        };
        let md = report.to_markdown();
        assert!(md.starts_with("# AI Tests Audit Report"));
        assert!(md.contains("- Plan: available"));
        assert!(md.contains("- Last run status: partial"));
        assert!(md.contains("- Iterations logged: 2"));
        assert_eq!(report.summary(), "Plan=true · Run=partial · Score=80");
    }

    #[test]
    fn metadata_snapshot_copies_modes() {
        let at = DateTime::from_timestamp(0, 0).unwrap();
        let meta = Metadata::snapshot("0.1.0", Settings::default(), at);
        assert_eq!(meta.runner_mode, RunnerMode::Shell);
        let value = serde_json::to_value(&meta).unwrap();
        assert_eq!(value["configSnapshot"]["testsDir"], "tests");
        assert_eq!(value["strategy"], "llm-generate");
    }
}
