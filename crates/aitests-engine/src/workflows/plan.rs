//! Heuristic coverage planning

use crate::engine::{TestsEngine, STDOUT_PATH};
use crate::error::EngineResult;
use crate::io::{PlanInput, PlanOutput};
use crate::services::TestDetection;
use aitests_core::paths::{display_name, module_name};
use aitests_core::{CoveragePlan, CoverageStatus, CoverageTarget, Priority, TestKind};

/// Note attached to targets the heuristic plan marks uncovered
pub const HEURISTIC_NOTE: &str = "generated via heuristic plan";

/// Heuristics recorded on every plan built here
pub const PLAN_HEURISTICS: [&str; 3] = [
    "priority: /core/ or /domain/ is critical, /infra/ or /services/ is important",
    "kind: /infra/ or /integration/ is integration",
    "coverage: sibling *.test.* / *.spec.* or dedicated test file",
];

/// Priority inferred from the source path
#[must_use]
pub fn infer_priority(path: &str) -> Priority {
    let path = path.replace('\\', "/");
    if path.contains("/core/") || path.contains("/domain/") {
        Priority::Critical
    } else if path.contains("/infra/") || path.contains("/services/") {
        Priority::Important
    } else {
        Priority::NiceToHave
    }
}

/// Test kind inferred from the source path
#[must_use]
pub fn infer_kind(path: &str) -> TestKind {
    let path = path.replace('\\', "/");
    if path.contains("/infra/") || path.contains("/integration/") {
        TestKind::Integration
    } else {
        TestKind::Unit
    }
}

/// Coverage target for a source file
#[must_use]
pub fn heuristic_target(path: &str, detection: TestDetection) -> CoverageTarget {
    let covered = detection.covered();
    let target = CoverageTarget::new(
        path,
        infer_kind(path),
        infer_priority(path),
        if covered {
            CoverageStatus::Ok
        } else {
            CoverageStatus::NotCovered
        },
    )
    .with_display_name(display_name(path))
    .with_module_name(module_name(path))
    .with_existing_tests(covered);

    if covered {
        target.with_estimate(1.0).with_tags(vec!["covered".into()])
    } else {
        target
            .with_estimate(0.0)
            .with_tags(vec!["needs-tests".into()])
            .with_note(HEURISTIC_NOTE)
    }
}

impl TestsEngine {
    /// Build (or incrementally update) the coverage plan
    ///
    /// # Errors
    ///
    /// Propagates workspace and configuration failures.
    pub async fn plan(&self, input: PlanInput) -> EngineResult<PlanOutput> {
        let settings = self.settings().await?;
        let workspace = &self.services.workspace;
        let globs = input
            .sources
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| settings.sources.clone());

        let sources = workspace.glob_sources(&globs).await?;
        let detections = workspace.detect_tests(&sources, &settings.tests_dir).await?;
        tracing::debug!(sources = sources.len(), "discovered source files");

        let targets: Vec<CoverageTarget> = sources
            .iter()
            .map(|path| heuristic_target(path, detections.get(path).copied().unwrap_or_default()))
            .collect();

        let now = self.services.clock.now();
        let base = if input.incremental {
            workspace.read_plan().await?
        } else {
            None
        };
        let plan = base
            .unwrap_or_else(|| CoveragePlan::empty(globs, now))
            .update_targets(targets, now)
            .with_heuristics(PLAN_HEURISTICS.iter().map(ToString::to_string).collect());

        let plan_path = if input.dry_run {
            STDOUT_PATH.to_string()
        } else {
            workspace.write_plan(&plan).await?
        };

        let summary = *plan.summary();
        tracing::info!(
            targets = summary.total_targets,
            not_covered = summary.not_covered,
            plan = %plan_path,
            "planning complete"
        );

        Ok(PlanOutput {
            plan_path,
            summary,
            total_targets: summary.total_targets,
            not_covered: summary.not_covered,
            uncovered: plan.uncovered_count(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_and_kind_heuristics() {
        assert_eq!(infer_priority("src/core/a.ts"), Priority::Critical);
        assert_eq!(infer_priority("src/domain/a.ts"), Priority::Critical);
        assert_eq!(infer_priority("src/services/a.ts"), Priority::Important);
        assert_eq!(infer_priority("src/util/a.ts"), Priority::NiceToHave);
        assert_eq!(infer_kind("src/infra/db.ts"), TestKind::Integration);
        assert_eq!(infer_kind("src\\integration\\x.ts"), TestKind::Integration);
        assert_eq!(infer_kind("src/core/a.ts"), TestKind::Unit);
    }

    #[test]
    fn uncovered_target_shape() {
        let target = heuristic_target("src/core/a.ts", TestDetection::default());
        assert_eq!(target.coverage_status, CoverageStatus::NotCovered);
        assert_eq!(target.coverage_estimate, Some(0.0));
        assert_eq!(target.tags, vec!["needs-tests"]);
        assert_eq!(target.notes, vec![HEURISTIC_NOTE]);
        assert_eq!(target.display_name.as_deref(), Some("core/a.ts"));
        assert_eq!(target.module_name.as_deref(), Some("src/core/a"));
        assert_eq!(target.has_existing_tests, Some(false));
    }

    #[test]
    fn covered_target_shape() {
        let detection = TestDetection {
            has_sibling_test: true,
            has_dedicated_test: false,
        };
        let target = heuristic_target("src/infra/db.ts", detection);
        assert_eq!(target.coverage_status, CoverageStatus::Ok);
        assert_eq!(target.coverage_estimate, Some(1.0));
        assert_eq!(target.tags, vec!["covered"]);
        assert!(target.notes.is_empty());
        assert_eq!(target.kind, TestKind::Integration);
    }
}
