//! Coverage plan model
//!
//! A plan is an insertion-ordered set of [`CoverageTarget`]s keyed by
//! source path plus a summary that is always a fold over those targets.
//! Every mutation returns a new plan; the summary is recomputed on each
//! update and whenever a plan is deserialized, so a stale summary can
//! never be persisted.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Kind of test a target needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestKind {
    /// Unit test
    #[default]
    Unit,
    /// Integration test
    Integration,
}

/// Target priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    /// Must be covered
    Critical,
    /// Should be covered
    #[default]
    Important,
    /// Covered opportunistically
    NiceToHave,
}

/// Coverage classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageStatus {
    /// No tests at all
    #[default]
    NotCovered,
    /// Some tests exist
    Partial,
    /// Adequately covered
    Ok,
}

/// One source file's coverage record. Identity is `path`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageTarget {
    /// Source path (unique key)
    pub path: String,
    /// Short display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Module name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_name: Option<String>,
    /// Kind of test
    #[serde(rename = "testType", default)]
    pub kind: TestKind,
    /// Priority
    #[serde(default)]
    pub priority: Priority,
    /// Coverage status
    #[serde(default)]
    pub coverage_status: CoverageStatus,
    /// Coverage estimate in [0, 1]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage_estimate: Option<f64>,
    /// Whether tests were detected for this file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_existing_tests: Option<bool>,
    /// Free-form tags
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Free-form notes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl CoverageTarget {
    /// Create new target
    #[must_use]
    pub fn new(
        path: impl Into<String>,
        kind: TestKind,
        priority: Priority,
        coverage_status: CoverageStatus,
    ) -> Self {
        Self {
            path: path.into(),
            display_name: None,
            module_name: None,
            kind,
            priority,
            coverage_status,
            coverage_estimate: None,
            has_existing_tests: None,
            tags: Vec::new(),
            notes: Vec::new(),
        }
    }

    /// With display name
    #[inline]
    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// With module name
    #[inline]
    #[must_use]
    pub fn with_module_name(mut self, name: impl Into<String>) -> Self {
        self.module_name = Some(name.into());
        self
    }

    /// With coverage estimate, clamped to [0, 1]
    #[inline]
    #[must_use]
    pub fn with_estimate(mut self, estimate: f64) -> Self {
        self.coverage_estimate = Some(estimate.clamp(0.0, 1.0));
        self
    }

    /// With existing-test flag
    #[inline]
    #[must_use]
    pub fn with_existing_tests(mut self, has_tests: bool) -> Self {
        self.has_existing_tests = Some(has_tests);
        self
    }

    /// With tags
    #[inline]
    #[must_use]
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// With an extra note
    #[inline]
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Whether this target is eligible for automatic generation
    ///
    /// Partial coverage of a nice-to-have target is never auto-generated.
    #[inline]
    #[must_use]
    pub fn needs_generation(&self) -> bool {
        match self.coverage_status {
            CoverageStatus::NotCovered => true,
            CoverageStatus::Partial => self.priority != Priority::NiceToHave,
            CoverageStatus::Ok => false,
        }
    }

    fn matches_filter(&self, filter: &HashSet<&str>) -> bool {
        filter.contains(self.path.as_str())
            || self
                .display_name
                .as_deref()
                .is_some_and(|name| filter.contains(name))
    }
}

/// Per-status target counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSummary {
    /// Number of targets
    pub total_targets: usize,
    /// Targets with status `not_covered`
    pub not_covered: usize,
    /// Targets with status `partial`
    pub partial: usize,
    /// Targets with status `ok`
    pub ok: usize,
}

impl PlanSummary {
    /// Fold targets into per-status counts
    pub fn from_targets<'a>(targets: impl IntoIterator<Item = &'a CoverageTarget>) -> Self {
        targets.into_iter().fold(Self::default(), |mut acc, target| {
            acc.total_targets += 1;
            match target.coverage_status {
                CoverageStatus::NotCovered => acc.not_covered += 1,
                CoverageStatus::Partial => acc.partial += 1,
                CoverageStatus::Ok => acc.ok += 1,
            }
            acc
        })
    }

    /// Coverage debt: not covered plus partial
    #[inline]
    #[must_use]
    pub fn uncovered(&self) -> usize {
        self.not_covered + self.partial
    }
}

/// Coverage plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PlanArtifact", into = "PlanArtifact")]
pub struct CoveragePlan {
    generated_at: DateTime<Utc>,
    sources: Vec<String>,
    targets: IndexMap<String, CoverageTarget>,
    summary: PlanSummary,
    heuristics: Vec<String>,
}

impl CoveragePlan {
    /// Plan with no targets
    #[must_use]
    pub fn empty(sources: Vec<String>, now: DateTime<Utc>) -> Self {
        Self {
            generated_at: now,
            sources,
            targets: IndexMap::new(),
            summary: PlanSummary::default(),
            heuristics: Vec::new(),
        }
    }

    /// Upsert targets by path, producing a new plan
    ///
    /// A target whose path is already present replaces the old one in
    /// place; new paths are appended in the order given.
    #[must_use]
    pub fn update_targets(
        &self,
        next: impl IntoIterator<Item = CoverageTarget>,
        now: DateTime<Utc>,
    ) -> Self {
        let mut targets = self.targets.clone();
        for target in next {
            targets.insert(target.path.clone(), target);
        }
        let summary = PlanSummary::from_targets(targets.values());

        Self {
            generated_at: now,
            sources: self.sources.clone(),
            targets,
            summary,
            heuristics: self.heuristics.clone(),
        }
    }

    /// Record the heuristics used to build this plan
    #[must_use]
    pub fn with_heuristics(mut self, heuristics: Vec<String>) -> Self {
        self.heuristics = heuristics;
        self
    }

    /// Targets needing generation, optionally restricted to paths or display names
    ///
    /// An empty filter means no restriction. Filter entries are trimmed.
    #[must_use]
    pub fn needs_generation(&self, filter: Option<&[String]>) -> Vec<&CoverageTarget> {
        let requested: Option<HashSet<&str>> = filter
            .filter(|f| !f.is_empty())
            .map(|f| f.iter().map(|item| item.trim()).collect());

        self.targets
            .values()
            .filter(|target| target.needs_generation())
            .filter(|target| requested.as_ref().map_or(true, |r| target.matches_filter(r)))
            .collect()
    }

    /// Not covered plus partial
    #[inline]
    #[must_use]
    pub fn uncovered_count(&self) -> usize {
        self.summary.uncovered()
    }

    /// Summary counts
    #[inline]
    #[must_use]
    pub fn summary(&self) -> &PlanSummary {
        &self.summary
    }

    /// Whether the plan has no targets
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Targets in insertion order
    pub fn targets(&self) -> impl Iterator<Item = &CoverageTarget> {
        self.targets.values()
    }

    /// Look up a target by path
    #[inline]
    #[must_use]
    pub fn target(&self, path: &str) -> Option<&CoverageTarget> {
        self.targets.get(path)
    }

    /// Generation timestamp
    #[inline]
    #[must_use]
    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    /// Source globs used
    #[inline]
    #[must_use]
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// Heuristics recorded for this plan
    #[inline]
    #[must_use]
    pub fn heuristics(&self) -> &[String] {
        &self.heuristics
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlanArtifact {
    generated_at: DateTime<Utc>,
    sources: Vec<String>,
    targets: Vec<CoverageTarget>,
    summary: PlanSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    heuristics: Option<Vec<String>>,
}

impl From<PlanArtifact> for CoveragePlan {
    fn from(artifact: PlanArtifact) -> Self {
        let plan = CoveragePlan::empty(artifact.sources, artifact.generated_at)
            .update_targets(artifact.targets, artifact.generated_at);
        if plan.summary != artifact.summary {
            tracing::debug!(
                persisted = ?artifact.summary,
                recomputed = ?plan.summary,
                "recomputed stale plan summary"
            );
        }
        plan.with_heuristics(artifact.heuristics.unwrap_or_default())
    }
}

impl From<CoveragePlan> for PlanArtifact {
    fn from(plan: CoveragePlan) -> Self {
        Self {
            generated_at: plan.generated_at,
            sources: plan.sources,
            targets: plan.targets.into_values().collect(),
            summary: plan.summary,
            heuristics: (!plan.heuristics.is_empty()).then_some(plan.heuristics),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    fn target(path: &str, status: CoverageStatus, priority: Priority) -> CoverageTarget {
        CoverageTarget::new(path, TestKind::Unit, priority, status)
    }

    #[test]
    fn empty_plan_has_zero_summary() {
        let plan = CoveragePlan::empty(vec!["src/**/*.ts".into()], at(0));
        assert!(plan.is_empty());
        assert_eq!(*plan.summary(), PlanSummary::default());
        assert_eq!(plan.uncovered_count(), 0);
    }

    #[test]
    fn update_upserts_by_path_and_keeps_position() {
        let plan = CoveragePlan::empty(vec![], at(0)).update_targets(
            vec![
                target("a.ts", CoverageStatus::NotCovered, Priority::Critical),
                target("b.ts", CoverageStatus::Partial, Priority::Important),
            ],
            at(1),
        );
        let plan = plan.update_targets(
            vec![
                target("a.ts", CoverageStatus::Ok, Priority::Critical),
                target("c.ts", CoverageStatus::NotCovered, Priority::NiceToHave),
            ],
            at(2),
        );

        let paths: Vec<_> = plan.targets().map(|t| t.path.as_str()).collect();
        assert_eq!(paths, vec!["a.ts", "b.ts", "c.ts"]);
        assert_eq!(plan.target("a.ts").unwrap().coverage_status, CoverageStatus::Ok);
        assert_eq!(
            *plan.summary(),
            PlanSummary {
                total_targets: 3,
                not_covered: 1,
                partial: 1,
                ok: 1
            }
        );
        assert_eq!(plan.generated_at(), at(2));
    }

    #[test]
    fn update_does_not_touch_original() {
        let plan = CoveragePlan::empty(vec![], at(0));
        let next = plan.update_targets(vec![target("a.ts", CoverageStatus::NotCovered, Priority::Critical)], at(1));
        assert!(plan.is_empty());
        assert_eq!(next.summary().total_targets, 1);
    }

    #[test]
    fn update_is_idempotent() {
        let input = vec![
            target("a.ts", CoverageStatus::NotCovered, Priority::Critical),
            target("b.ts", CoverageStatus::Ok, Priority::Important),
        ];
        let once = CoveragePlan::empty(vec![], at(0)).update_targets(input.clone(), at(1));
        let twice = once.update_targets(input, at(1));
        assert_eq!(once, twice);
    }

    #[test]
    fn needs_generation_rules() {
        let plan = CoveragePlan::empty(vec![], at(0)).update_targets(
            vec![
                target("nc.ts", CoverageStatus::NotCovered, Priority::NiceToHave),
                target("p-crit.ts", CoverageStatus::Partial, Priority::Critical),
                target("p-nice.ts", CoverageStatus::Partial, Priority::NiceToHave),
                target("ok.ts", CoverageStatus::Ok, Priority::Critical),
            ],
            at(1),
        );

        let paths: Vec<_> = plan.needs_generation(None).iter().map(|t| t.path.as_str()).collect();
        assert_eq!(paths, vec!["nc.ts", "p-crit.ts"]);
        assert_eq!(plan.uncovered_count(), 3);
    }

    #[test]
    fn needs_generation_filters_by_path_or_display_name() {
        let plan = CoveragePlan::empty(vec![], at(0)).update_targets(
            vec![
                target("src/core/a.ts", CoverageStatus::NotCovered, Priority::Critical)
                    .with_display_name("core/a.ts"),
                target("src/core/b.ts", CoverageStatus::NotCovered, Priority::Critical),
            ],
            at(1),
        );

        let by_name = plan.needs_generation(Some(&[" core/a.ts ".to_string()]));
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].path, "src/core/a.ts");

        let by_path = plan.needs_generation(Some(&["src/core/b.ts".to_string()]));
        assert_eq!(by_path[0].path, "src/core/b.ts");

        assert!(plan.needs_generation(Some(&["nope.ts".to_string()])).is_empty());
        assert_eq!(plan.needs_generation(Some(&[])).len(), 2);
    }

    #[test]
    fn deserialization_recomputes_stale_summary_and_dedups() {
        let raw = json!({
            "generatedAt": "2024-01-01T00:00:00Z",
            "sources": ["src/**/*.ts"],
            "targets": [
                { "path": "a.ts", "testType": "unit", "priority": "critical", "coverageStatus": "not_covered" },
                { "path": "a.ts", "testType": "unit", "priority": "critical", "coverageStatus": "ok" }
            ],
            "summary": { "totalTargets": 9, "notCovered": 9, "partial": 0, "ok": 0 }
        });
        let plan: CoveragePlan = serde_json::from_value(raw).unwrap();
        assert_eq!(
            *plan.summary(),
            PlanSummary {
                total_targets: 1,
                not_covered: 0,
                partial: 0,
                ok: 1
            }
        );
    }

    #[test]
    fn serializes_wire_shape() {
        let plan = CoveragePlan::empty(vec!["src/**/*.ts".into()], at(0)).update_targets(
            vec![target("a.ts", CoverageStatus::NotCovered, Priority::NiceToHave).with_estimate(3.0)],
            at(0),
        );
        let value = serde_json::to_value(&plan).unwrap();
        assert_eq!(value["targets"][0]["testType"], "unit");
        assert_eq!(value["targets"][0]["priority"], "nice-to-have");
        assert_eq!(value["targets"][0]["coverageStatus"], "not_covered");
        assert_eq!(value["targets"][0]["coverageEstimate"], 1.0);
        assert_eq!(value["summary"]["notCovered"], 1);
        assert!(value.get("heuristics").is_none());
    }
}
