//! Generation results and the safe-to-write classifier

use crate::config::Strategy;
use crate::error::CoreError;
use crate::plan::{CoverageTarget, Priority, TestKind};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Warning attached when the output path already exists on disk
pub const COLLISION_WARNING: &str = "existing test file detected; writing is treated as needs-review";

/// Warning attached when a result flags itself as uncertain
pub const LOW_CONFIDENCE_WARNING: &str = "generator marked this suggestion as low-confidence";

/// What was asked of the generator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    /// Source file under test
    pub file_path: String,
    /// Kind of test
    #[serde(rename = "testType")]
    pub kind: TestKind,
    /// Target priority
    pub priority: Priority,
    /// Strategy in effect
    pub strategy: Strategy,
}

impl GenerationRequest {
    /// Request for a plan target
    #[must_use]
    pub fn for_target(target: &CoverageTarget, strategy: Strategy) -> Self {
        Self {
            file_path: target.path.clone(),
            kind: target.kind,
            priority: target.priority,
            strategy,
        }
    }

    /// Request for repairing a failing file
    #[must_use]
    pub fn repair(file_path: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            kind: TestKind::Unit,
            priority: Priority::Critical,
            strategy: Strategy::RepairLoop,
        }
    }
}

/// One generated test case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestBlock {
    /// Test title
    pub title: String,
    /// Test body
    pub code: String,
    /// Rationale
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Output of one generate or repair request
///
/// Always carries at least one block; warnings are a set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawGenerationResult")]
pub struct GenerationResult {
    request: GenerationRequest,
    output_path: String,
    blocks: Vec<TestBlock>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    needs_review: bool,
    #[serde(skip_serializing_if = "IndexSet::is_empty")]
    warnings: IndexSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_ms: Option<u64>,
}

impl GenerationResult {
    /// Create new result
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyGeneration`] if `blocks` is empty.
    pub fn new(
        request: GenerationRequest,
        output_path: impl Into<String>,
        blocks: Vec<TestBlock>,
    ) -> Result<Self, CoreError> {
        let output_path = output_path.into();
        if blocks.is_empty() {
            return Err(CoreError::EmptyGeneration { output_path });
        }
        Ok(Self {
            request,
            output_path,
            blocks,
            needs_review: false,
            warnings: IndexSet::new(),
            duration_ms: None,
        })
    }

    /// Mark as needing review
    #[inline]
    #[must_use]
    pub fn with_needs_review(mut self, needs_review: bool) -> Self {
        self.needs_review = needs_review;
        self
    }

    /// Add a warning (ignored if already present)
    #[inline]
    #[must_use]
    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.insert(warning.into());
        self
    }

    /// With generation duration
    #[inline]
    #[must_use]
    pub fn with_duration_ms(mut self, ms: u64) -> Self {
        self.duration_ms = Some(ms);
        self
    }

    /// Originating request
    #[inline]
    #[must_use]
    pub fn request(&self) -> &GenerationRequest {
        &self.request
    }

    /// Where the test should be written
    #[inline]
    #[must_use]
    pub fn output_path(&self) -> &str {
        &self.output_path
    }

    /// Generated blocks (never empty)
    #[inline]
    #[must_use]
    pub fn blocks(&self) -> &[TestBlock] {
        &self.blocks
    }

    /// Whether a human must look at this before it lands
    #[inline]
    #[must_use]
    pub fn needs_review(&self) -> bool {
        self.needs_review
    }

    /// Warnings in first-seen order
    #[inline]
    #[must_use]
    pub fn warnings(&self) -> &IndexSet<String> {
        &self.warnings
    }

    /// Generation duration
    #[inline]
    #[must_use]
    pub fn duration_ms(&self) -> Option<u64> {
        self.duration_ms
    }

    /// Render blocks as a single test file body
    #[must_use]
    pub fn render(&self) -> String {
        let mut body = self
            .blocks
            .iter()
            .map(|block| block.code.trim_end())
            .collect::<Vec<_>>()
            .join("\n\n");
        body.push('\n');
        body
    }

    fn flag_for_review(mut self, warning: &str) -> Self {
        self.needs_review = true;
        self.warnings.insert(warning.to_string());
        self
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawGenerationResult {
    request: GenerationRequest,
    output_path: String,
    blocks: Vec<TestBlock>,
    #[serde(default)]
    needs_review: Option<bool>,
    #[serde(default)]
    warnings: Option<Vec<String>>,
    #[serde(default)]
    duration_ms: Option<u64>,
}

impl TryFrom<RawGenerationResult> for GenerationResult {
    type Error = CoreError;

    fn try_from(raw: RawGenerationResult) -> Result<Self, Self::Error> {
        let mut result = GenerationResult::new(raw.request, raw.output_path, raw.blocks)?
            .with_needs_review(raw.needs_review.unwrap_or(false));
        result.warnings = raw.warnings.unwrap_or_default().into_iter().collect();
        result.duration_ms = raw.duration_ms;
        Ok(result)
    }
}

/// Results partitioned by write safety
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationSplit {
    /// May be written directly
    pub safe_to_write: Vec<GenerationResult>,
    /// Must be persisted as suggestions
    pub requires_review: Vec<GenerationResult>,
}

impl GenerationSplit {
    /// All results, safe ones first
    pub fn into_all(self) -> impl Iterator<Item = GenerationResult> {
        self.safe_to_write.into_iter().chain(self.requires_review)
    }
}

/// Partition results into safe-to-write and requires-review
///
/// First matching rule wins:
/// 1. output path collides with an existing file
/// 2. result already carries warnings or a needs-review flag
/// 3. otherwise safe
#[must_use]
pub fn classify(results: Vec<GenerationResult>, existing: &HashSet<String>) -> GenerationSplit {
    results
        .into_iter()
        .fold(GenerationSplit::default(), |mut split, result| {
            if existing.contains(result.output_path()) {
                split
                    .requires_review
                    .push(result.flag_for_review(COLLISION_WARNING));
            } else if !result.warnings.is_empty() || result.needs_review {
                split
                    .requires_review
                    .push(result.flag_for_review(LOW_CONFIDENCE_WARNING));
            } else {
                split.safe_to_write.push(result);
            }
            split
        })
}
