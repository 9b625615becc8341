//! External capabilities consumed by the engine
//!
//! Each trait is narrow: exactly the operations the workflows call.
//! Implementations live in `aitests-adapters` (file system, templates)
//! and `aitests-test-utils` (in-memory doubles).

use crate::error::CapabilityError;
use aitests_core::{
    Clock, CoveragePlan, GenerationRequest, GenerationResult, IterationHistory, Metadata,
    RawConfig, RunResult,
};
use aitests_runner::TestRunner;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Capability result alias
pub type CapabilityResult<T> = Result<T, CapabilityError>;

/// Reads the persisted partial configuration
#[async_trait::async_trait]
pub trait ConfigSource: Send + Sync {
    /// Partial configuration, or `None` when nothing is configured
    async fn read(&self) -> CapabilityResult<Option<RawConfig>>;
}

/// Existing-test detection for one source file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestDetection {
    /// `*.test.*` or `*.spec.*` next to the source
    pub has_sibling_test: bool,
    /// File at the derived test path
    pub has_dedicated_test: bool,
}

impl TestDetection {
    /// Whether any test was found
    #[inline]
    #[must_use]
    pub fn covered(self) -> bool {
        self.has_sibling_test || self.has_dedicated_test
    }
}

/// Outcome of writing generated tests
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteOutcome {
    /// Files written
    pub created: Vec<String>,
    /// Files left alone because they exist
    pub skipped: Vec<String>,
    /// Files that would have been written
    pub dry_run: Vec<String>,
}

/// Locations of a persisted run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunArtifactPaths {
    /// Run result artifact
    pub run_path: String,
    /// Execution log
    pub log_path: String,
}

/// Workspace storage and discovery
#[async_trait::async_trait]
pub trait Workspace: Send + Sync {
    /// Create the tests directory; `true` if it was created
    async fn ensure_tests_dir(&self, tests_dir: &str) -> CapabilityResult<bool>;

    /// Create the tests README; `true` if it was created
    async fn ensure_tests_readme(&self, tests_dir: &str, content: &str) -> CapabilityResult<bool>;

    /// Source files matching `globs`, sorted and deduplicated
    async fn glob_sources(&self, globs: &[String]) -> CapabilityResult<Vec<String>>;

    /// Existing-test detection keyed by source path
    async fn detect_tests(
        &self,
        sources: &[String],
        tests_dir: &str,
    ) -> CapabilityResult<HashMap<String, TestDetection>>;

    /// Subset of `paths` already present
    async fn existing_paths(&self, paths: &[String]) -> CapabilityResult<HashSet<String>>;

    /// Write generated tests, never overwriting
    async fn write_tests(
        &self,
        results: &[GenerationResult],
        dry_run: bool,
    ) -> CapabilityResult<WriteOutcome>;

    /// Persist suggestion artifacts, returning their paths in input order
    async fn persist_suggestions(&self, results: &[GenerationResult])
        -> CapabilityResult<Vec<String>>;

    /// Persist the coverage plan
    async fn write_plan(&self, plan: &CoveragePlan) -> CapabilityResult<String>;

    /// Read the coverage plan
    async fn read_plan(&self) -> CapabilityResult<Option<CoveragePlan>>;

    /// Persist the full iteration history
    async fn write_iterations(&self, history: &IterationHistory) -> CapabilityResult<String>;

    /// Read the iteration history (empty when absent)
    async fn read_iterations(&self) -> CapabilityResult<IterationHistory>;

    /// Persist the last run and its log
    async fn write_run(&self, run: &RunResult, log: &str) -> CapabilityResult<RunArtifactPaths>;

    /// Read the last run
    async fn read_run(&self) -> CapabilityResult<Option<RunResult>>;

    /// Persist metadata
    async fn write_metadata(&self, metadata: &Metadata) -> CapabilityResult<String>;

    /// Persist the audit report
    async fn write_audit(&self, markdown: &str) -> CapabilityResult<String>;
}

/// Opaque context handed to the generator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestContext {
    /// Short textual summary
    pub summary: String,
    /// Related identifiers (ADRs, modules, ...)
    #[serde(default)]
    pub related_ids: Vec<String>,
    /// Example snippets
    #[serde(default)]
    pub examples: Vec<String>,
}

/// Looks up context for a file
#[async_trait::async_trait]
pub trait ContextLookup: Send + Sync {
    /// Context for `path`
    async fn fetch_context(&self, path: &str) -> CapabilityResult<TestContext>;
}

/// Generate request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateRequest {
    /// What to generate
    pub request: GenerationRequest,
    /// Context for the source
    pub context: TestContext,
    /// Derived output path
    pub output_path: String,
}

/// Repair request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairRequest {
    /// Failing file
    pub file_path: String,
    /// First captured error message
    pub error: String,
    /// Context for the file
    pub context: TestContext,
    /// Derived output path
    pub output_path: String,
}

/// Produces test code
#[async_trait::async_trait]
pub trait TestGenerator: Send + Sync {
    /// Generate tests for an uncovered target
    async fn generate(&self, request: GenerateRequest) -> CapabilityResult<GenerationResult>;

    /// Propose a fix for a failing file
    async fn repair(&self, request: RepairRequest) -> CapabilityResult<GenerationResult>;
}

/// Bundle of capabilities an engine runs against
#[derive(Clone)]
pub struct Services {
    /// Configuration source
    pub config: Arc<dyn ConfigSource>,
    /// Workspace
    pub workspace: Arc<dyn Workspace>,
    /// Context lookup
    pub context: Arc<dyn ContextLookup>,
    /// Test generator
    pub generator: Arc<dyn TestGenerator>,
    /// Test runner
    pub runner: Arc<dyn TestRunner>,
    /// Clock
    pub clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services").finish_non_exhaustive()
    }
}
