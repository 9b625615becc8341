//! In-memory [`Workspace`] double

use aitests_core::paths::{derive_test_path, is_sibling_test, suggestion_file_name};
use aitests_core::{CoveragePlan, GenerationResult, IterationHistory, Metadata, RunResult};
use aitests_engine::{
    CapabilityResult, RunArtifactPaths, TestDetection, Workspace, WriteOutcome,
};
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

pub const PLAN_PATH: &str = "mem://ai-tests.plan.json";
pub const ITERATIONS_PATH: &str = "mem://ai-tests.iterations.json";
pub const RUN_PATH: &str = "mem://ai-tests.run.json";
pub const LOG_PATH: &str = "mem://logs/run-latest.log";
pub const METADATA_PATH: &str = "mem://metadata.json";
pub const AUDIT_PATH: &str = "mem://ai-tests.audit.md";

#[derive(Debug, Default)]
struct State {
    sources: Vec<String>,
    files: BTreeMap<String, String>,
    plan: Option<CoveragePlan>,
    history: IterationHistory,
    run: Option<RunResult>,
    log: Option<String>,
    metadata: Option<Metadata>,
    audit: Option<String>,
    suggestions: Vec<(String, GenerationResult)>,
    iteration_writes: usize,
    run_writes: usize,
}

/// Workspace backed by maps; every write is observable
#[derive(Debug, Default)]
pub struct InMemoryWorkspace {
    state: Mutex<State>,
}

impl InMemoryWorkspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Source files returned by `glob_sources` regardless of globs
    pub fn with_sources<I, S>(self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state.lock().sources = sources.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_file(self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.state.lock().files.insert(path.into(), content.into());
        self
    }

    pub fn with_plan(self, plan: CoveragePlan) -> Self {
        self.state.lock().plan = Some(plan);
        self
    }

    pub fn with_run(self, run: RunResult) -> Self {
        self.state.lock().run = Some(run);
        self
    }

    pub fn with_history(self, history: IterationHistory) -> Self {
        self.state.lock().history = history;
        self
    }

    pub fn file(&self, path: &str) -> Option<String> {
        self.state.lock().files.get(path).cloned()
    }

    pub fn plan(&self) -> Option<CoveragePlan> {
        self.state.lock().plan.clone()
    }

    pub fn history(&self) -> IterationHistory {
        self.state.lock().history.clone()
    }

    pub fn run(&self) -> Option<RunResult> {
        self.state.lock().run.clone()
    }

    pub fn log(&self) -> Option<String> {
        self.state.lock().log.clone()
    }

    pub fn metadata(&self) -> Option<Metadata> {
        self.state.lock().metadata.clone()
    }

    pub fn audit(&self) -> Option<String> {
        self.state.lock().audit.clone()
    }

    pub fn suggestions(&self) -> Vec<(String, GenerationResult)> {
        self.state.lock().suggestions.clone()
    }

    pub fn iteration_writes(&self) -> usize {
        self.state.lock().iteration_writes
    }

    pub fn run_writes(&self) -> usize {
        self.state.lock().run_writes
    }
}

fn sibling_test_exists(files: &BTreeMap<String, String>, source: &str) -> bool {
    let (dir, name) = source.rsplit_once('/').unwrap_or(("", source));
    files.keys().any(|path| {
        let (path_dir, candidate) = path.rsplit_once('/').unwrap_or(("", path));
        path_dir == dir && is_sibling_test(name, candidate)
    })
}

#[async_trait::async_trait]
impl Workspace for InMemoryWorkspace {
    async fn ensure_tests_dir(&self, tests_dir: &str) -> CapabilityResult<bool> {
        let marker = format!("{}/", tests_dir.trim_end_matches('/'));
        let mut state = self.state.lock();
        let exists = state.files.keys().any(|p| p.starts_with(&marker));
        if !exists {
            state.files.insert(format!("{marker}.keep"), String::new());
        }
        Ok(!exists)
    }

    async fn ensure_tests_readme(&self, tests_dir: &str, content: &str) -> CapabilityResult<bool> {
        let path = format!("{}/README.md", tests_dir.trim_end_matches('/'));
        let mut state = self.state.lock();
        if state.files.contains_key(&path) {
            return Ok(false);
        }
        state.files.insert(path, content.to_string());
        Ok(true)
    }

    async fn glob_sources(&self, _globs: &[String]) -> CapabilityResult<Vec<String>> {
        let sources: BTreeSet<String> = self.state.lock().sources.iter().cloned().collect();
        Ok(sources.into_iter().collect())
    }

    async fn detect_tests(
        &self,
        sources: &[String],
        tests_dir: &str,
    ) -> CapabilityResult<HashMap<String, TestDetection>> {
        let state = self.state.lock();
        Ok(sources
            .iter()
            .map(|source| {
                let detection = TestDetection {
                    has_sibling_test: sibling_test_exists(&state.files, source),
                    has_dedicated_test: state
                        .files
                        .contains_key(&derive_test_path(source, tests_dir)),
                };
                (source.clone(), detection)
            })
            .collect())
    }

    async fn existing_paths(&self, paths: &[String]) -> CapabilityResult<HashSet<String>> {
        let state = self.state.lock();
        Ok(paths
            .iter()
            .filter(|p| state.files.contains_key(*p))
            .cloned()
            .collect())
    }

    async fn write_tests(
        &self,
        results: &[GenerationResult],
        dry_run: bool,
    ) -> CapabilityResult<WriteOutcome> {
        let mut state = self.state.lock();
        let mut outcome = WriteOutcome::default();
        for result in results {
            let path = result.output_path().to_string();
            if dry_run {
                outcome.dry_run.push(path);
            } else if state.files.contains_key(&path) {
                outcome.skipped.push(path);
            } else {
                state.files.insert(path.clone(), result.render());
                outcome.created.push(path);
            }
        }
        Ok(outcome)
    }

    async fn persist_suggestions(
        &self,
        results: &[GenerationResult],
    ) -> CapabilityResult<Vec<String>> {
        let mut state = self.state.lock();
        let mut paths = Vec::with_capacity(results.len());
        for result in results {
            let index = state.suggestions.len();
            let path = format!("mem://suggestions/{}", suggestion_file_name(index, result.output_path()));
            state.suggestions.push((path.clone(), result.clone()));
            paths.push(path);
        }
        Ok(paths)
    }

    async fn write_plan(&self, plan: &CoveragePlan) -> CapabilityResult<String> {
        self.state.lock().plan = Some(plan.clone());
        Ok(PLAN_PATH.to_string())
    }

    async fn read_plan(&self) -> CapabilityResult<Option<CoveragePlan>> {
        Ok(self.state.lock().plan.clone())
    }

    async fn write_iterations(&self, history: &IterationHistory) -> CapabilityResult<String> {
        let mut state = self.state.lock();
        state.history = history.clone();
        state.iteration_writes += 1;
        Ok(ITERATIONS_PATH.to_string())
    }

    async fn read_iterations(&self) -> CapabilityResult<IterationHistory> {
        Ok(self.state.lock().history.clone())
    }

    async fn write_run(&self, run: &RunResult, log: &str) -> CapabilityResult<RunArtifactPaths> {
        let mut state = self.state.lock();
        state.run = Some(run.clone());
        state.log = Some(log.to_string());
        state.run_writes += 1;
        Ok(RunArtifactPaths {
            run_path: RUN_PATH.to_string(),
            log_path: LOG_PATH.to_string(),
        })
    }

    async fn read_run(&self) -> CapabilityResult<Option<RunResult>> {
        Ok(self.state.lock().run.clone())
    }

    async fn write_metadata(&self, metadata: &Metadata) -> CapabilityResult<String> {
        self.state.lock().metadata = Some(metadata.clone());
        Ok(METADATA_PATH.to_string())
    }

    async fn write_audit(&self, markdown: &str) -> CapabilityResult<String> {
        self.state.lock().audit = Some(markdown.to_string());
        Ok(AUDIT_PATH.to_string())
    }
}
