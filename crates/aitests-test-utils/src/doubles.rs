//! Scripted collaborators

use crate::fixtures::run_result;
use aitests_core::{
    Clock, GenerationRequest, GenerationResult, RawConfig, RunStatus, Settings, TestBlock,
};
use aitests_engine::{
    CapabilityError, CapabilityResult, ConfigSource, ContextLookup, GenerateRequest,
    RepairRequest, TestContext, TestGenerator,
};
use aitests_runner::{RunOptions, RunnerOutput, TestRunner};
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::collections::{HashSet, VecDeque};

/// Config source returning a fixed value
#[derive(Debug, Clone, Default)]
pub struct StaticConfigSource(pub Option<RawConfig>);

impl StaticConfigSource {
    pub fn new(config: RawConfig) -> Self {
        Self(Some(config))
    }
}

#[async_trait::async_trait]
impl ConfigSource for StaticConfigSource {
    async fn read(&self) -> CapabilityResult<Option<RawConfig>> {
        Ok(self.0.clone())
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(DateTime::from_timestamp(1_700_000_000, 0).unwrap())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// Runner replaying a queue of outcomes; the last one repeats
#[derive(Debug)]
pub struct ScriptedRunner {
    script: Mutex<VecDeque<RunnerOutput>>,
    last: Mutex<Option<RunnerOutput>>,
    calls: Mutex<Vec<(Settings, RunOptions)>>,
}

impl ScriptedRunner {
    pub fn new(outputs: impl IntoIterator<Item = RunnerOutput>) -> Self {
        Self {
            script: Mutex::new(outputs.into_iter().collect()),
            last: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Runner always reporting `status` on a single file record
    pub fn always(status: RunStatus) -> Self {
        Self::new([RunnerOutput {
            result: run_result(status, &[]),
            log: format!("status={status}"),
        }])
    }

    /// Runner always failing `files`
    pub fn failing(files: &[(&str, &str)]) -> Self {
        Self::new([RunnerOutput {
            result: run_result(RunStatus::Failed, files),
            log: "status=failed".to_string(),
        }])
    }

    pub fn calls(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn last_options(&self) -> Option<RunOptions> {
        self.calls.lock().last().map(|(_, o)| *o)
    }
}

#[async_trait::async_trait]
impl TestRunner for ScriptedRunner {
    async fn run(&self, settings: &Settings, options: RunOptions) -> RunnerOutput {
        self.calls.lock().push((settings.clone(), options));
        let next = self.script.lock().pop_front();
        let mut last = self.last.lock();
        if let Some(output) = next {
            *last = Some(output);
        }
        (*last)
            .clone()
            .unwrap_or_else(|| RunnerOutput {
                result: run_result(RunStatus::Success, &[]),
                log: String::new(),
            })
    }
}

/// Context lookup echoing the path
#[derive(Debug, Default)]
pub struct StubContext {
    looked_up: Mutex<Vec<String>>,
    fail_for: HashSet<String>,
}

impl StubContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail lookups for `path`
    pub fn failing_for(mut self, path: impl Into<String>) -> Self {
        self.fail_for.insert(path.into());
        self
    }

    pub fn looked_up(&self) -> Vec<String> {
        self.looked_up.lock().clone()
    }
}

#[async_trait::async_trait]
impl ContextLookup for StubContext {
    async fn fetch_context(&self, path: &str) -> CapabilityResult<TestContext> {
        self.looked_up.lock().push(path.to_string());
        if self.fail_for.contains(path) {
            return Err(CapabilityError::Context {
                path: path.to_string(),
                message: "lookup refused".to_string(),
            });
        }
        Ok(TestContext {
            summary: format!("context for {path}"),
            related_ids: Vec::new(),
            examples: Vec::new(),
        })
    }
}

/// Generator recording every request
#[derive(Debug, Default)]
pub struct RecordingGenerator {
    generated: Mutex<Vec<GenerateRequest>>,
    repaired: Mutex<Vec<RepairRequest>>,
    flag_for_review: HashSet<String>,
}

impl RecordingGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark results for `file_path` as needing review
    pub fn flagging(mut self, file_path: impl Into<String>) -> Self {
        self.flag_for_review.insert(file_path.into());
        self
    }

    pub fn generate_requests(&self) -> Vec<GenerateRequest> {
        self.generated.lock().clone()
    }

    pub fn repair_requests(&self) -> Vec<RepairRequest> {
        self.repaired.lock().clone()
    }
}

fn block(title: &str, context: &TestContext) -> TestBlock {
    TestBlock {
        title: title.to_string(),
        code: format!("it('{title}', () => {{}});"),
        reason: Some(context.summary.clone()),
    }
}

#[async_trait::async_trait]
impl TestGenerator for RecordingGenerator {
    async fn generate(&self, request: GenerateRequest) -> CapabilityResult<GenerationResult> {
        self.generated.lock().push(request.clone());
        let flagged = self.flag_for_review.contains(&request.request.file_path);
        Ok(GenerationResult::new(
            request.request,
            request.output_path,
            vec![block("covers core logic", &request.context)],
        )?
        .with_needs_review(flagged))
    }

    async fn repair(&self, request: RepairRequest) -> CapabilityResult<GenerationResult> {
        self.repaired.lock().push(request.clone());
        Ok(GenerationResult::new(
            GenerationRequest::repair(&request.file_path),
            request.output_path,
            vec![block("addresses failing assertion", &request.context)],
        )?
        .with_needs_review(true))
    }
}
