//! Testing utilities for AI Tests workspace
//!
//! In-memory workspace, scripted collaborators and fixtures shared by
//! integration tests.

#![allow(missing_docs)]

pub mod doubles;
pub mod fixtures;
pub mod workspace;

pub use doubles::{ManualClock, RecordingGenerator, ScriptedRunner, StaticConfigSource, StubContext};
pub use fixtures::{covered, epoch, plan_with, run_result, uncovered};
pub use workspace::InMemoryWorkspace;

use aitests_core::RawConfig;
use aitests_engine::{Services, TestsEngine};
use std::sync::Arc;

/// Concrete doubles kept alongside the engine for assertions
pub struct Harness {
    pub workspace: Arc<InMemoryWorkspace>,
    pub runner: Arc<ScriptedRunner>,
    pub generator: Arc<RecordingGenerator>,
    pub context: Arc<StubContext>,
    pub clock: Arc<ManualClock>,
    pub engine: TestsEngine,
}

impl Harness {
    pub fn new(config: RawConfig, workspace: InMemoryWorkspace, runner: ScriptedRunner) -> Self {
        Self::with_generator(config, workspace, runner, RecordingGenerator::new())
    }

    pub fn with_generator(
        config: RawConfig,
        workspace: InMemoryWorkspace,
        runner: ScriptedRunner,
        generator: RecordingGenerator,
    ) -> Self {
        let workspace = Arc::new(workspace);
        let runner = Arc::new(runner);
        let generator = Arc::new(generator);
        let context = Arc::new(StubContext::new());
        let clock = Arc::new(ManualClock::default());

        let services = Services {
            config: Arc::new(StaticConfigSource::new(config)),
            workspace: workspace.clone(),
            context: context.clone(),
            generator: generator.clone(),
            runner: runner.clone(),
            clock: clock.clone(),
        };

        Self {
            workspace,
            runner,
            generator,
            context,
            clock,
            engine: TestsEngine::new(services).with_version("test"),
        }
    }
}
