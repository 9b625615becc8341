//! AI Tests Adapters - concrete capabilities for the engine
//!
//! - [`FsWorkspace`]: discovery with `walkdir` + `globset`, JSON artifacts
//!   under `.kb/artifacts/ai-tests/`, never-overwrite test writes
//! - [`JsonConfigSource`]: the `aiTests` section of `kb.config.json`
//! - [`HeuristicContextLookup`] and [`TemplateGenerator`]: deterministic
//!   stand-ins for semantic lookup and model-backed generation
//!
//! # Example
//!
//! ```rust,ignore
//! use aitests_adapters::services_for;
//! use aitests_engine::{PlanInput, TestsEngine};
//!
//! let engine = TestsEngine::new(services_for("."));
//! let out = engine.plan(PlanInput::default()).await?;
//! ```

#![warn(unreachable_pub)]

pub mod config_file;
pub mod context;
pub mod fs_workspace;
pub mod generator;

pub use config_file::{JsonConfigSource, CONFIG_FILE, CONFIG_KEY};
pub use context::HeuristicContextLookup;
pub use fs_workspace::{FsWorkspace, ARTIFACTS_DIR};
pub use generator::{TemplateGenerator, REPAIR_WARNING};

use aitests_core::SystemClock;
use aitests_engine::Services;
use aitests_runner::CommandRunner;
use std::path::Path;
use std::sync::Arc;

/// Default service bundle for a workspace rooted at `root`
pub fn services_for(root: impl AsRef<Path>) -> Services {
    let root = root.as_ref();
    let clock = Arc::new(SystemClock);
    Services {
        config: Arc::new(JsonConfigSource::new(root)),
        workspace: Arc::new(FsWorkspace::new(root)),
        context: Arc::new(HeuristicContextLookup),
        generator: Arc::new(TemplateGenerator),
        runner: Arc::new(CommandRunner::new(clock.clone())),
        clock,
    }
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
