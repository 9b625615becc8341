//! AI Tests Engine - plan, generate, run and bounded repair
//!
//! The engine owns control flow only. Everything it touches goes through
//! the capability traits in [`services`]:
//! - [`ConfigSource`] for partial configuration
//! - [`Workspace`] for discovery and artifact persistence
//! - [`ContextLookup`] and [`TestGenerator`] for test synthesis
//! - [`TestRunner`](aitests_runner::TestRunner) for execution
//!
//! # Example
//!
//! ```rust,ignore
//! use aitests_engine::{RepairInput, TestsEngine};
//!
//! let engine = TestsEngine::new(services);
//! let out = engine.repair(RepairInput::default()).await?;
//! println!("attempt {} -> {}", out.iteration.attempt_index(), out.iteration.status());
//! ```

#![warn(unreachable_pub)]

mod engine;
pub mod error;
mod io;
pub mod services;
pub mod workflows;

pub use engine::{TestsEngine, DRY_RUN_PATH, STDOUT_PATH};
pub use error::{CapabilityError, EngineError, EngineResult};
pub use io::{
    AuditInput, AuditOutput, GenerateInput, GenerateOutput, InitInput, InitOutput, PlanInput,
    PlanOutput, RepairInput, RepairOutput, RunInput, RunOutput,
};
pub use services::{
    CapabilityResult, ConfigSource, ContextLookup, GenerateRequest, RepairRequest,
    RunArtifactPaths, Services, TestContext, TestDetection, TestGenerator, Workspace,
    WriteOutcome,
};
pub use workflows::{NOTHING_TO_GENERATE, REPAIR_DESCRIPTION, UNKNOWN_FAILURE};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
