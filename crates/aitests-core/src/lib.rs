//! AI Tests Core - domain model for the coverage lifecycle
//!
//! Pure, I/O-free building blocks:
//! - Normalizes loosely-typed configuration into canonical [`Settings`]
//! - Models the coverage plan with ordered upsert and targeting rules
//! - Classifies generated tests into safe-to-write and requires-review
//! - Records repair attempts in an append-only [`IterationHistory`]
//!
//! # Example
//!
//! ```rust,ignore
//! use aitests_core::{CoveragePlan, Settings, SystemClock, Clock};
//!
//! let settings = Settings::normalize(None);
//! let plan = CoveragePlan::empty(settings.sources.clone(), SystemClock.now());
//! assert_eq!(plan.uncovered_count(), 0);
//! ```

#![warn(unreachable_pub)]

pub mod clock;
pub mod config;
pub mod error;
pub mod generation;
pub mod iteration;
pub mod metadata;
pub mod paths;
pub mod plan;
pub mod run;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{
    RawConfig, RawRunnerConfig, RawThresholds, RepairLevel, RunnerConfig, RunnerMode,
    RunnerSetting, Settings, Strategy, Thresholds, DEFAULT_MAX_ATTEMPTS, DEFAULT_SOURCE_GLOB,
    DEFAULT_TESTS_DIR, DEFAULT_TEST_RUN_COMMAND,
};
pub use error::CoreError;
pub use generation::{
    classify, GenerationRequest, GenerationResult, GenerationSplit, TestBlock,
    COLLISION_WARNING, LOW_CONFIDENCE_WARNING,
};
pub use iteration::{
    FixDescriptor, IterationHistory, IterationRecord, IterationRecordBuilder, IterationStatus,
};
pub use metadata::{AuditReport, Metadata, TESTS_README};
pub use plan::{CoveragePlan, CoverageStatus, CoverageTarget, PlanSummary, Priority, TestKind};
pub use run::{FileRunResult, RunError, RunResult, RunStatus, RunSummary, RunnerMeta};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with AI Tests Core
    pub use crate::{
        Clock, CoveragePlan, CoverageTarget, GenerationResult, IterationHistory,
        IterationRecordBuilder, IterationStatus, RunResult, RunStatus, Settings, Strategy,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
