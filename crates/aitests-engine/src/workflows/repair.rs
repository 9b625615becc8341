//! Bounded repair loop
//!
//! One invocation produces at most one iteration record:
//!
//! ```text
//! budget check ──> no failures ──────────────────────────────> FIXED
//!      │
//!      └──> repair each failing file -> persist suggestions
//!             -> re-run (or reuse prior run on dry-run)
//!             -> success: FIXED | attempts left: NEEDS_REVIEW | else: EXHAUSTED
//! ```
//!
//! Exceeding the budget before starting is an error, not a status.

use crate::engine::TestsEngine;
use crate::error::{EngineError, EngineResult};
use crate::io::{RepairInput, RepairOutput};
use crate::services::RepairRequest;
use aitests_core::paths::derive_test_path;
use aitests_core::{FixDescriptor, IterationRecordBuilder, IterationStatus, RunResult};
use aitests_runner::RunOptions;

/// Error text used when a failing file captured no message
pub const UNKNOWN_FAILURE: &str = "Unknown failure";

/// Description attached to every repair fix descriptor
pub const REPAIR_DESCRIPTION: &str = "automated repair suggestion";

const NOTE_NOTHING_TO_FIX: &str = "No failing tests detected.";
const NOTE_FIXED: &str = "Runner reported success.";
const NOTE_REVIEW: &str = "Manual review required.";

impl TestsEngine {
    /// Run one repair attempt against the last persisted run
    ///
    /// # Errors
    ///
    /// - [`EngineError::NoPriorRun`] if no run was persisted
    /// - [`EngineError::BudgetExhausted`] if the attempt budget is spent
    /// - [`EngineError::Capability`] if any collaborator fails
    pub async fn repair(&self, input: RepairInput) -> EngineResult<RepairOutput> {
        let settings = self.settings().await?;
        let workspace = &self.services.workspace;

        let history = workspace.read_iterations().await?;
        let prior = workspace.read_run().await?.ok_or(EngineError::NoPriorRun)?;

        let failing: Vec<(String, String)> = prior
            .failing_files()
            .map(|file| {
                (
                    file.file_path.clone(),
                    file.first_error().unwrap_or(UNKNOWN_FAILURE).to_string(),
                )
            })
            .collect();

        let configured = settings.max_attempts as usize;
        let limit = input
            .max_attempts
            .map_or(configured, |requested| configured.min(requested as usize));
        let attempt = history.next_attempt_index();

        if history.exhausted(limit) {
            tracing::warn!(attempt, limit, "repair budget exhausted");
            return Err(EngineError::BudgetExhausted { attempt, limit });
        }

        let builder = IterationRecordBuilder::new(attempt, self.services.clock.now())
            .with_failed_files(failing.iter().map(|(path, _)| path.clone()).collect());

        if failing.is_empty() {
            let iteration = builder.complete(
                IterationStatus::Fixed,
                vec![NOTE_NOTHING_TO_FIX.to_string()],
                self.services.clock.now(),
            );
            let path = workspace
                .write_iterations(&history.append(iteration.clone()))
                .await?;
            tracing::info!(attempt, iterations = %path, "repair skipped, nothing to fix");
            return Ok(RepairOutput {
                iteration,
                max_attempts_reached: false,
                limit,
            });
        }

        tracing::info!(attempt, limit, failing = failing.len(), "starting repair attempt");

        let mut fixes = Vec::with_capacity(failing.len());
        for (file_path, error) in failing {
            let context = self.services.context.fetch_context(&file_path).await?;
            let output_path = derive_test_path(&file_path, &settings.tests_dir);
            tracing::debug!(file = %file_path, output = %output_path, "requesting repair");
            let fix = self
                .services
                .generator
                .repair(RepairRequest {
                    file_path,
                    error,
                    context,
                    output_path,
                })
                .await?;
            fixes.push(fix);
        }

        let suggestion_paths = workspace.persist_suggestions(&fixes).await?;
        let descriptors: Vec<FixDescriptor> = fixes
            .iter()
            .zip(suggestion_paths)
            .map(|(fix, suggestion_path)| FixDescriptor {
                file_path: fix.output_path().to_string(),
                suggestion_path,
                description: Some(REPAIR_DESCRIPTION.to_string()),
            })
            .collect();

        let run = self.rerun_or_reuse(&settings, prior, &input).await?;

        let budget_spent = attempt + 1 >= limit;
        let status = if run.is_success() {
            IterationStatus::Fixed
        } else if budget_spent {
            IterationStatus::Exhausted
        } else {
            IterationStatus::NeedsReview
        };
        let note = if status == IterationStatus::Fixed {
            NOTE_FIXED
        } else {
            NOTE_REVIEW
        };

        let iteration = builder
            .with_generated(fixes)
            .with_fixes(descriptors)
            .with_run(run)
            .complete(status, vec![note.to_string()], self.services.clock.now());

        let path = workspace
            .write_iterations(&history.append(iteration.clone()))
            .await?;
        tracing::info!(attempt, %status, iterations = %path, "repair attempt recorded");

        Ok(RepairOutput {
            iteration,
            max_attempts_reached: budget_spent,
            limit,
        })
    }

    async fn rerun_or_reuse(
        &self,
        settings: &aitests_core::Settings,
        prior: RunResult,
        input: &RepairInput,
    ) -> EngineResult<RunResult> {
        if input.dry_run {
            tracing::info!("dry run, reusing prior run result");
            return Ok(prior);
        }
        let options = RunOptions {
            dry_run: false,
            timeout: input.timeout,
        };
        let output = self.services.runner.run(settings, options).await;
        self.services
            .workspace
            .write_run(&output.result, &output.log)
            .await?;
        Ok(output.result)
    }
}
