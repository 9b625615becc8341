//! Test generation for uncovered targets

use crate::engine::TestsEngine;
use crate::error::EngineResult;
use crate::io::{GenerateInput, GenerateOutput};
use crate::services::GenerateRequest;
use aitests_core::paths::derive_test_path;
use aitests_core::{
    classify, CoveragePlan, GenerationRequest, GenerationSplit, IterationRecordBuilder,
    IterationStatus,
};

/// Summary when nothing needs generation
pub const NOTHING_TO_GENERATE: &str = "No uncovered targets detected.";

impl TestsEngine {
    /// Generate tests for targets that need them
    ///
    /// Results colliding with existing files or flagged by the generator
    /// are persisted as suggestions instead of being written. A `pending`
    /// iteration record is appended either way.
    ///
    /// # Errors
    ///
    /// Propagates workspace, context and generator failures.
    pub async fn generate(&self, input: GenerateInput) -> EngineResult<GenerateOutput> {
        let settings = self.settings().await?;
        let workspace = &self.services.workspace;

        let plan = match workspace.read_plan().await? {
            Some(plan) => plan,
            None => CoveragePlan::empty(settings.sources.clone(), self.services.clock.now()),
        };
        let targets = plan.needs_generation(input.targets.as_deref());

        if targets.is_empty() {
            tracing::info!("no uncovered targets");
            return Ok(GenerateOutput {
                generated: Vec::new(),
                artifacts: Vec::new(),
                summary: NOTHING_TO_GENERATE.to_string(),
            });
        }

        let strategy = input.strategy.unwrap_or(settings.strategy);
        let mut results = Vec::with_capacity(targets.len());
        for target in &targets {
            let output_path = derive_test_path(&target.path, &settings.tests_dir);
            let context = self.services.context.fetch_context(&target.path).await?;
            tracing::debug!(target = %target.path, output = %output_path, "generating tests");
            let result = self
                .services
                .generator
                .generate(GenerateRequest {
                    request: GenerationRequest::for_target(target, strategy),
                    context,
                    output_path,
                })
                .await?;
            results.push(result);
        }

        let should_write = strategy.writes_files() && !input.dry_run;
        let output_paths: Vec<String> = results.iter().map(|r| r.output_path().to_string()).collect();
        let existing = workspace.existing_paths(&output_paths).await?;
        let GenerationSplit {
            safe_to_write,
            requires_review,
        } = classify(results, &existing);

        let written = workspace.write_tests(&safe_to_write, !should_write).await?;

        let generated: Vec<_> = safe_to_write.into_iter().chain(requires_review).collect();
        let review_count = generated.iter().filter(|r| r.needs_review()).count();
        let suggestions = if should_write {
            let review: Vec<_> = generated.iter().filter(|r| r.needs_review()).cloned().collect();
            if review.is_empty() {
                Vec::new()
            } else {
                workspace.persist_suggestions(&review).await?
            }
        } else {
            workspace.persist_suggestions(&generated).await?
        };

        let history = workspace.read_iterations().await?;
        let now = self.services.clock.now();
        let record = IterationRecordBuilder::new(history.next_attempt_index(), now)
            .with_generated(generated.clone())
            .complete(IterationStatus::Pending, Vec::new(), now);
        let iterations_path = workspace.write_iterations(&history.append(record)).await?;

        let mut artifacts = vec![iterations_path];
        artifacts.extend(written.created.iter().cloned());
        artifacts.extend(suggestions);

        let summary = [
            format!("Targets: {}", targets.len()),
            format!("Strategy: {strategy}"),
            format!("Created: {}", written.created.len()),
            format!("Review: {review_count}"),
            format!("Dry-run entries: {}", written.dry_run.len()),
        ]
        .join(" · ");

        tracing::info!(
            targets = targets.len(),
            created = written.created.len(),
            review = review_count,
            %strategy,
            "generation complete"
        );

        Ok(GenerateOutput {
            generated,
            artifacts,
            summary,
        })
    }
}
