use crate::engine::{TestsEngine, DRY_RUN_PATH};
use crate::error::EngineResult;
use crate::io::{AuditInput, AuditOutput};
use aitests_core::AuditReport;

impl TestsEngine {
    /// Score workspace health and render a markdown report
    ///
    /// # Errors
    ///
    /// Propagates workspace failures.
    pub async fn audit(&self, input: AuditInput) -> EngineResult<AuditOutput> {
        let workspace = &self.services.workspace;

        let plan_exists = if input.include_plan {
            workspace.read_plan().await?.is_some()
        } else {
            false
        };
        let last_run = if input.include_runs {
            workspace.read_run().await?.map(|run| run.status)
        } else {
            None
        };
        let iterations = workspace.read_iterations().await?.len();

        let report = AuditReport {
            plan_exists,
            last_run,
            iterations,
        };

        let report_path = if input.dry_run {
            DRY_RUN_PATH.to_string()
        } else {
            workspace.write_audit(&report.to_markdown()).await?
        };
        tracing::info!(score = report.score(), report = %report_path, "audit complete");

        Ok(AuditOutput {
            report_path,
            score: report.score(),
            summary: report.summary(),
        })
    }
}
