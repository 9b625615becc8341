use crate::engine::{TestsEngine, DRY_RUN_PATH};
use crate::error::EngineResult;
use crate::io::{RunInput, RunOutput};
use aitests_runner::RunOptions;

impl TestsEngine {
    /// Execute the configured tests and persist the result
    ///
    /// # Errors
    ///
    /// Propagates workspace and configuration failures. Test failures are
    /// reported in the returned result.
    pub async fn run(&self, input: RunInput) -> EngineResult<RunOutput> {
        let settings = self.settings().await?;
        let options = RunOptions {
            dry_run: input.dry_run,
            timeout: input.timeout,
        };
        let output = self.services.runner.run(&settings, options).await;

        if input.dry_run {
            return Ok(RunOutput {
                run_path: DRY_RUN_PATH.to_string(),
                log_path: DRY_RUN_PATH.to_string(),
                result: output.result,
            });
        }

        let paths = self
            .services
            .workspace
            .write_run(&output.result, &output.log)
            .await?;
        tracing::info!(status = %output.result.status, run = %paths.run_path, "run persisted");

        Ok(RunOutput {
            run_path: paths.run_path,
            log_path: paths.log_path,
            result: output.result,
        })
    }
}
