use crate::engine::TestsEngine;
use crate::error::EngineResult;
use crate::io::{InitInput, InitOutput};
use aitests_core::{Metadata, RawConfig, Settings, TESTS_README};

impl TestsEngine {
    /// Prepare the tests directory and record a metadata snapshot
    ///
    /// # Errors
    ///
    /// Propagates workspace and configuration failures.
    pub async fn init(&self, input: InitInput) -> EngineResult<InitOutput> {
        let current = self.services.config.read().await?;
        let tests_dir = input
            .tests_dir
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| Settings::normalize(current.clone()).tests_dir);

        let mut created = Vec::new();
        let mut skipped = Vec::new();
        let readme = format!("{}/README.md", tests_dir.trim_end_matches('/'));

        if !input.dry_run {
            let workspace = &self.services.workspace;
            if workspace.ensure_tests_dir(&tests_dir).await? {
                created.push(tests_dir.clone());
            } else {
                skipped.push(tests_dir.clone());
            }
            if workspace.ensure_tests_readme(&tests_dir, TESTS_README).await? {
                created.push(readme);
            } else {
                skipped.push(readme);
            }
        }

        let next = Settings::merge(current, RawConfig::default().with_tests_dir(tests_dir.clone()));

        let metadata_path = if input.dry_run {
            None
        } else {
            let metadata = Metadata::snapshot(&self.version, next, self.services.clock.now());
            Some(self.services.workspace.write_metadata(&metadata).await?)
        };

        let summary = [
            format!("Tests dir: {tests_dir}"),
            format!("Created: {}", created.len()),
            format!("Skipped: {}", skipped.len()),
        ]
        .join(" · ");
        tracing::info!(tests_dir = %tests_dir, created = created.len(), "init complete");

        Ok(InitOutput {
            tests_dir,
            created,
            skipped,
            metadata_path,
            summary,
        })
    }
}
