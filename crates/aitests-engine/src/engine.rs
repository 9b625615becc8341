//! The engine facade

use crate::error::EngineResult;
use crate::services::Services;
use aitests_core::Settings;

/// Path reported when a dry run skips persistence
pub const DRY_RUN_PATH: &str = "dry-run";

/// Plan path reported when a dry-run plan is only printed
pub const STDOUT_PATH: &str = "stdout";

/// Stateless orchestrator over a set of [`Services`]
///
/// Every operation rebuilds its working state from persisted artifacts,
/// so one engine can serve any number of sequential calls. At most one
/// repair may run per workspace at a time.
#[derive(Debug, Clone)]
pub struct TestsEngine {
    pub(crate) services: Services,
    pub(crate) version: String,
}

impl TestsEngine {
    /// Create new engine
    #[must_use]
    pub fn new(services: Services) -> Self {
        Self {
            services,
            version: crate::VERSION.to_string(),
        }
    }

    /// Override the version stamped into metadata
    #[inline]
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Capabilities in use
    #[inline]
    #[must_use]
    pub fn services(&self) -> &Services {
        &self.services
    }

    /// Canonical settings from the configuration source
    ///
    /// # Errors
    ///
    /// Propagates configuration source failures.
    pub async fn settings(&self) -> EngineResult<Settings> {
        let raw = self.services.config.read().await?;
        Ok(Settings::normalize(raw))
    }
}
