//! `kb.config.json` configuration source

use aitests_core::RawConfig;
use aitests_engine::{CapabilityError, CapabilityResult, ConfigSource};
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Configuration file name at the workspace root
pub const CONFIG_FILE: &str = "kb.config.json";

/// Key holding this tool's section
pub const CONFIG_KEY: &str = "aiTests";

/// Reads the `aiTests` section of `kb.config.json`
///
/// A missing file or key yields `None`. Malformed fields inside the
/// section are dropped by [`RawConfig::from_value`]; a file that is not
/// JSON at all is an error.
#[derive(Debug, Clone)]
pub struct JsonConfigSource {
    path: PathBuf,
}

impl JsonConfigSource {
    /// Source reading `<root>/kb.config.json`
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            path: root.as_ref().join(CONFIG_FILE),
        }
    }

    /// Source reading an explicit file
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl ConfigSource for JsonConfigSource {
    async fn read(&self) -> CapabilityResult<Option<RawConfig>> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no configuration file");
                return Ok(None);
            }
            Err(e) => return Err(CapabilityError::io(&self.path, e)),
        };

        let document: Value = serde_json::from_str(&text)?;
        Ok(document.get(CONFIG_KEY).map(RawConfig::from_value))
    }
}
