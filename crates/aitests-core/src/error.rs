//! Error types for AI Tests core
//!
//! The domain model is mostly total: normalization and plan operations
//! accept every input. Errors only arise when a persisted artifact
//! violates a structural invariant on the way in.

/// Core domain error
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Generation result without any test block
    #[error("generation result for {output_path} has no test blocks")]
    EmptyGeneration {
        /// Output path of the offending result
        output_path: String,
    },

    /// Unrecognised enum spelling
    #[error("unknown {kind}: '{value}'")]
    UnknownVariant {
        /// Kind of value being parsed
        kind: &'static str,
        /// Rejected input
        value: String,
    },

    /// Artifact payload failed to parse
    #[error("invalid {artifact} artifact: {source}")]
    InvalidArtifact {
        /// Artifact name (plan, run, iterations, ...)
        artifact: &'static str,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },
}

impl CoreError {
    /// Create invalid artifact error
    #[inline]
    pub fn invalid_artifact(artifact: &'static str, source: serde_json::Error) -> Self {
        Self::InvalidArtifact { artifact, source }
    }

    /// Create unknown variant error
    #[inline]
    pub fn unknown_variant(kind: &'static str, value: impl Into<String>) -> Self {
        Self::UnknownVariant {
            kind,
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_generation_display() {
        let err = CoreError::EmptyGeneration {
            output_path: "tests/a.test.ts".to_string(),
        };
        assert!(err.to_string().contains("tests/a.test.ts"));
        assert!(err.to_string().contains("no test blocks"));
    }

    #[test]
    fn invalid_artifact_display() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = CoreError::invalid_artifact("plan", source);
        assert!(err.to_string().starts_with("invalid plan artifact"));
    }
}
