//! Error types for the AI Tests engine
//!
//! Two layers:
//! - [`CapabilityError`]: failures raised by external collaborators
//!   (workspace, config source, context lookup, generator)
//! - [`EngineError`]: what operations return; precondition failures plus
//!   propagated capability failures
//!
//! Test failures are data, not errors. They live in run results and
//! iteration records.

use aitests_core::CoreError;
use std::path::PathBuf;

/// Failure of an external capability
#[derive(Debug, thiserror::Error)]
pub enum CapabilityError {
    /// File system failure
    #[error("i/o error at {path}: {source}")]
    Io {
        /// Path being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Serialization failure
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Persisted artifact is malformed
    #[error(transparent)]
    InvalidArtifact(#[from] CoreError),

    /// Source glob could not be compiled
    #[error("invalid source pattern '{pattern}': {message}")]
    InvalidPattern {
        /// Offending glob
        pattern: String,
        /// Parser message
        message: String,
    },

    /// Context lookup failed
    #[error("context lookup failed for {path}: {message}")]
    Context {
        /// Path being looked up
        path: String,
        /// Failure description
        message: String,
    },

    /// Generator failed
    #[error("generation failed for {file_path}: {message}")]
    Generator {
        /// File being generated or repaired
        file_path: String,
        /// Failure description
        message: String,
    },

    /// Capability not reachable
    #[error("capability unavailable: {0}")]
    Unavailable(String),
}

impl CapabilityError {
    /// Create I/O error
    #[inline]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create generator error
    #[inline]
    pub fn generator(file_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Generator {
            file_path: file_path.into(),
            message: message.into(),
        }
    }

    /// Check if retrying the whole operation might succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::Unavailable(_) | Self::Context { .. })
    }
}

/// Engine operation error
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Repair requested before any run was persisted
    #[error("no prior run artifact found; run tests before repairing")]
    NoPriorRun,

    /// Repair requested with the attempt budget already spent
    #[error("repair budget exhausted: attempt {attempt} exceeds limit {limit}")]
    BudgetExhausted {
        /// Attempt index that would have run
        attempt: usize,
        /// Effective limit
        limit: usize,
    },

    /// External capability failed
    #[error("capability failed: {0}")]
    Capability(#[from] CapabilityError),
}

impl EngineError {
    /// Check if error is a precondition failure
    #[inline]
    #[must_use]
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::NoPriorRun | Self::BudgetExhausted { .. })
    }

    /// Check if retrying the operation might succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Capability(e) => e.is_retryable(),
            Self::NoPriorRun | Self::BudgetExhausted { .. } => false,
        }
    }
}

/// Result alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precondition_classification() {
        assert!(EngineError::NoPriorRun.is_precondition());
        assert!(EngineError::BudgetExhausted { attempt: 2, limit: 2 }.is_precondition());
        let cap = EngineError::from(CapabilityError::Unavailable("mind".into()));
        assert!(!cap.is_precondition());
        assert!(cap.is_retryable());
    }

    #[test]
    fn budget_message_names_numbers() {
        let msg = EngineError::BudgetExhausted { attempt: 3, limit: 3 }.to_string();
        assert!(msg.contains("attempt 3"));
        assert!(msg.contains("limit 3"));
    }

    #[test]
    fn io_error_wraps_path() {
        let err = CapabilityError::io(
            "/tmp/x.json",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.to_string().starts_with("i/o error at /tmp/x.json"));
        assert!(err.is_retryable());
        assert!(!CapabilityError::generator("a.ts", "bad").is_retryable());
    }
}
