//! Generator Error Types

use thiserror::Error;

/// Result type alias for generator operations
pub type Result<T> = std::result::Result<T, GeneratorError>;

/// Errors surfaced by a recommendation generator backend
#[derive(Error, Debug)]
pub enum GeneratorError {
    /// Backend unreachable or not responding
    #[error("Generator unavailable: {0}")]
    Unavailable(String),

    /// Backend did not answer within the configured deadline
    #[error("Generator timed out after {0}s")]
    Timeout(u64),

    /// Backend answered with a payload that does not parse as a draft plan
    #[error("Malformed generator payload: {0}")]
    Malformed(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other/unknown error
    #[error("{0}")]
    Other(String),
}

impl GeneratorError {
    /// Check if the caller may reasonably retry this error.
    ///
    /// The core performs no retry itself; this only informs caller policy.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GeneratorError::Unavailable(_) | GeneratorError::Timeout(_)
        )
    }
}

impl From<anyhow::Error> for GeneratorError {
    fn from(err: anyhow::Error) -> Self {
        GeneratorError::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(GeneratorError::Unavailable("down".into()).is_retryable());
        assert!(GeneratorError::Timeout(30).is_retryable());
        assert!(!GeneratorError::Malformed("bad".into()).is_retryable());
        assert!(!GeneratorError::Other("x".into()).is_retryable());
    }
}
