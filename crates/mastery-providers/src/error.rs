//! Provider error types.

use thiserror::Error;

/// Errors that can occur when talking to a history provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The judge does not know this handle.
    #[error("learner not found: {0}")]
    LearnerNotFound(String),

    /// The judge asked us to slow down (HTTP 429/503).
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The response body was not the shape we expected.
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl ProviderError {
    /// Returns `true` if retrying the same request cannot succeed.
    pub fn is_permanent(&self) -> bool {
        match self {
            ProviderError::LearnerNotFound(_) | ProviderError::Decode(_) => true,
            ProviderError::ApiError { status, .. } => (400..500).contains(status),
            ProviderError::RateLimited { .. }
            | ProviderError::Timeout(_)
            | ProviderError::NetworkError(_) => false,
        }
    }
}
