//! Completion provider port
//!
//! Defines the interface for requesting text completions from an LLM provider.

use async_trait::async_trait;
use planner_domain::{CompletionRequest, CompletionResponse};
use thiserror::Error;

/// Errors from a single completion call
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Timeout")]
    Timeout,

    #[error("Other error: {0}")]
    Other(String),
}

/// Text-completion capability consumed by the planner.
///
/// Implementations must tolerate many concurrent calls with the same
/// request and must not share mutable state between calls: critique
/// sampling issues `samples_per_iteration` identical requests at once.
/// Adapters live in the infrastructure layer.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Short provider name for logs (e.g., "anthropic")
    fn name(&self) -> &str;

    /// Generate a completion for `request`
    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError>;
}
