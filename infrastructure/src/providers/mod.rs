//! Completion provider adapters
//!
//! HTTP adapters implementing the [`CompletionProvider`] port, plus a
//! [`ProviderRouter`] that dispatches to the configured provider.
//!
//! [`CompletionProvider`]: planner_application::CompletionProvider

mod anthropic;
mod openai;
mod routing;

pub use anthropic::AnthropicProvider;
pub use openai::OpenAiProvider;
pub use routing::ProviderRouter;

use planner_application::ProviderError;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProviderKind {
    #[default]
    Anthropic,
    OpenAi,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::OpenAi => "openai",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = ProviderBuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "anthropic" | "claude" => Ok(ProviderKind::Anthropic),
            "openai" => Ok(ProviderKind::OpenAi),
            other => Err(ProviderBuildError::UnknownProvider(other.to_string())),
        }
    }
}

/// Errors building provider adapters from configuration
#[derive(Error, Debug)]
pub enum ProviderBuildError {
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("No API key for {provider}: set {env_var} or [providers.{provider}] api_key")]
    MissingApiKey {
        provider: ProviderKind,
        env_var: String,
    },

    #[error("Failed to create HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Map a non-success HTTP status to a provider error.
fn status_error(status: reqwest::StatusCode, body: String) -> ProviderError {
    match status.as_u16() {
        401 | 403 => ProviderError::AuthenticationFailed(body),
        429 => ProviderError::RateLimited(body),
        408 | 504 => ProviderError::Timeout,
        _ => ProviderError::RequestFailed(format!("HTTP {}: {}", status, body)),
    }
}

/// Map a transport error to a provider error.
fn transport_error(error: reqwest::Error) -> ProviderError {
    if error.is_timeout() {
        ProviderError::Timeout
    } else if error.is_connect() {
        ProviderError::ConnectionError(error.to_string())
    } else if error.is_decode() {
        ProviderError::InvalidResponse(error.to_string())
    } else {
        ProviderError::RequestFailed(error.to_string())
    }
}
