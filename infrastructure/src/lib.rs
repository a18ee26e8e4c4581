//! Infrastructure layer for self-critique-planner
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: HTTP completion providers, configuration
//! file loading and JSONL event logging.

pub mod config;
pub mod logging;
pub mod providers;

// Re-export commonly used types
pub use config::{ConfigLoader, ConfigValidationError, FileConfig, FileOutputConfig};
pub use logging::JsonlConversationLogger;
pub use providers::{
    AnthropicProvider, OpenAiProvider, ProviderBuildError, ProviderKind, ProviderRouter,
};
