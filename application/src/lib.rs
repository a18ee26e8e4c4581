//! Application layer for self-critique-planner
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{PlanningParams, PlanningParamsError};
pub use ports::{
    completion_provider::{CompletionProvider, ProviderError},
    composite_logger::CompositeConversationLogger,
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    progress::{NoProgress, PlanningProgressNotifier},
};
pub use use_cases::run_self_critique::{RunSelfCritiqueInput, RunSelfCritiqueUseCase};
