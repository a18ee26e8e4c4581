//! Logging infrastructure: structured JSONL event logs.
//!
//! Provides [`JsonlConversationLogger`], a JSONL file writer that implements
//! the [`ConversationLogger`](planner_application::ConversationLogger) port.

mod jsonl_logger;

pub use jsonl_logger::{ITERATION_EVENT, JsonlConversationLogger};
