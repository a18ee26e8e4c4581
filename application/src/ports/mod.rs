//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod completion_provider;
pub mod composite_logger;
pub mod conversation_logger;
pub mod progress;
