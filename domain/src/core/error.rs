//! Domain error types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid verdict: {0}")]
    InvalidVerdict(String),

    #[error("Invalid output format: {0}")]
    InvalidOutputFormat(String),

    #[error("Cannot aggregate an empty critique batch")]
    EmptyBatch,
}

/// Cause of a run that ended without a usable verdict.
///
/// Attached to a [`PlanResult`](crate::planning::PlanResult) whose status is
/// `Failed` or `Cancelled`. Serializable so the whole result can be emitted
/// as JSON by callers.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanningError {
    /// The single plan-generation call failed.
    #[error("Plan generation failed: {message}")]
    GenerationFailed { message: String },

    /// Too few critique samples succeeded to hold a vote.
    #[error("Insufficient votes: {succeeded} of {requested} critique samples succeeded (minimum {minimum})")]
    InsufficientVotes {
        requested: usize,
        succeeded: usize,
        minimum: usize,
    },

    /// The run was cancelled by the caller.
    #[error("Run cancelled")]
    Cancelled,
}

impl PlanningError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, PlanningError::Cancelled)
    }
}
