//! Domain layer for self-critique-planner
//!
//! This crate contains the core planning logic: verdicts, critique parsing,
//! vote aggregation, plan entities and prompt templates.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Self-Critique
//!
//! A generated plan is evaluated several times, independently, by the same
//! completion provider. Each evaluation ends with one of three literal
//! phrases which the parser maps to a [`Verdict`].
//!
//! ## Self-Consistency Voting
//!
//! The parsed critiques of one iteration are reduced to a [`VoteResult`] by
//! majority with a fail-closed tie-break (WRONG > GOAL_NOT_REACHED > CORRECT).

pub mod completion;
pub mod config;
pub mod core;
pub mod critique;
pub mod planning;
pub mod prompt;
pub mod util;

// Re-export commonly used types
pub use completion::{CompletionRequest, CompletionResponse, TokenUsage};
pub use config::OutputFormat;
pub use core::error::{DomainError, PlanningError};
pub use critique::{
    CritiqueResult, LOW_CONFIDENCE_THRESHOLD, Verdict, VerdictBreakdown, VoteResult,
    aggregate_votes, aggregate_votes_with_threshold, parse_critique_response,
};
pub use planning::{IterationRecord, OrchestratorState, PlanCandidate, PlanResult, PlanStatus};
pub use prompt::PlanningPrompts;
