//! Self-critique domain
//!
//! This module contains the pure decision logic of the planning loop:
//!
//! - [`verdict`]: the closed three-valued outcome of one critique sample
//! - [`parsing`]: free-form critique text → [`CritiqueResult`]
//! - [`vote`]: a batch of critiques → [`VoteResult`]
//!
//! # Flow
//!
//! ```text
//! raw completion ──parse_critique_response──▶ CritiqueResult ─┐
//! raw completion ──parse_critique_response──▶ CritiqueResult ─┼─aggregate_votes──▶ VoteResult
//! raw completion ──parse_critique_response──▶ CritiqueResult ─┘
//! ```
//!
//! Both steps are fail-closed: an unparseable critique counts as WRONG and
//! a tied vote never resolves to CORRECT.

pub mod parsing;
pub mod verdict;
pub mod vote;

// Re-export main types
pub use parsing::{CritiqueResult, parse_critique_response};
pub use verdict::Verdict;
pub use vote::{
    LOW_CONFIDENCE_THRESHOLD, VerdictBreakdown, VoteResult, aggregate_votes,
    aggregate_votes_with_threshold,
};
