//! Planning run domain
//!
//! Entities produced by the self-critique planning loop:
//! [`PlanCandidate`] per iteration, [`IterationRecord`] as append-only
//! evidence, and [`PlanResult`] once the loop terminates.

pub mod entities;

pub use entities::{IterationRecord, OrchestratorState, PlanCandidate, PlanResult, PlanStatus};
