//! Planning run entities

use crate::completion::TokenUsage;
use crate::core::error::PlanningError;
use crate::critique::{Verdict, VoteResult};
use serde::{Deserialize, Serialize};

/// A proposed plan: opaque, human-readable action text.
///
/// The core never interprets the plan's structure; the text is forwarded
/// verbatim into critique prompts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlanCandidate(String);

impl PlanCandidate {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn text(&self) -> &str {
        &self.0
    }

    /// Non-blank lines of the plan, for display.
    pub fn action_lines(&self) -> impl Iterator<Item = &str> {
        self.0.lines().map(str::trim).filter(|l| !l.is_empty())
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<String> for PlanCandidate {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl From<&str> for PlanCandidate {
    fn from(text: &str) -> Self {
        Self(text.to_string())
    }
}

impl std::fmt::Display for PlanCandidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// State of the self-critique loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrchestratorState {
    /// Asking the provider for a plan
    Generating,
    /// Fanning out critique samples
    Critiquing,
    /// Aggregating votes and choosing accept / revise
    Deciding,
    /// Terminal
    Done,
}

impl OrchestratorState {
    pub fn as_str(&self) -> &str {
        match self {
            OrchestratorState::Generating => "generating",
            OrchestratorState::Critiquing => "critiquing",
            OrchestratorState::Deciding => "deciding",
            OrchestratorState::Done => "done",
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            OrchestratorState::Generating => "Plan Generation",
            OrchestratorState::Critiquing => "Self-Critique",
            OrchestratorState::Deciding => "Vote",
            OrchestratorState::Done => "Done",
        }
    }
}

impl std::fmt::Display for OrchestratorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Evidence from one completed iteration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationRecord {
    /// Iteration number (1-indexed)
    pub iteration: usize,
    /// Plan evaluated in this iteration
    pub plan: PlanCandidate,
    /// Aggregated critique vote
    pub vote_result: VoteResult,
    /// Critique samples that failed at the provider and were left out of the vote
    #[serde(default)]
    pub failed_samples: usize,
}

impl IterationRecord {
    pub fn new(iteration: usize, plan: PlanCandidate, vote_result: VoteResult) -> Self {
        Self {
            iteration,
            plan,
            vote_result,
            failed_samples: 0,
        }
    }

    pub fn with_failed_samples(mut self, failed: usize) -> Self {
        self.failed_samples = failed;
        self
    }

    /// Number of samples requested for this iteration
    pub fn requested_samples(&self) -> usize {
        self.vote_result.total_votes + self.failed_samples
    }
}

/// Terminal status of a planning run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    /// The critique vote accepted the plan.
    Valid,
    /// Iteration budget exhausted; plan is usable but unverified.
    MaxIterations,
    /// No usable plan (generation failed or no critique samples succeeded).
    Failed,
    /// The caller cancelled the run.
    Cancelled,
}

impl PlanStatus {
    pub fn as_str(&self) -> &str {
        match self {
            PlanStatus::Valid => "valid",
            PlanStatus::MaxIterations => "max_iterations",
            PlanStatus::Failed => "failed",
            PlanStatus::Cancelled => "cancelled",
        }
    }

    /// Whether the run produced a plan the caller can act on.
    pub fn has_plan(&self) -> bool {
        matches!(self, PlanStatus::Valid | PlanStatus::MaxIterations)
    }
}

impl std::fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Final output of a planning run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanResult {
    /// Last generated plan (empty if none was generated)
    pub plan: String,
    /// Terminal status
    pub status: PlanStatus,
    /// Number of completed iterations
    pub iterations: usize,
    /// Last known majority verdict
    pub final_verdict: Option<Verdict>,
    /// One record per completed iteration, in order
    pub iteration_history: Vec<IterationRecord>,
    /// Cause when status is `Failed` or `Cancelled`
    pub error: Option<PlanningError>,
    /// Token usage summed over every successful provider call
    #[serde(default)]
    pub usage: TokenUsage,
}

impl PlanResult {
    /// Accepted plan. `history` must end with the accepting iteration.
    pub fn valid(plan: PlanCandidate, history: Vec<IterationRecord>) -> Self {
        Self {
            plan: plan.into_inner(),
            status: PlanStatus::Valid,
            iterations: history.len(),
            final_verdict: Some(Verdict::Correct),
            iteration_history: history,
            error: None,
            usage: TokenUsage::default(),
        }
    }

    /// Iteration budget exhausted.
    pub fn max_iterations(
        plan: PlanCandidate,
        final_verdict: Verdict,
        history: Vec<IterationRecord>,
    ) -> Self {
        Self {
            plan: plan.into_inner(),
            status: PlanStatus::MaxIterations,
            iterations: history.len(),
            final_verdict: Some(final_verdict),
            iteration_history: history,
            error: None,
            usage: TokenUsage::default(),
        }
    }

    /// Run ended with an error; keeps the last known plan and verdict.
    ///
    /// `current_plan` is the plan of an iteration that did not complete, if any.
    pub fn failed(
        error: PlanningError,
        current_plan: Option<PlanCandidate>,
        history: Vec<IterationRecord>,
    ) -> Self {
        let status = if error.is_cancelled() {
            PlanStatus::Cancelled
        } else {
            PlanStatus::Failed
        };

        let plan = current_plan
            .map(PlanCandidate::into_inner)
            .or_else(|| history.last().map(|r| r.plan.text().to_string()))
            .unwrap_or_default();

        Self {
            plan,
            status,
            iterations: history.len(),
            final_verdict: history.last().map(|r| r.vote_result.majority_verdict),
            iteration_history: history,
            error: Some(error),
            usage: TokenUsage::default(),
        }
    }

    /// Cancelled run.
    pub fn cancelled(current_plan: Option<PlanCandidate>, history: Vec<IterationRecord>) -> Self {
        Self::failed(PlanningError::Cancelled, current_plan, history)
    }

    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = usage;
        self
    }

    pub fn is_valid(&self) -> bool {
        self.status == PlanStatus::Valid
    }

    /// Most recent iteration record.
    pub fn last_iteration(&self) -> Option<&IterationRecord> {
        self.iteration_history.last()
    }
}
