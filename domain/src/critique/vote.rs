//! Vote aggregation for self-consistency critique
//!
//! Reduces one iteration's batch of [`CritiqueResult`]s to a single
//! [`VoteResult`]. Aggregation is a pure function of the batch and its order.

use super::parsing::CritiqueResult;
use super::verdict::Verdict;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Confidence below which a vote is flagged as low-confidence.
pub const LOW_CONFIDENCE_THRESHOLD: f64 = 0.8;

/// Per-verdict vote counts. All three verdicts are always present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerdictBreakdown {
    pub correct: usize,
    pub wrong: usize,
    pub goal_not_reached: usize,
}

impl VerdictBreakdown {
    /// Count the verdicts of a batch.
    pub fn from_verdicts(verdicts: impl IntoIterator<Item = Verdict>) -> Self {
        let mut breakdown = Self::default();
        for verdict in verdicts {
            breakdown.increment(verdict);
        }
        breakdown
    }

    pub fn get(&self, verdict: Verdict) -> usize {
        match verdict {
            Verdict::Correct => self.correct,
            Verdict::Wrong => self.wrong,
            Verdict::GoalNotReached => self.goal_not_reached,
        }
    }

    pub fn increment(&mut self, verdict: Verdict) {
        match verdict {
            Verdict::Correct => self.correct += 1,
            Verdict::Wrong => self.wrong += 1,
            Verdict::GoalNotReached => self.goal_not_reached += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.correct + self.wrong + self.goal_not_reached
    }

    /// `(verdict, count)` pairs in [`Verdict::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Verdict, usize)> + '_ {
        Verdict::ALL.iter().map(move |v| (*v, self.get(*v)))
    }

    /// Verdict with the highest count, ties broken by [`Verdict::tie_break_rank`].
    ///
    /// Returns `None` for an empty breakdown.
    pub fn leader(&self) -> Option<(Verdict, usize)> {
        if self.total() == 0 {
            return None;
        }
        self.iter()
            .max_by_key(|(verdict, count)| (*count, verdict.tie_break_rank()))
    }
}

/// Result of aggregating one iteration's critique batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteResult {
    /// Verdict with the highest count (fail-closed tie-break)
    pub majority_verdict: Verdict,
    /// Count of each verdict kind; sums to `total_votes`
    pub breakdown: VerdictBreakdown,
    /// `majority_count / total_votes`, in (0, 1]
    pub confidence: f64,
    /// Whether `confidence` is below the low-confidence threshold
    pub is_low_confidence: bool,
    /// First critique in submission order whose verdict is the majority
    pub best_critique: CritiqueResult,
    /// Number of critiques in the batch
    pub total_votes: usize,
    /// Individual verdicts in submission order
    pub verdicts: Vec<Verdict>,
}

impl VoteResult {
    /// Number of votes for the majority verdict
    pub fn majority_count(&self) -> usize {
        self.breakdown.get(self.majority_verdict)
    }

    /// Whether every sample agreed
    pub fn is_unanimous(&self) -> bool {
        self.majority_count() == self.total_votes
    }

    /// Whether the plan was accepted
    pub fn is_accepted(&self) -> bool {
        self.majority_verdict.is_correct()
    }

    /// Error reason from the representative critique, if it localized one
    pub fn error_reason(&self) -> Option<&str> {
        self.best_critique.error_reason.as_deref()
    }

    /// Generate a visual vote summary (e.g., "[●●○◐]")
    ///
    /// `●` correct, `○` wrong, `◐` goal not reached.
    pub fn vote_summary(&self) -> String {
        let mut summary = String::from("[");
        for verdict in &self.verdicts {
            summary.push(match verdict {
                Verdict::Correct => '●',
                Verdict::Wrong => '○',
                Verdict::GoalNotReached => '◐',
            });
        }
        summary.push(']');
        summary
    }
}

/// Aggregate a critique batch using [`LOW_CONFIDENCE_THRESHOLD`].
///
/// # Example
///
/// ```
/// use planner_domain::{CritiqueResult, Verdict, aggregate_votes};
///
/// let batch = vec![
///     CritiqueResult::from_verdict(Verdict::Wrong),
///     CritiqueResult::from_verdict(Verdict::Correct),
///     CritiqueResult::from_verdict(Verdict::Wrong),
/// ];
/// let vote = aggregate_votes(&batch).unwrap();
/// assert_eq!(vote.majority_verdict, Verdict::Wrong);
/// assert!(vote.is_low_confidence);
/// ```
pub fn aggregate_votes(batch: &[CritiqueResult]) -> Result<VoteResult, DomainError> {
    aggregate_votes_with_threshold(batch, LOW_CONFIDENCE_THRESHOLD)
}

/// Aggregate a critique batch with an explicit low-confidence threshold.
///
/// An empty batch is an error: there is nothing to vote on.
pub fn aggregate_votes_with_threshold(
    batch: &[CritiqueResult],
    low_confidence_threshold: f64,
) -> Result<VoteResult, DomainError> {
    let verdicts: Vec<Verdict> = batch.iter().map(|c| c.verdict).collect();
    let breakdown = VerdictBreakdown::from_verdicts(verdicts.iter().copied());

    let (majority_verdict, majority_count) = breakdown.leader().ok_or(DomainError::EmptyBatch)?;

    let best_critique = batch
        .iter()
        .find(|c| c.verdict == majority_verdict)
        .cloned()
        .ok_or(DomainError::EmptyBatch)?;

    let confidence = majority_count as f64 / batch.len() as f64;

    Ok(VoteResult {
        majority_verdict,
        breakdown,
        confidence,
        is_low_confidence: confidence < low_confidence_threshold,
        best_critique,
        total_votes: batch.len(),
        verdicts,
    })
}
