//! Verdict of a single critique sample

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Outcome of one sampled critique of a plan.
///
/// Closed set: every critique maps to exactly one variant.
///
/// # Example
///
/// ```
/// use planner_domain::Verdict;
///
/// assert_eq!(Verdict::Correct.phrase(), "the plan is correct");
/// assert_eq!("goal_not_reached".parse::<Verdict>().unwrap(), Verdict::GoalNotReached);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Every action is applicable and the goal holds after the last one.
    Correct,
    /// Some action's preconditions do not hold.
    Wrong,
    /// Every action applies, but the final state misses the goal.
    GoalNotReached,
}

impl Verdict {
    /// All verdicts, in phrase-matching priority order.
    pub const ALL: [Verdict; 3] = [Verdict::Correct, Verdict::Wrong, Verdict::GoalNotReached];

    /// The literal (lower-case) phrase a critique must conclude with.
    pub fn phrase(&self) -> &'static str {
        match self {
            Verdict::Correct => "the plan is correct",
            Verdict::Wrong => "the plan is wrong",
            Verdict::GoalNotReached => "goal not reached",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Correct => "correct",
            Verdict::Wrong => "wrong",
            Verdict::GoalNotReached => "goal_not_reached",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Verdict::Correct => "CORRECT",
            Verdict::Wrong => "WRONG",
            Verdict::GoalNotReached => "GOAL NOT REACHED",
        }
    }

    pub fn is_correct(&self) -> bool {
        matches!(self, Verdict::Correct)
    }

    /// Rank used to break ties in a vote. Higher wins.
    ///
    /// WRONG > GOAL_NOT_REACHED > CORRECT, so a tied batch never accepts a plan.
    pub fn tie_break_rank(&self) -> u8 {
        match self {
            Verdict::Wrong => 2,
            Verdict::GoalNotReached => 1,
            Verdict::Correct => 0,
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for Verdict {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "correct" => Ok(Verdict::Correct),
            "wrong" => Ok(Verdict::Wrong),
            "goal_not_reached" => Ok(Verdict::GoalNotReached),
            other => Err(DomainError::InvalidVerdict(other.to_string())),
        }
    }
}
