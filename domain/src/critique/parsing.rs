//! Critique response parsing.
//!
//! Extracts a structured [`CritiqueResult`] from one free-form critique
//! completion. Pure domain logic: no I/O, just text pattern matching.
//!
//! | Field | Source |
//! |-------|--------|
//! | `verdict` | earliest of the three verdict phrases, WRONG if none |
//! | `step_traces` | `Step N: ...` blocks, in order |
//! | `error_reason` | first `PRECONDITION FAILED` / `Error:` / `Cannot` line (non-CORRECT only) |
//!
//! Parsing never fails. Input that names no verdict is recorded as WRONG
//! with `is_ambiguous` set.

use super::verdict::Verdict;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static STEP_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)step \d+:").expect("step marker pattern is valid"));

/// Failure-signal patterns, tried in order. `.` stops at end of line.
static ERROR_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [r"(?i)PRECONDITION FAILED.*", r"(?i)Error:.*", r"(?i)Cannot.*"]
        .iter()
        .map(|p| Regex::new(p).expect("error pattern is valid"))
        .collect()
});

/// One sampled evaluation of a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CritiqueResult {
    /// Parsed verdict (fail-closed default: WRONG).
    pub verdict: Verdict,
    /// Per-step explanations, in the order they appear.
    pub step_traces: Vec<String>,
    /// First detected failure; only ever set when `verdict` is not CORRECT.
    pub error_reason: Option<String>,
    /// Unparsed model output.
    pub raw_text: String,
    /// True when no verdict phrase was found and WRONG was assumed.
    pub is_ambiguous: bool,
}

impl CritiqueResult {
    /// Build a result directly from a verdict (no raw text).
    pub fn from_verdict(verdict: Verdict) -> Self {
        Self {
            verdict,
            step_traces: Vec::new(),
            error_reason: None,
            raw_text: String::new(),
            is_ambiguous: false,
        }
    }

    /// Attach an error reason. Ignored for CORRECT critiques.
    pub fn with_error_reason(mut self, reason: impl Into<String>) -> Self {
        if !self.verdict.is_correct() {
            self.error_reason = Some(reason.into());
        }
        self
    }
}

/// Parse one critique completion into a [`CritiqueResult`].
///
/// # Examples
///
/// ```
/// use planner_domain::{Verdict, parse_critique_response};
///
/// let result = parse_critique_response("Step 1: pickup A ok\nThe plan is correct.");
/// assert_eq!(result.verdict, Verdict::Correct);
/// assert_eq!(result.step_traces, vec!["Step 1: pickup A ok\nThe plan is correct."]);
///
/// let result = parse_critique_response("I am not sure.");
/// assert_eq!(result.verdict, Verdict::Wrong);
/// assert!(result.is_ambiguous);
/// ```
pub fn parse_critique_response(response: &str) -> CritiqueResult {
    let (verdict, is_ambiguous) = match extract_verdict(response) {
        Some(verdict) => (verdict, false),
        None => (Verdict::Wrong, true),
    };

    let error_reason = if verdict.is_correct() {
        None
    } else {
        extract_error_reason(response)
    };

    CritiqueResult {
        verdict,
        step_traces: extract_step_traces(response),
        error_reason,
        raw_text: response.to_string(),
        is_ambiguous,
    }
}

/// Find the verdict phrase that occurs first in the text.
///
/// Two distinct phrases cannot start at the same offset, so position alone
/// decides; [`Verdict::ALL`] order is only the iteration order.
fn extract_verdict(response: &str) -> Option<Verdict> {
    let lowered = response.to_lowercase();

    Verdict::ALL
        .iter()
        .filter_map(|v| lowered.find(v.phrase()).map(|pos| (pos, *v)))
        .min_by_key(|(pos, _)| *pos)
        .map(|(_, v)| v)
}

fn extract_step_traces(response: &str) -> Vec<String> {
    let starts: Vec<usize> = STEP_MARKER.find_iter(response).map(|m| m.start()).collect();

    starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(response.len());
            response[start..end].trim().to_string()
        })
        .filter(|trace| !trace.is_empty())
        .collect()
}

fn extract_error_reason(response: &str) -> Option<String> {
    ERROR_PATTERNS
        .iter()
        .find_map(|pattern| pattern.find(response))
        .map(|m| m.as_str().trim_end().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Verdict Tests ====================

    #[test]
    fn test_correct_phrase() {
        let result = parse_critique_response("All preconditions hold. The plan is correct.");
        assert_eq!(result.verdict, Verdict::Correct);
        assert!(!result.is_ambiguous);
        assert!(result.error_reason.is_none());
    }

    #[test]
    fn test_wrong_phrase() {
        let result = parse_critique_response("the plan is wrong");
        assert_eq!(result.verdict, Verdict::Wrong);
        assert!(!result.is_ambiguous);
    }

    #[test]
    fn test_goal_not_reached_phrase() {
        let result = parse_critique_response("All actions apply but GOAL NOT REACHED.");
        assert_eq!(result.verdict, Verdict::GoalNotReached);
    }

    #[test]
    fn test_mixed_case() {
        let result = parse_critique_response("tHe PlAn Is CoRrEcT");
        assert_eq!(result.verdict, Verdict::Correct);
    }

    #[test]
    fn test_no_phrase_defaults_to_wrong() {
        let result = parse_critique_response("This plan looks plausible to me.");
        assert_eq!(result.verdict, Verdict::Wrong);
        assert!(result.is_ambiguous);
    }

    #[test]
    fn test_empty_input_defaults_to_wrong() {
        let result = parse_critique_response("");
        assert_eq!(result.verdict, Verdict::Wrong);
        assert!(result.is_ambiguous);
        assert!(result.step_traces.is_empty());
        assert!(result.error_reason.is_none());
        assert_eq!(result.raw_text, "");
    }

    #[test]
    fn test_earliest_phrase_wins() {
        let text = "At first I thought the plan is wrong, but on reflection the plan is correct.";
        assert_eq!(parse_critique_response(text).verdict, Verdict::Wrong);

        let text = "The plan is correct? No: goal not reached, so the plan is wrong.";
        assert_eq!(parse_critique_response(text).verdict, Verdict::Correct);
    }

    #[test]
    fn test_all_three_phrases_present() {
        let text = "goal not reached ... the plan is wrong ... the plan is correct";
        let result = parse_critique_response(text);
        assert_eq!(result.verdict, Verdict::GoalNotReached);
        assert!(!result.is_ambiguous);
    }

    #[test]
    fn test_near_miss_phrase_is_not_a_verdict() {
        let result = parse_critique_response("The plan seems correct.");
        assert_eq!(result.verdict, Verdict::Wrong);
        assert!(result.is_ambiguous);
    }

    // ==================== Step Trace Tests ====================

    #[test]
    fn test_step_traces_in_order() {
        let text = "Step 1: pickup A. Preconditions met.\nStep 2: stack A B. Preconditions met.\nStep 3: done\nthe plan is correct";
        let result = parse_critique_response(text);
        assert_eq!(result.step_traces.len(), 3);
        assert_eq!(result.step_traces[0], "Step 1: pickup A. Preconditions met.");
        assert_eq!(result.step_traces[1], "Step 2: stack A B. Preconditions met.");
        assert!(result.step_traces[2].starts_with("Step 3: done"));
        assert!(result.step_traces[2].ends_with("the plan is correct"));
    }

    #[test]
    fn test_step_traces_case_insensitive() {
        let result = parse_critique_response("STEP 1: a\nstep 2: b");
        assert_eq!(result.step_traces, vec!["STEP 1: a", "step 2: b"]);
    }

    #[test]
    fn test_no_step_traces() {
        let result = parse_critique_response("the plan is correct");
        assert!(result.step_traces.is_empty());
    }

    // ==================== Error Reason Tests ====================

    #[test]
    fn test_precondition_failed_reason() {
        let text = "Step 1: pickup A ok\nStep 2: PRECONDITION FAILED: (clear B) is false\nthe plan is wrong";
        let result = parse_critique_response(text);
        assert_eq!(
            result.error_reason.as_deref(),
            Some("PRECONDITION FAILED: (clear B) is false")
        );
    }

    #[test]
    fn test_error_pattern_priority() {
        // PRECONDITION FAILED is tried before Error: even if it appears later
        let text = "Error: something\nPRECONDITION FAILED: holding A\nthe plan is wrong";
        let result = parse_critique_response(text);
        assert_eq!(
            result.error_reason.as_deref(),
            Some("PRECONDITION FAILED: holding A")
        );
    }

    #[test]
    fn test_cannot_reason() {
        let result = parse_critique_response("Cannot unstack C from A.\nthe plan is wrong");
        assert_eq!(result.error_reason.as_deref(), Some("Cannot unstack C from A."));
    }

    #[test]
    fn test_error_reason_absent_when_not_localized() {
        let result = parse_critique_response("goal not reached");
        assert_eq!(result.verdict, Verdict::GoalNotReached);
        assert!(result.error_reason.is_none());
    }

    #[test]
    fn test_error_reason_ignored_for_correct() {
        let result = parse_critique_response("Error: none found. The plan is correct.");
        assert_eq!(result.verdict, Verdict::Correct);
        assert!(result.error_reason.is_none());
    }

    #[test]
    fn test_ambiguous_critique_still_gets_reason() {
        let result = parse_critique_response("Error: unknown action fly");
        assert!(result.is_ambiguous);
        assert_eq!(result.error_reason.as_deref(), Some("Error: unknown action fly"));
    }

    #[test]
    fn test_raw_text_preserved() {
        let text = "Step 1: x\r\nthe plan is wrong\r\n";
        assert_eq!(parse_critique_response(text).raw_text, text);
    }

    #[test]
    fn test_non_ascii_input_does_not_panic() {
        let result = parse_critique_response("Ünïcödé ステップ 1: — the plan is wrong İ");
        assert_eq!(result.verdict, Verdict::Wrong);
    }

    #[test]
    fn test_with_error_reason_builder() {
        let wrong = CritiqueResult::from_verdict(Verdict::Wrong).with_error_reason("bad");
        assert_eq!(wrong.error_reason.as_deref(), Some("bad"));

        let correct = CritiqueResult::from_verdict(Verdict::Correct).with_error_reason("bad");
        assert!(correct.error_reason.is_none());
    }
}
