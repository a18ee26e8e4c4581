//! Prompt templates for the self-critique flow

use serde::{Deserialize, Serialize};

const GENERATION_TEMPLATE: &str = r#"Given the domain definition:
{domain}

The problem to solve:
{problem}

{critique_history}

Generate a plan to solve this problem. Output only the numbered list of actions."#;

const CRITIQUE_TEMPLATE: &str = r#"Given the domain definition:
{domain}

So, for each action:
1. Take the action and its preconditions from the domain definition for the specific action.
2. Verify whether the preconditions are met for the action.
3. Apply the action and provide the resulting state.

The problem to solve:
{problem}

The suggested solution:
{plan}

Please carefully evaluate the plan. Verify each step as described above. Do not stop until each action is verified; please *do not* omit steps. Conclude with the assessment literally either with 'the plan is correct', 'the plan is wrong', or 'goal not reached'."#;

const REVISION_TEMPLATE: &str = "\nPrevious attempt failed with: {reason}\nPlease fix this issue.";

const REJECTED_REASON: &str = "the plan was rejected";

/// Prompt templates injected into the planning orchestrator.
///
/// Placeholders are `{name}` tokens. Substitution is single-pass, so a
/// domain text that itself contains `{plan}` is inserted literally.
///
/// | Template | Placeholders |
/// |----------|--------------|
/// | `generation` | `{domain}`, `{problem}`, `{critique_history}` |
/// | `critique` | `{domain}`, `{problem}`, `{plan}` |
/// | `revision` | `{reason}` |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanningPrompts {
    pub generation: String,
    pub critique: String,
    pub revision: String,
    /// Reason used when the representative critique localized no error
    pub rejected_reason: String,
}

impl Default for PlanningPrompts {
    fn default() -> Self {
        Self {
            generation: GENERATION_TEMPLATE.to_string(),
            critique: CRITIQUE_TEMPLATE.to_string(),
            revision: REVISION_TEMPLATE.to_string(),
            rejected_reason: REJECTED_REASON.to_string(),
        }
    }
}

impl PlanningPrompts {
    /// Prompt asking for a plan.
    pub fn generation_prompt(&self, domain: &str, problem: &str, critique_history: &str) -> String {
        render_template(
            &self.generation,
            &[
                ("domain", domain),
                ("problem", problem),
                ("critique_history", critique_history),
            ],
        )
    }

    /// Prompt asking for a step-by-step critique of `plan`.
    pub fn critique_prompt(&self, domain: &str, problem: &str, plan: &str) -> String {
        render_template(
            &self.critique,
            &[("domain", domain), ("problem", problem), ("plan", plan)],
        )
    }

    /// Critique history for the next generation prompt.
    pub fn revision_note(&self, error_reason: Option<&str>) -> String {
        let reason = error_reason.unwrap_or(&self.rejected_reason);
        render_template(&self.revision, &[("reason", reason)])
    }
}

/// Replace `{key}` tokens in one left-to-right pass.
///
/// Unknown tokens and stray braces are copied through unchanged.
pub fn render_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let candidate = &rest[open + 1..];

        let matched = values.iter().find(|(key, _)| {
            candidate
                .strip_prefix(key)
                .is_some_and(|after| after.starts_with('}'))
        });

        match matched {
            Some((key, value)) => {
                out.push_str(value);
                rest = &candidate[key.len() + 1..];
            }
            None => {
                out.push('{');
                rest = candidate;
            }
        }
    }

    out.push_str(rest);
    out
}
