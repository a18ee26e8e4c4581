//! Prompt domain
//!
//! Templates for the two prompts of the planning loop (generation and
//! critique) and the revision note fed back after a rejected plan.

mod template;

pub use template::{PlanningPrompts, render_template};
