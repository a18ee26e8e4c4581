//! Planning loop configuration from TOML (`[planning]` section)

use planner_application::PlanningParams;
use planner_domain::LOW_CONFIDENCE_THRESHOLD;
use planner_domain::completion::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw `[planning]` configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePlanningConfig {
    /// Maximum generate/critique iterations (default: 5)
    pub max_iterations: usize,
    /// Critique samples per iteration (default: 5)
    pub samples_per_iteration: usize,
    /// Successful samples required to vote (default: 1)
    pub min_successful_samples: usize,
    /// Confidence below this is flagged low (default: 0.8)
    pub low_confidence_threshold: f64,
    /// Temperature for plan generation (default: 0.7)
    pub generation_temperature: f32,
    /// Temperature for critique samples (default: 0.7)
    pub critique_temperature: f32,
    /// Token budget per completion call (default: 4096)
    pub max_tokens: u32,
    /// Deadline per completion call in seconds (default: none)
    pub sample_timeout_seconds: Option<u64>,
}

impl Default for FilePlanningConfig {
    fn default() -> Self {
        Self {
            max_iterations: 5,
            samples_per_iteration: 5,
            min_successful_samples: 1,
            low_confidence_threshold: LOW_CONFIDENCE_THRESHOLD,
            generation_temperature: DEFAULT_TEMPERATURE,
            critique_temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            sample_timeout_seconds: None,
        }
    }
}

impl FilePlanningConfig {
    /// Convert to application-layer parameters (unvalidated)
    pub fn to_planning_params(&self) -> PlanningParams {
        PlanningParams::default()
            .with_max_iterations(self.max_iterations)
            .with_samples_per_iteration(self.samples_per_iteration)
            .with_min_successful_samples(self.min_successful_samples)
            .with_low_confidence_threshold(self.low_confidence_threshold)
            .with_generation_temperature(self.generation_temperature)
            .with_critique_temperature(self.critique_temperature)
            .with_max_tokens(self.max_tokens)
            .with_sample_timeout(self.sample_timeout_seconds.map(Duration::from_secs))
    }
}
