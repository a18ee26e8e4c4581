//! Planning parameters: self-critique loop control.
//!
//! [`PlanningParams`] groups the static parameters that control the
//! generate → critique → vote loop in
//! [`RunSelfCritiqueUseCase`](crate::use_cases::run_self_critique::RunSelfCritiqueUseCase).

use planner_domain::LOW_CONFIDENCE_THRESHOLD;
use planner_domain::completion::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Invalid parameter combinations
#[derive(Debug, Error, PartialEq)]
pub enum PlanningParamsError {
    #[error("max_iterations must be at least 1")]
    ZeroIterations,

    #[error("samples_per_iteration must be at least 1")]
    ZeroSamples,

    #[error("min_successful_samples must be between 1 and samples_per_iteration ({samples})")]
    InvalidMinimumSamples { samples: usize },

    #[error("low_confidence_threshold must be in (0, 1], got {0}")]
    InvalidThreshold(f64),

    #[error("sample_timeout cannot be zero")]
    ZeroTimeout,
}

/// Self-critique loop control parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanningParams {
    /// Maximum generate/critique iterations before giving up.
    pub max_iterations: usize,
    /// Independent critique samples per iteration.
    pub samples_per_iteration: usize,
    /// Successful samples required to hold a vote. Fewer is `InsufficientVotes`.
    pub min_successful_samples: usize,
    /// Vote confidence below this is flagged as low-confidence.
    pub low_confidence_threshold: f64,
    /// Sampling temperature for plan generation.
    pub generation_temperature: f32,
    /// Sampling temperature for critique samples.
    pub critique_temperature: f32,
    /// Token budget per completion call.
    pub max_tokens: u32,
    /// Model override passed to the provider.
    pub model: Option<String>,
    /// Per-call deadline applied around each completion call.
    pub sample_timeout: Option<Duration>,
}

impl Default for PlanningParams {
    fn default() -> Self {
        Self {
            max_iterations: 5,
            samples_per_iteration: 5,
            min_successful_samples: 1,
            low_confidence_threshold: LOW_CONFIDENCE_THRESHOLD,
            generation_temperature: DEFAULT_TEMPERATURE,
            critique_temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            model: None,
            sample_timeout: None,
        }
    }
}

impl PlanningParams {
    // ==================== Builder Methods ====================

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_samples_per_iteration(mut self, samples: usize) -> Self {
        self.samples_per_iteration = samples;
        self
    }

    pub fn with_min_successful_samples(mut self, min: usize) -> Self {
        self.min_successful_samples = min;
        self
    }

    pub fn with_low_confidence_threshold(mut self, threshold: f64) -> Self {
        self.low_confidence_threshold = threshold;
        self
    }

    pub fn with_generation_temperature(mut self, temperature: f32) -> Self {
        self.generation_temperature = temperature;
        self
    }

    pub fn with_critique_temperature(mut self, temperature: f32) -> Self {
        self.critique_temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_sample_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.sample_timeout = timeout;
        self
    }

    // ==================== Validation ====================

    pub fn validate(&self) -> Result<(), PlanningParamsError> {
        if self.max_iterations == 0 {
            return Err(PlanningParamsError::ZeroIterations);
        }
        if self.samples_per_iteration == 0 {
            return Err(PlanningParamsError::ZeroSamples);
        }
        if self.min_successful_samples == 0
            || self.min_successful_samples > self.samples_per_iteration
        {
            return Err(PlanningParamsError::InvalidMinimumSamples {
                samples: self.samples_per_iteration,
            });
        }
        if !(self.low_confidence_threshold > 0.0 && self.low_confidence_threshold <= 1.0) {
            return Err(PlanningParamsError::InvalidThreshold(
                self.low_confidence_threshold,
            ));
        }
        if self.sample_timeout.is_some_and(|t| t.is_zero()) {
            return Err(PlanningParamsError::ZeroTimeout);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let params = PlanningParams::default();
        assert_eq!(params.max_iterations, 5);
        assert_eq!(params.samples_per_iteration, 5);
        assert_eq!(params.min_successful_samples, 1);
        assert_eq!(params.low_confidence_threshold, 0.8);
        assert_eq!(params.max_tokens, 4096);
        assert!(params.sample_timeout.is_none());
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let params = PlanningParams::default()
            .with_max_iterations(3)
            .with_samples_per_iteration(7)
            .with_min_successful_samples(4)
            .with_model("gpt-4o");

        assert_eq!(params.max_iterations, 3);
        assert_eq!(params.samples_per_iteration, 7);
        assert_eq!(params.min_successful_samples, 4);
        assert_eq!(params.model.as_deref(), Some("gpt-4o"));
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_counts() {
        assert_eq!(
            PlanningParams::default().with_max_iterations(0).validate(),
            Err(PlanningParamsError::ZeroIterations)
        );
        assert_eq!(
            PlanningParams::default()
                .with_samples_per_iteration(0)
                .validate(),
            Err(PlanningParamsError::ZeroSamples)
        );
    }

    #[test]
    fn test_validate_minimum_above_samples() {
        let params = PlanningParams::default()
            .with_samples_per_iteration(3)
            .with_min_successful_samples(4);
        assert_eq!(
            params.validate(),
            Err(PlanningParamsError::InvalidMinimumSamples { samples: 3 })
        );
    }

    #[test]
    fn test_validate_threshold_range() {
        assert!(
            PlanningParams::default()
                .with_low_confidence_threshold(0.0)
                .validate()
                .is_err()
        );
        assert!(
            PlanningParams::default()
                .with_low_confidence_threshold(1.0)
                .validate()
                .is_ok()
        );
        assert!(
            PlanningParams::default()
                .with_low_confidence_threshold(f64::NAN)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_validate_zero_timeout() {
        let params = PlanningParams::default().with_sample_timeout(Some(Duration::ZERO));
        assert_eq!(params.validate(), Err(PlanningParamsError::ZeroTimeout));
    }
}
