//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod output;
mod planning;
mod providers;

pub use output::FileOutputConfig;
pub use planning::FilePlanningConfig;
pub use providers::{FileAnthropicConfig, FileOpenAiConfig, FileProvidersConfig};

use crate::providers::ProviderKind;
use planner_application::{PlanningParams, PlanningParamsError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors
#[derive(Error, Debug, PartialEq)]
pub enum ConfigValidationError {
    #[error("[planning] {0}")]
    Planning(#[from] PlanningParamsError),

    #[error("[providers] unknown default provider '{0}' (expected 'anthropic' or 'openai')")]
    UnknownProvider(String),

    #[error("[providers.{provider}] timeout_seconds cannot be 0")]
    InvalidTimeout { provider: &'static str },

    #[error("[providers.{provider}] model name cannot be empty")]
    EmptyModelName { provider: &'static str },
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Self-critique loop settings
    pub planning: FilePlanningConfig,
    /// Completion provider settings
    pub providers: FileProvidersConfig,
    /// Output settings
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the configuration, stopping at the first problem.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        self.to_planning_params().validate()?;

        self.default_provider()?;

        if self.providers.anthropic.timeout_seconds == 0 {
            return Err(ConfigValidationError::InvalidTimeout {
                provider: "anthropic",
            });
        }
        if self.providers.openai.timeout_seconds == 0 {
            return Err(ConfigValidationError::InvalidTimeout { provider: "openai" });
        }
        if self.providers.anthropic.model.trim().is_empty() {
            return Err(ConfigValidationError::EmptyModelName {
                provider: "anthropic",
            });
        }
        if self.providers.openai.model.trim().is_empty() {
            return Err(ConfigValidationError::EmptyModelName { provider: "openai" });
        }

        Ok(())
    }

    /// Planning parameters from the `[planning]` section
    pub fn to_planning_params(&self) -> PlanningParams {
        self.planning.to_planning_params()
    }

    /// Provider selected by `[providers] default`
    pub fn default_provider(&self) -> Result<ProviderKind, ConfigValidationError> {
        self.providers
            .default
            .parse()
            .map_err(|_| ConfigValidationError::UnknownProvider(self.providers.default.clone()))
    }
}
