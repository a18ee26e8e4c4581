//! Configuration file loading for self-critique-planner
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `PLANNER_` environment variables (`PLANNER_PLANNING__MAX_ITERATIONS=3`)
//! 2. `--config <path>` specified file
//! 3. Project root: `./planner.toml` or `./.planner.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/self-critique-planner/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileAnthropicConfig, FileConfig, FileOpenAiConfig, FileOutputConfig,
    FilePlanningConfig, FileProvidersConfig,
};
pub use loader::ConfigLoader;
