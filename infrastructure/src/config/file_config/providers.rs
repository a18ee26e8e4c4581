//! Provider configuration from TOML (`[providers]` section)

use serde::{Deserialize, Serialize};

/// Anthropic API provider configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAnthropicConfig {
    /// Environment variable name for the API key (default: "ANTHROPIC_API_KEY").
    pub api_key_env: String,
    /// Direct API key (not recommended, use the env var instead).
    pub api_key: Option<String>,
    /// Base URL for the Anthropic API.
    pub base_url: String,
    /// Model used when the request carries no override.
    pub model: String,
    /// Anthropic API version header.
    pub api_version: String,
    /// HTTP timeout per request.
    pub timeout_seconds: u64,
}

impl Default for FileAnthropicConfig {
    fn default() -> Self {
        Self {
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            api_key: None,
            base_url: "https://api.anthropic.com".to_string(),
            model: "claude-haiku-4-5".to_string(),
            api_version: "2023-06-01".to_string(),
            timeout_seconds: 120,
        }
    }
}

/// OpenAI API provider configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOpenAiConfig {
    /// Environment variable name for the API key (default: "OPENAI_API_KEY").
    pub api_key_env: String,
    /// Direct API key (not recommended, use the env var instead).
    pub api_key: Option<String>,
    /// Base URL for the OpenAI API (can be pointed at a compatible server).
    pub base_url: String,
    /// Model used when the request carries no override.
    pub model: String,
    /// HTTP timeout per request.
    pub timeout_seconds: u64,
}

impl Default for FileOpenAiConfig {
    fn default() -> Self {
        Self {
            api_key_env: "OPENAI_API_KEY".to_string(),
            api_key: None,
            base_url: "https://api.openai.com".to_string(),
            model: "gpt-4o".to_string(),
            timeout_seconds: 120,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProvidersConfig {
    /// Provider used for planning: "anthropic" or "openai".
    pub default: String,
    /// Anthropic API settings.
    pub anthropic: FileAnthropicConfig,
    /// OpenAI API settings.
    pub openai: FileOpenAiConfig,
}

impl Default for FileProvidersConfig {
    fn default() -> Self {
        Self {
            default: "anthropic".to_string(),
            anthropic: FileAnthropicConfig::default(),
            openai: FileOpenAiConfig::default(),
        }
    }
}

/// Resolve an API key: direct value first, then the named env var.
pub(crate) fn resolve_api_key(direct: Option<&str>, env_var: &str) -> Option<String> {
    direct
        .map(str::to_string)
        .or_else(|| std::env::var(env_var).ok())
        .filter(|key| !key.trim().is_empty())
}

impl FileAnthropicConfig {
    pub fn resolve_api_key(&self) -> Option<String> {
        resolve_api_key(self.api_key.as_deref(), &self.api_key_env)
    }
}

impl FileOpenAiConfig {
    pub fn resolve_api_key(&self) -> Option<String> {
        resolve_api_key(self.api_key.as_deref(), &self.api_key_env)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_key_wins() {
        assert_eq!(
            resolve_api_key(Some("sk-direct"), "PLANNER_TEST_UNSET_KEY_VAR"),
            Some("sk-direct".to_string())
        );
    }

    #[test]
    fn test_missing_key() {
        assert_eq!(resolve_api_key(None, "PLANNER_TEST_UNSET_KEY_VAR"), None);
        assert_eq!(resolve_api_key(Some("  "), "PLANNER_TEST_UNSET_KEY_VAR"), None);
    }

    #[test]
    fn test_default_models() {
        let config = FileProvidersConfig::default();
        assert_eq!(config.default, "anthropic");
        assert_eq!(config.anthropic.model, "claude-haiku-4-5");
        assert_eq!(config.openai.model, "gpt-4o");
    }
}
