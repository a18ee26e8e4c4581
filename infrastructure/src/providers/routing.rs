use super::{AnthropicProvider, OpenAiProvider, ProviderBuildError, ProviderKind};
use crate::config::FileProvidersConfig;
use async_trait::async_trait;
use planner_application::{CompletionProvider, ProviderError};
use planner_domain::{CompletionRequest, CompletionResponse};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Dispatches completion calls to one of several registered providers.
///
/// Routing is by [`ProviderKind`] only: every call goes to the selected
/// kind. Selecting a kind with no registered adapter is not an error at
/// construction time; calls then fail with [`ProviderError::NotConfigured`].
pub struct ProviderRouter {
    providers: HashMap<ProviderKind, Arc<dyn CompletionProvider>>,
    selected: ProviderKind,
}

impl ProviderRouter {
    pub fn new(selected: ProviderKind) -> Self {
        Self {
            providers: HashMap::new(),
            selected,
        }
    }

    /// Register an adapter, replacing any previous one of the same kind
    pub fn register(mut self, kind: ProviderKind, provider: Arc<dyn CompletionProvider>) -> Self {
        self.providers.insert(kind, provider);
        self
    }

    /// Build adapters for every provider that has an API key.
    ///
    /// Providers without a key are skipped; use [`require`](Self::require)
    /// to turn a missing selected provider into an error.
    pub fn from_config(
        config: &FileProvidersConfig,
        selected: ProviderKind,
    ) -> Result<Self, ProviderBuildError> {
        let mut router = Self::new(selected);

        if let Some(key) = config.anthropic.resolve_api_key() {
            let provider = AnthropicProvider::from_config(key, &config.anthropic)?;
            debug!("Registered anthropic provider (model {})", provider.model());
            router = router.register(ProviderKind::Anthropic, Arc::new(provider));
        }

        if let Some(key) = config.openai.resolve_api_key() {
            let provider = OpenAiProvider::from_config(key, &config.openai)?;
            debug!("Registered openai provider (model {})", provider.model());
            router = router.register(ProviderKind::OpenAi, Arc::new(provider));
        }

        Ok(router)
    }

    /// Fail unless the selected provider is registered
    pub fn require(self, config: &FileProvidersConfig) -> Result<Self, ProviderBuildError> {
        if self.is_configured(self.selected) {
            return Ok(self);
        }
        let env_var = match self.selected {
            ProviderKind::Anthropic => config.anthropic.api_key_env.clone(),
            ProviderKind::OpenAi => config.openai.api_key_env.clone(),
        };
        Err(ProviderBuildError::MissingApiKey {
            provider: self.selected,
            env_var,
        })
    }

    pub fn selected(&self) -> ProviderKind {
        self.selected
    }

    pub fn is_configured(&self, kind: ProviderKind) -> bool {
        self.providers.contains_key(&kind)
    }

    /// Complete with an explicit provider kind
    pub async fn complete_with(
        &self,
        kind: ProviderKind,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        let provider = self.providers.get(&kind).ok_or_else(|| {
            ProviderError::NotConfigured(format!("no API key configured for provider: {}", kind))
        })?;
        provider.complete(request).await
    }
}

#[async_trait]
impl CompletionProvider for ProviderRouter {
    fn name(&self) -> &str {
        self.selected.as_str()
    }

    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        self.complete_with(self.selected, request).await
    }
}
