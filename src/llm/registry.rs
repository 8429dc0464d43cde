//! Provider registry: the selector → binding map injected into the gateway

use super::{all_providers, LlmService, LoggingService, Provider, ProviderDef};
use reqwest::Client;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Configuration for LLM providers
#[derive(Debug, Clone, Default)]
pub struct LlmConfig {
    pub openai_api_key: Option<String>,
    /// Base URL for OpenAI-compatible servers (e.g. a local Ollama)
    pub openai_api_base: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub google_api_key: Option<String>,
    pub openai_default_model: Option<String>,
    pub anthropic_default_model: Option<String>,
    pub gemini_default_model: Option<String>,
    /// HTTP timeout for provider calls; `None` means the 300s default
    pub timeout: Option<Duration>,
}

impl LlmConfig {
    pub fn from_env() -> Self {
        Self {
            openai_api_key: non_empty_env("OPENAI_API_KEY"),
            openai_api_base: non_empty_env("OPENAI_API_BASE"),
            anthropic_api_key: non_empty_env("ANTHROPIC_API_KEY"),
            google_api_key: non_empty_env("GOOGLE_API_KEY"),
            openai_default_model: non_empty_env("OPENAI_DEFAULT_MODEL"),
            anthropic_default_model: non_empty_env("ANTHROPIC_DEFAULT_MODEL"),
            gemini_default_model: non_empty_env("GEMINI_DEFAULT_MODEL"),
            timeout: std::env::var("LLM_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs),
        }
    }

    fn api_key(&self, provider: Provider) -> Option<&String> {
        match provider {
            Provider::OpenAI => self.openai_api_key.as_ref(),
            Provider::Anthropic => self.anthropic_api_key.as_ref(),
            Provider::Gemini => self.google_api_key.as_ref(),
        }
    }

    fn base_url(&self, provider: Provider) -> Option<&String> {
        match provider {
            Provider::OpenAI => self.openai_api_base.as_ref(),
            Provider::Anthropic | Provider::Gemini => None,
        }
    }

    fn default_model(&self, provider: Provider) -> Option<&String> {
        match provider {
            Provider::OpenAI => self.openai_default_model.as_ref(),
            Provider::Anthropic => self.anthropic_default_model.as_ref(),
            Provider::Gemini => self.gemini_default_model.as_ref(),
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// What a provider factory needs to build a service
#[derive(Debug, Clone)]
pub struct Credentials {
    pub client: Client,
    pub api_key: String,
    pub base_url: Option<String>,
}

struct ProviderBinding {
    def: &'static ProviderDef,
    credentials: Credentials,
    default_model: String,
}

/// Public view of a configured provider
#[derive(Debug, Clone, Serialize)]
pub struct ProviderInfo {
    pub id: String,
    pub name: String,
    pub aliases: Vec<String>,
    pub default_model: String,
}

/// Registry of configured providers
pub struct ProviderRegistry {
    bindings: HashMap<Provider, ProviderBinding>,
}

impl ProviderRegistry {
    /// Create an empty registry for testing purposes
    #[allow(dead_code)] // Used in tests
    pub fn new_empty() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    pub fn new(config: &LlmConfig) -> Self {
        let client = Client::builder()
            .timeout(
                config
                    .timeout
                    .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            )
            .build()
            .expect("Failed to create HTTP client");

        let mut bindings = HashMap::new();
        for def in all_providers() {
            // Providers without a key are simply not selectable
            let Some(api_key) = config.api_key(def.provider) else {
                continue;
            };

            bindings.insert(
                def.provider,
                ProviderBinding {
                    def,
                    credentials: Credentials {
                        client: client.clone(),
                        api_key: api_key.clone(),
                        base_url: config.base_url(def.provider).cloned(),
                    },
                    default_model: config
                        .default_model(def.provider)
                        .cloned()
                        .unwrap_or_else(|| def.default_model.to_string()),
                },
            );
        }

        Self { bindings }
    }

    fn binding(&self, selector: &str) -> Option<&ProviderBinding> {
        Provider::from_selector(selector).and_then(|p| self.bindings.get(&p))
    }

    /// Whether `selector` names a configured provider
    pub fn has_provider(&self, selector: &str) -> bool {
        self.binding(selector).is_some()
    }

    /// Build a logged service for `model` on the provider named by `selector`
    pub fn service(&self, selector: &str, model: &str) -> Option<Arc<dyn LlmService>> {
        let binding = self.binding(selector)?;
        let service = (binding.def.factory)(&binding.credentials, model);
        Some(Arc::new(LoggingService::new(service, binding.def.provider)))
    }

    /// Default model for the provider named by `selector`
    pub fn default_model(&self, selector: &str) -> Option<&str> {
        self.binding(selector).map(|b| b.default_model.as_str())
    }

    /// List configured providers in table order
    pub fn available_providers(&self) -> Vec<ProviderInfo> {
        all_providers()
            .iter()
            .filter_map(|def| self.bindings.get(&def.provider))
            .map(|b| ProviderInfo {
                id: b.def.provider.id().to_string(),
                name: b.def.provider.display_name().to_string(),
                aliases: b.def.aliases.iter().map(ToString::to_string).collect(),
                default_model: b.default_model.clone(),
            })
            .collect()
    }

    /// Check if any providers are available
    pub fn has_providers(&self) -> bool {
        !self.bindings.is_empty()
    }
}
