//! Centralized provider definitions
//!
//! Every provider a run can select lives in this table together with the
//! legacy selector aliases (`api1`..`api3`) older clients still send.

use super::registry::Credentials;
use super::{AnthropicService, GeminiService, LlmService, OpenAIService};
use std::sync::Arc;

/// LLM provider enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    OpenAI,
    Anthropic,
    Gemini,
}

impl Provider {
    /// Canonical selector string
    pub fn id(self) -> &'static str {
        match self {
            Provider::OpenAI => "openai",
            Provider::Anthropic => "anthropic",
            Provider::Gemini => "gemini",
        }
    }

    /// Get the display name for this provider
    pub fn display_name(self) -> &'static str {
        match self {
            Provider::OpenAI => "OpenAI-compatible",
            Provider::Anthropic => "Anthropic",
            Provider::Gemini => "Google Gemini",
        }
    }

    /// Get the environment variable name for this provider's API key
    pub fn api_key_env_var(self) -> &'static str {
        match self {
            Provider::OpenAI => "OPENAI_API_KEY",
            Provider::Anthropic => "ANTHROPIC_API_KEY",
            Provider::Gemini => "GOOGLE_API_KEY",
        }
    }

    /// Resolve a selector string (canonical id or alias), case-insensitive.
    pub fn from_selector(selector: &str) -> Option<Self> {
        let selector = selector.trim();
        all_providers()
            .iter()
            .find(|def| {
                def.provider.id().eq_ignore_ascii_case(selector)
                    || def.aliases.iter().any(|a| a.eq_ignore_ascii_case(selector))
            })
            .map(|def| def.provider)
    }
}

/// Provider definition with metadata
#[derive(Debug, Clone)]
pub struct ProviderDef {
    pub provider: Provider,
    /// Legacy selector strings accepted in addition to the canonical id
    pub aliases: &'static [&'static str],
    /// Model used when a request does not name one
    pub default_model: &'static str,
    /// Factory function to create the service for a model name
    pub factory: fn(&Credentials, &str) -> Arc<dyn LlmService>,
}

/// Get all provider definitions
pub fn all_providers() -> &'static [ProviderDef] {
    &[
        ProviderDef {
            provider: Provider::OpenAI,
            aliases: &["api1"],
            default_model: "gpt-4o-mini",
            factory: |creds, model| {
                Arc::new(OpenAIService::new(
                    creds.client.clone(),
                    creds.api_key.clone(),
                    creds.base_url.as_deref(),
                    model,
                ))
            },
        },
        ProviderDef {
            provider: Provider::Anthropic,
            aliases: &["api2"],
            default_model: "claude-sonnet-4-20250514",
            factory: |creds, model| {
                Arc::new(AnthropicService::new(
                    creds.client.clone(),
                    creds.api_key.clone(),
                    creds.base_url.as_deref(),
                    model,
                ))
            },
        },
        ProviderDef {
            provider: Provider::Gemini,
            aliases: &["api3", "google"],
            default_model: "gemini-2.0-flash",
            factory: |creds, model| {
                Arc::new(GeminiService::new(
                    creds.client.clone(),
                    creds.api_key.clone(),
                    creds.base_url.as_deref(),
                    model,
                ))
            },
        },
    ]
}
