//! LLM provider abstraction
//!
//! Provides a common interface for the chat-completion providers a workflow
//! run can be bound to.

mod anthropic;
mod error;
mod gemini;
mod openai;
mod provider;
mod registry;
mod types;


pub use anthropic::AnthropicService;
pub use error::{LlmError, LlmErrorKind};
pub use gemini::GeminiService;
pub use openai::OpenAIService;
pub use provider::{all_providers, Provider, ProviderDef};
pub use registry::{LlmConfig, ProviderInfo, ProviderRegistry};
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for LLM providers
#[async_trait]
pub trait LlmService: Send + Sync {
    /// Make a completion request
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError>;

    /// Get the model name sent to the provider
    fn model_id(&self) -> &str;
}

/// Logging wrapper for LLM services
pub struct LoggingService {
    inner: Arc<dyn LlmService>,
    provider: Provider,
    model_id: String,
}

impl LoggingService {
    pub fn new(inner: Arc<dyn LlmService>, provider: Provider) -> Self {
        let model_id = inner.model_id().to_string();
        Self {
            inner,
            provider,
            model_id,
        }
    }
}

#[async_trait]
impl LlmService for LoggingService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let start = std::time::Instant::now();
        let result = self.inner.complete(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(response) => {
                tracing::info!(
                    provider = %self.provider.id(),
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    input_tokens = response.usage.input_tokens,
                    output_tokens = response.usage.output_tokens,
                    end_turn = response.end_turn,
                    "LLM request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    provider = %self.provider.id(),
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    kind = %e.kind,
                    retryable = e.kind.is_retryable(),
                    retry_after = ?e.retry_after,
                    "LLM request failed"
                );
            }
        }

        result
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
