//! Trait abstractions for runtime I/O
//!
//! The executor only talks to the outside world through these two traits, so
//! it can be driven by mocks in tests.

use crate::journal_examples::JournalExamples;
use crate::llm::{LlmError, LlmRequest, ProviderRegistry};
use async_trait::async_trait;
use std::sync::Arc;

/// Sends one prompt to a named provider/model and returns the completion text
#[async_trait]
pub trait LlmGateway: Send + Sync {
    async fn complete(
        &self,
        provider: &str,
        model: &str,
        request: &LlmRequest,
    ) -> Result<String, LlmError>;

    /// Whether `provider` names a configured binding
    fn has_provider(&self, provider: &str) -> bool;
}

/// Few-shot example lookup by journal identifier
pub trait ExampleSource: Send + Sync {
    /// Never fails; a miss is `None`
    fn lookup(&self, journal: &str) -> Option<String>;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: LlmGateway + ?Sized> LlmGateway for Arc<T> {
    async fn complete(
        &self,
        provider: &str,
        model: &str,
        request: &LlmRequest,
    ) -> Result<String, LlmError> {
        (**self).complete(provider, model, request).await
    }

    fn has_provider(&self, provider: &str) -> bool {
        (**self).has_provider(provider)
    }
}

impl<T: ExampleSource + ?Sized> ExampleSource for Arc<T> {
    fn lookup(&self, journal: &str) -> Option<String> {
        (**self).lookup(journal)
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

/// Adapter to use `ProviderRegistry` as `LlmGateway`
pub struct RegistryGateway {
    registry: Arc<ProviderRegistry>,
}

impl RegistryGateway {
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl LlmGateway for RegistryGateway {
    async fn complete(
        &self,
        provider: &str,
        model: &str,
        request: &LlmRequest,
    ) -> Result<String, LlmError> {
        let llm = self.registry.service(provider, model).ok_or_else(|| {
            LlmError::invalid_request(format!("Provider not configured: {provider}"))
        })?;
        Ok(llm.complete(request).await?.text)
    }

    fn has_provider(&self, provider: &str) -> bool {
        self.registry.has_provider(provider)
    }
}

impl ExampleSource for JournalExamples {
    fn lookup(&self, journal: &str) -> Option<String> {
        JournalExamples::lookup(self, journal).map(str::to_string)
    }
}
