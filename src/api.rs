//! HTTP API for the framework workflow

mod handlers;
mod sse;
mod types;

pub use handlers::create_router;
#[allow(unused_imports)] // Public API re-exports
pub use types::*;

use crate::config::WorkflowConfig;
use crate::journal_examples::JournalExamples;
use crate::llm::ProviderRegistry;
use crate::runtime::{ProductionRuntime, RegistryGateway};
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub runtime: Arc<ProductionRuntime>,
    pub registry: Arc<ProviderRegistry>,
}

impl AppState {
    pub fn new(registry: Arc<ProviderRegistry>, config: WorkflowConfig) -> Self {
        let runtime = ProductionRuntime::new(
            RegistryGateway::new(Arc::clone(&registry)),
            JournalExamples::builtin(),
            config,
        );
        Self {
            runtime: Arc::new(runtime),
            registry,
        }
    }
}
