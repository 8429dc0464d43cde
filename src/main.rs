//! Paper framework service
//!
//! Drafts the framework section of an academic paper with an LLM, refines it
//! a fixed number of times, then asks for a quality assessment.

mod api;
mod config;
mod journal_examples;
mod llm;
mod prompts;
mod runtime;
mod state_machine;

use api::{create_router, AppState};
use config::{ServerConfig, WorkflowConfig};
use llm::{all_providers, LlmConfig, ProviderRegistry};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "paper_framework=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let server_config = ServerConfig::from_env();
    let workflow_config = WorkflowConfig::from_env();
    tracing::info!(
        default_refinement_loops = workflow_config.default_refinement_loops,
        include_few_shot_examples = workflow_config.include_few_shot_examples,
        max_tokens = workflow_config.max_tokens,
        "Workflow configuration loaded"
    );

    // Initialize provider registry
    let llm_config = LlmConfig::from_env();
    let registry = Arc::new(ProviderRegistry::new(&llm_config));

    if registry.has_providers() {
        tracing::info!(
            providers = ?registry
                .available_providers()
                .iter()
                .map(|p| p.id.as_str())
                .collect::<Vec<_>>(),
            "Provider registry initialized"
        );
    } else {
        let vars: Vec<&str> = all_providers()
            .iter()
            .map(|def| def.provider.api_key_env_var())
            .collect();
        tracing::warn!(
            "No LLM API keys configured. Set one of: {}",
            vars.join(", ")
        );
    }

    let state = AppState::new(registry, workflow_config);

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new()
        .gzip(true)
        .br(true)
        .deflate(true)
        .zstd(true);

    let app = create_router(state)
        .layer(cors)
        .layer(compression)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], server_config.port));
    tracing::info!("Paper framework server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
