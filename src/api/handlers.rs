//! HTTP request handlers

use super::sse::sse_stream;
use super::types::{
    ErrorResponse, FrameworkRequest, FrameworkResponse, JournalsResponse, ProviderCheckRequest,
    ProviderCheckResponse, ProvidersResponse, StatusResponse,
};
use super::AppState;
use crate::llm::LlmRequest;
use crate::runtime::{RunFailure, WorkflowError};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

const PROBE_SYSTEM: &str = "You are a connectivity check. Answer as briefly as possible.";
const PROBE_PROMPT: &str = "Reply with the single word: ok";
const PROBE_MAX_TOKENS: u32 = 16;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        // Workflow entry points
        .route("/paper-framework/invoke", post(invoke_framework))
        .route("/paper-framework/stream", post(stream_framework))
        // Provider and journal info
        .route("/api/providers", get(list_providers))
        .route("/api/providers/check", post(check_provider))
        .route("/api/journals", get(list_journals))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

async fn root() -> Json<StatusResponse> {
    Json(StatusResponse {
        message: "Paper Framework API is running",
    })
}

// ============================================================
// Workflow
// ============================================================

async fn invoke_framework(
    State(state): State<AppState>,
    Json(req): Json<FrameworkRequest>,
) -> Result<Json<FrameworkResponse>, AppError> {
    let inputs = req.into_inputs(&state.registry, state.runtime.config());
    let output = state.runtime.run(inputs).await?;
    Ok(Json(output.into()))
}

async fn stream_framework(
    State(state): State<AppState>,
    Json(req): Json<FrameworkRequest>,
) -> impl IntoResponse {
    let inputs = req.into_inputs(&state.registry, state.runtime.config());
    sse_stream(state.runtime.stream(inputs))
}

// ============================================================
// Providers and journals
// ============================================================

async fn list_providers(State(state): State<AppState>) -> Json<ProvidersResponse> {
    Json(ProvidersResponse {
        providers: state.registry.available_providers(),
    })
}

async fn list_journals(State(state): State<AppState>) -> Json<JournalsResponse> {
    Json(JournalsResponse {
        journals: state
            .runtime
            .examples()
            .journals()
            .into_iter()
            .map(str::to_string)
            .collect(),
    })
}

/// Send a one-line prompt to a provider and report whether it answered
async fn check_provider(
    State(state): State<AppState>,
    Json(req): Json<ProviderCheckRequest>,
) -> Result<Json<ProviderCheckResponse>, AppError> {
    let model = req
        .model
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
        .or_else(|| state.registry.default_model(&req.provider).map(str::to_string))
        .ok_or_else(|| {
            AppError::BadRequest(format!("Provider not configured: {}", req.provider))
        })?;

    let service = state.registry.service(&req.provider, &model).ok_or_else(|| {
        AppError::BadRequest(format!("Provider not configured: {}", req.provider))
    })?;

    let request = LlmRequest::prompt(PROBE_SYSTEM, PROBE_PROMPT).with_max_tokens(PROBE_MAX_TOKENS);
    let response = match service.complete(&request).await {
        Ok(response) => ProviderCheckResponse {
            ok: true,
            provider: req.provider,
            model,
            response: Some(response.text),
            error: None,
        },
        Err(e) => {
            tracing::warn!(provider = %req.provider, model = %model, error = %e, "Provider check failed");
            ProviderCheckResponse {
                ok: false,
                provider: req.provider,
                model,
                response: None,
                error: Some(format!("{}: {}", e.kind, e.message)),
            }
        }
    };
    Ok(Json(response))
}

async fn get_version() -> &'static str {
    concat!("paper-framework ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

enum AppError {
    BadRequest(String),
    Workflow(RunFailure),
}

impl From<RunFailure> for AppError {
    fn from(failure: RunFailure) -> Self {
        AppError::Workflow(failure)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorResponse::new(msg)),
            AppError::Workflow(failure) => {
                let status = match failure.error {
                    WorkflowError::InvalidConfiguration(_) => StatusCode::BAD_REQUEST,
                    WorkflowError::Gateway { .. } => StatusCode::BAD_GATEWAY,
                    WorkflowError::Cancelled => StatusCode::INTERNAL_SERVER_ERROR,
                };
                let body = ErrorResponse {
                    error: failure.error.to_string(),
                    stage: failure.error.stage(),
                    refinement: failure.error.refinement(),
                    messages: failure.transcript,
                };
                (status, body)
            }
        };

        (status, Json(body)).into_response()
    }
}
