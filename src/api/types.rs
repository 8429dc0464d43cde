//! API request and response types

use crate::config::WorkflowConfig;
use crate::llm::{ProviderInfo, ProviderRegistry};
use crate::runtime::RunOutput;
use crate::state_machine::{Effort, SessionInputs, Stage, Transcript};
use serde::{Deserialize, Serialize};

/// Provider selector used when a request does not name one
pub const DEFAULT_API_CONFIG: &str = "api1";

fn default_api_config() -> String {
    DEFAULT_API_CONFIG.to_string()
}

/// Body of `/paper-framework/invoke` and `/paper-framework/stream`
#[derive(Debug, Clone, Deserialize)]
pub struct FrameworkRequest {
    /// Prior conversation, kept ahead of the workflow's own turns
    #[serde(default)]
    pub messages: Transcript,
    pub paper_topic: String,
    pub methodology: String,
    pub journal_requirements: String,
    /// Exact number of refinement passes; wins over `effort`
    #[serde(default)]
    pub framework_refinement_loops: Option<i64>,
    #[serde(default)]
    pub effort: Option<Effort>,
    /// Empty or missing means the provider's default model
    #[serde(default)]
    pub framework_model: Option<String>,
    #[serde(default = "default_api_config")]
    pub api_config: String,
}

impl FrameworkRequest {
    /// Resolve request defaults into workflow inputs.
    ///
    /// Nothing is validated here; the runtime rejects bad values.
    pub fn into_inputs(self, registry: &ProviderRegistry, config: &WorkflowConfig) -> SessionInputs {
        let max_refinements = self
            .framework_refinement_loops
            .or_else(|| self.effort.map(|e| i64::from(e.refinement_loops())))
            .unwrap_or_else(|| i64::from(config.default_refinement_loops));

        let model_selector = self
            .framework_model
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .or_else(|| registry.default_model(&self.api_config).map(str::to_string))
            .unwrap_or_default();

        SessionInputs {
            topic: self.paper_topic,
            methodology: self.methodology,
            journal_requirements: self.journal_requirements,
            max_refinements,
            model_selector,
            provider_selector: self.api_config,
            initial_transcript: self.messages,
        }
    }
}

/// Response of `/paper-framework/invoke`
#[derive(Debug, Serialize)]
pub struct FrameworkResponse {
    pub messages: Transcript,
    pub final_framework: String,
    pub refinement_count: u32,
}

impl From<RunOutput> for FrameworkResponse {
    fn from(output: RunOutput) -> Self {
        Self {
            messages: output.transcript,
            final_framework: output.final_framework,
            refinement_count: output.refinement_count,
        }
    }
}

/// Response of `/`
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub message: &'static str,
}

/// Response for provider list
#[derive(Debug, Serialize)]
pub struct ProvidersResponse {
    pub providers: Vec<ProviderInfo>,
}

/// Response for journal list
#[derive(Debug, Serialize)]
pub struct JournalsResponse {
    pub journals: Vec<String>,
}

/// Request to probe a provider
#[derive(Debug, Deserialize)]
pub struct ProviderCheckRequest {
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
}

/// Result of a provider probe
#[derive(Debug, Serialize)]
pub struct ProviderCheckResponse {
    pub ok: bool,
    pub provider: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refinement: Option<u32>,
    /// Transcript accumulated before the failure
    #[serde(skip_serializing_if = "Transcript::is_empty")]
    pub messages: Transcript,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            stage: None,
            refinement: None,
            messages: Transcript::new(),
        }
    }
}
