//! Workflow failure types

use crate::llm::LlmError;
use crate::state_machine::{Stage, Transcript};
use thiserror::Error;

/// Why a run stopped without a final framework
#[derive(Debug, Clone, Error)]
pub enum WorkflowError {
    /// Rejected before any gateway call was made
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A stage's gateway call failed. `refinement` is the 1-based index of the
    /// attempted refinement pass and is only set for `Refine`.
    #[error("{stage} stage failed: {source}")]
    Gateway {
        stage: Stage,
        refinement: Option<u32>,
        #[source]
        source: LlmError,
    },

    /// The stream consumer went away before the run finished
    #[error("run cancelled")]
    Cancelled,
}

impl WorkflowError {
    pub fn stage(&self) -> Option<Stage> {
        match self {
            WorkflowError::Gateway { stage, .. } => Some(*stage),
            WorkflowError::InvalidConfiguration(_) | WorkflowError::Cancelled => None,
        }
    }

    pub fn refinement(&self) -> Option<u32> {
        match self {
            WorkflowError::Gateway { refinement, .. } => *refinement,
            WorkflowError::InvalidConfiguration(_) | WorkflowError::Cancelled => None,
        }
    }
}

/// A failed run together with the transcript accumulated before the failure
#[derive(Debug, Clone, Error)]
#[error("{error}")]
pub struct RunFailure {
    #[source]
    pub error: WorkflowError,
    pub transcript: Transcript,
}

impl RunFailure {
    pub fn new(error: WorkflowError, transcript: Transcript) -> Self {
        Self { error, transcript }
    }
}
