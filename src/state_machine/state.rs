//! Session record and transcript types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Workflow stages. `Generate` is initial, `Validate` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Generate,
    Refine,
    Validate,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Generate => "generate",
            Stage::Refine => "refine",
            Stage::Validate => "validate",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Validate)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Speaker of a transcript turn
///
/// Accepts the `user`/`ai` spellings chat frontends send for prior messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[serde(alias = "user")]
    Human,
    #[serde(alias = "ai")]
    Assistant,
}

/// One transcript entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    #[serde(alias = "type")]
    pub role: Role,
    #[serde(alias = "content")]
    pub text: String,
}

impl Turn {
    pub fn human(text: impl Into<String>) -> Self {
        Self {
            role: Role::Human,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

/// Append-only, ordered log of turns
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript(Vec<Turn>);

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the (human, assistant) pair a stage contributes.
    pub fn push_exchange(&mut self, human: impl Into<String>, assistant: impl Into<String>) {
        self.0.push(Turn::human(human));
        self.0.push(Turn::assistant(assistant));
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.0
    }

    pub fn last(&self) -> Option<&Turn> {
        self.0.last()
    }
}

impl From<Vec<Turn>> for Transcript {
    fn from(turns: Vec<Turn>) -> Self {
        Self(turns)
    }
}

/// The unit of work threaded through one workflow run.
///
/// Inputs are fixed at construction; the mutable part is only changed by the
/// stage updates in [`super::transition`], each of which consumes the record
/// and returns the next one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionRecord {
    pub(super) topic: String,
    pub(super) methodology: String,
    pub(super) journal_requirements: String,
    pub(super) max_refinements: u32,
    pub(super) model_selector: String,
    pub(super) provider_selector: String,
    pub(super) current_framework: String,
    pub(super) refinement_count: u32,
    pub(super) final_framework: Option<String>,
    pub(super) transcript: Transcript,
}

impl SessionRecord {
    /// Fresh record with all mutable fields at their initial values.
    pub fn new(inputs: ValidatedInputs, transcript: Transcript) -> Self {
        Self {
            topic: inputs.topic,
            methodology: inputs.methodology,
            journal_requirements: inputs.journal_requirements,
            max_refinements: inputs.max_refinements,
            model_selector: inputs.model_selector,
            provider_selector: inputs.provider_selector,
            current_framework: String::new(),
            refinement_count: 0,
            final_framework: None,
            transcript,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn methodology(&self) -> &str {
        &self.methodology
    }

    pub fn journal_requirements(&self) -> &str {
        &self.journal_requirements
    }

    pub fn max_refinements(&self) -> u32 {
        self.max_refinements
    }

    pub fn model_selector(&self) -> &str {
        &self.model_selector
    }

    pub fn provider_selector(&self) -> &str {
        &self.provider_selector
    }

    pub fn current_framework(&self) -> &str {
        &self.current_framework
    }

    pub fn refinement_count(&self) -> u32 {
        self.refinement_count
    }

    pub fn final_framework(&self) -> Option<&str> {
        self.final_framework.as_deref()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn into_transcript(self) -> Transcript {
        self.transcript
    }

    /// Whether another refinement pass is allowed
    pub fn can_refine(&self) -> bool {
        self.refinement_count < self.max_refinements
    }
}

/// Session inputs as supplied by a caller, before validation.
#[derive(Debug, Clone, Default)]
pub struct SessionInputs {
    pub topic: String,
    pub methodology: String,
    pub journal_requirements: String,
    pub max_refinements: i64,
    pub model_selector: String,
    pub provider_selector: String,
    pub initial_transcript: Transcript,
}

/// Inputs that passed configuration checks
#[derive(Debug, Clone)]
pub struct ValidatedInputs {
    pub topic: String,
    pub methodology: String,
    pub journal_requirements: String,
    pub max_refinements: u32,
    pub model_selector: String,
    pub provider_selector: String,
}

/// Coarse refinement budget offered by the web form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effort {
    Low,
    Medium,
    High,
}

impl Effort {
    pub fn refinement_loops(self) -> u32 {
        match self {
            Effort::Low => 1,
            Effort::Medium => 2,
            Effort::High => 3,
        }
    }
}
