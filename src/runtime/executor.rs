//! Framework workflow executor
//!
//! Drives the state machine from `Generate` to `Validate`, performing one
//! gateway call per stage. `run` and `stream` share the same driver; streaming
//! only adds event emission on top.

use super::error::{RunFailure, WorkflowError};
use super::traits::{ExampleSource, LlmGateway};
use crate::config::WorkflowConfig;
use crate::llm::LlmRequest;
use crate::prompts;
use crate::state_machine::{
    next_stage, transition, SessionInputs, SessionRecord, Stage, StageOutcome, Transcript, Turn,
    ValidatedInputs,
};
use futures::Stream;
use serde::Serialize;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::Instrument;
use uuid::Uuid;

/// Events buffered between the driver task and a slow consumer
const STREAM_BUFFER: usize = 16;

/// Result of a successful run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunOutput {
    pub transcript: Transcript,
    pub final_framework: String,
    pub refinement_count: u32,
}

impl RunOutput {
    fn from_record(record: SessionRecord) -> Self {
        let final_framework = record
            .final_framework()
            .unwrap_or(record.current_framework())
            .to_string();
        let refinement_count = record.refinement_count();
        Self {
            transcript: record.into_transcript(),
            final_framework,
            refinement_count,
        }
    }
}

/// Record fields visible after a stage completes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageSnapshot {
    pub current_framework: String,
    pub refinement_count: u32,
    pub final_framework: Option<String>,
    pub transcript: Transcript,
}

impl From<&SessionRecord> for StageSnapshot {
    fn from(record: &SessionRecord) -> Self {
        Self {
            current_framework: record.current_framework().to_string(),
            refinement_count: record.refinement_count(),
            final_framework: record.final_framework().map(str::to_string),
            transcript: record.transcript().clone(),
        }
    }
}

/// Items yielded by [`FrameworkStream`], in execution order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// A newly appended assistant turn
    Message { stage: Stage, turn: Turn },
    /// A stage finished; carries the record as it stands afterwards
    StageComplete { stage: Stage, snapshot: StageSnapshot },
    /// The run failed; always the last event
    Error {
        stage: Option<Stage>,
        refinement: Option<u32>,
        message: String,
        transcript: Transcript,
    },
}

impl StreamEvent {
    pub fn name(&self) -> &'static str {
        match self {
            StreamEvent::Message { .. } => "message",
            StreamEvent::StageComplete { .. } => "stage_complete",
            StreamEvent::Error { .. } => "error",
        }
    }

    fn from_failure(failure: RunFailure) -> Self {
        StreamEvent::Error {
            stage: failure.error.stage(),
            refinement: failure.error.refinement(),
            message: failure.error.to_string(),
            transcript: failure.transcript,
        }
    }
}

/// One-shot stream of a single run's events.
///
/// Dropping it cancels the run: no further gateway calls are issued, and a
/// call already in flight is allowed to finish and is discarded.
pub struct FrameworkStream {
    inner: ReceiverStream<StreamEvent>,
    _cancel: DropGuard,
}

impl Stream for FrameworkStream {
    type Item = StreamEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.get_mut().inner).poll_next(cx)
    }
}

/// Generic workflow runtime over any gateway and example source
pub struct FrameworkRuntime<G, E>
where
    G: LlmGateway + 'static,
    E: ExampleSource + 'static,
{
    gateway: Arc<G>,
    examples: Arc<E>,
    config: WorkflowConfig,
}

impl<G, E> Clone for FrameworkRuntime<G, E>
where
    G: LlmGateway + 'static,
    E: ExampleSource + 'static,
{
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            examples: Arc::clone(&self.examples),
            config: self.config.clone(),
        }
    }
}

impl<G, E> FrameworkRuntime<G, E>
where
    G: LlmGateway + 'static,
    E: ExampleSource + 'static,
{
    pub fn new(gateway: G, examples: E, config: WorkflowConfig) -> Self {
        Self {
            gateway: Arc::new(gateway),
            examples: Arc::new(examples),
            config,
        }
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    pub fn examples(&self) -> &E {
        &self.examples
    }

    /// Check caller-supplied inputs before any gateway call.
    pub fn validate(&self, inputs: &SessionInputs) -> Result<ValidatedInputs, WorkflowError> {
        if inputs.max_refinements < 0 {
            return Err(WorkflowError::InvalidConfiguration(format!(
                "max_refinements must not be negative (got {})",
                inputs.max_refinements
            )));
        }
        let max_refinements = u32::try_from(inputs.max_refinements).map_err(|_| {
            WorkflowError::InvalidConfiguration(format!(
                "max_refinements is too large (got {})",
                inputs.max_refinements
            ))
        })?;

        let provider = inputs.provider_selector.trim();
        if !self.gateway.has_provider(provider) {
            return Err(WorkflowError::InvalidConfiguration(format!(
                "unknown provider selector: {provider:?}"
            )));
        }

        let model = inputs.model_selector.trim();
        if model.is_empty() {
            return Err(WorkflowError::InvalidConfiguration(
                "model selector is empty".to_string(),
            ));
        }

        Ok(ValidatedInputs {
            topic: inputs.topic.clone(),
            methodology: inputs.methodology.clone(),
            journal_requirements: inputs.journal_requirements.clone(),
            max_refinements,
            model_selector: model.to_string(),
            provider_selector: provider.to_string(),
        })
    }

    /// Drive the workflow to completion without yielding intermediate results.
    pub async fn run(&self, inputs: SessionInputs) -> Result<RunOutput, RunFailure> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("framework_run", %run_id, mode = "invoke");

        async move {
            let record = self.prepare(inputs)?;
            let record = self.drive(record, None, &CancellationToken::new()).await?;
            tracing::info!(
                refinement_count = record.refinement_count(),
                transcript_len = record.transcript().len(),
                "Framework run finished"
            );
            Ok(RunOutput::from_record(record))
        }
        .instrument(span)
        .await
    }

    /// Start the workflow on a background task and return its event stream.
    pub fn stream(&self, inputs: SessionInputs) -> FrameworkStream {
        let (tx, rx) = mpsc::channel(STREAM_BUFFER);
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let runtime = self.clone();
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("framework_run", %run_id, mode = "stream");

        tokio::spawn(
            async move {
                let result = match runtime.prepare(inputs) {
                    Ok(record) => runtime.drive(record, Some(&tx), &token).await,
                    Err(failure) => Err(failure),
                };
                match result {
                    Ok(record) => tracing::info!(
                        refinement_count = record.refinement_count(),
                        "Framework stream finished"
                    ),
                    Err(failure) if matches!(failure.error, WorkflowError::Cancelled) => {
                        tracing::info!("Framework stream abandoned by consumer");
                    }
                    Err(failure) => {
                        let _ = tx.send(StreamEvent::from_failure(failure)).await;
                    }
                }
            }
            .instrument(span),
        );

        FrameworkStream {
            inner: ReceiverStream::new(rx),
            _cancel: cancel.drop_guard(),
        }
    }

    /// Run a single stage against `record` and return the updated record.
    ///
    /// `Refine` on an exhausted record returns it unchanged without calling
    /// the gateway.
    pub async fn run_stage(
        &self,
        stage: Stage,
        record: SessionRecord,
    ) -> Result<SessionRecord, WorkflowError> {
        match self.request_completion(stage, &record).await? {
            Some(outcome) => Ok(crate::state_machine::apply(record, outcome)),
            None => Ok(record),
        }
    }

    fn prepare(&self, inputs: SessionInputs) -> Result<SessionRecord, RunFailure> {
        match self.validate(&inputs) {
            Ok(validated) => Ok(SessionRecord::new(validated, inputs.initial_transcript)),
            Err(error) => {
                tracing::warn!(error = %error, "Rejected workflow inputs");
                Err(RunFailure::new(error, inputs.initial_transcript))
            }
        }
    }

    async fn request_completion(
        &self,
        stage: Stage,
        record: &SessionRecord,
    ) -> Result<Option<StageOutcome>, WorkflowError> {
        if stage == Stage::Refine && !record.can_refine() {
            tracing::debug!(
                refinement_count = record.refinement_count(),
                "Refinement budget exhausted, skipping"
            );
            return Ok(None);
        }

        let examples = if self.config.include_few_shot_examples {
            self.examples.lookup(record.journal_requirements())
        } else {
            None
        };
        let prompt = prompts::render(stage, record, examples.as_deref());
        let request = LlmRequest::prompt(prompt.system, prompt.human)
            .with_temperature(self.config.temperature)
            .with_max_tokens(self.config.max_tokens);

        let refinement = (stage == Stage::Refine).then(|| record.refinement_count() + 1);
        tracing::info!(
            stage = %stage,
            refinement,
            provider = record.provider_selector(),
            model = record.model_selector(),
            "Requesting completion"
        );

        let completion = self
            .gateway
            .complete(record.provider_selector(), record.model_selector(), &request)
            .await
            .map_err(|source| {
                tracing::warn!(stage = %stage, refinement, error = %source, "Stage failed");
                WorkflowError::Gateway {
                    stage,
                    refinement,
                    source,
                }
            })?;

        Ok(Some(StageOutcome {
            stage,
            summary: prompts::transcript_summary(stage, record),
            completion,
        }))
    }

    async fn drive(
        &self,
        mut record: SessionRecord,
        events: Option<&mpsc::Sender<StreamEvent>>,
        cancel: &CancellationToken,
    ) -> Result<SessionRecord, RunFailure> {
        let mut next = Some(Stage::Generate);

        while let Some(stage) = next {
            if cancel.is_cancelled() {
                return Err(RunFailure::new(
                    WorkflowError::Cancelled,
                    record.into_transcript(),
                ));
            }

            let outcome = match self.request_completion(stage, &record).await {
                Ok(Some(outcome)) => outcome,
                Ok(None) => {
                    next = next_stage(stage, record.refinement_count(), record.max_refinements());
                    continue;
                }
                Err(error) => return Err(RunFailure::new(error, record.into_transcript())),
            };

            let result = transition(record, outcome);
            record = result.record;
            next = result.next;
            tracing::info!(
                stage = %stage,
                refinement_count = record.refinement_count(),
                "Stage complete"
            );

            if let Some(tx) = events {
                if !emit(tx, stage, &record).await {
                    return Err(RunFailure::new(
                        WorkflowError::Cancelled,
                        record.into_transcript(),
                    ));
                }
            }
        }

        Ok(record)
    }
}

/// Send the `Message` and `StageComplete` events for a finished stage.
/// Returns `false` once the consumer has hung up.
async fn emit(tx: &mpsc::Sender<StreamEvent>, stage: Stage, record: &SessionRecord) -> bool {
    if let Some(turn) = record.transcript().last() {
        let message = StreamEvent::Message {
            stage,
            turn: turn.clone(),
        };
        if tx.send(message).await.is_err() {
            return false;
        }
    }
    tx.send(StreamEvent::StageComplete {
        stage,
        snapshot: StageSnapshot::from(record),
    })
    .await
    .is_ok()
}
