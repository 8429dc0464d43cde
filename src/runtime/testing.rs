//! Mock implementations for testing
//!
//! These mocks let the executor run end to end without real I/O.

use super::traits::{ExampleSource, LlmGateway};
use crate::llm::{LlmError, LlmRequest};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

// ============================================================================
// Mock Gateway
// ============================================================================

/// One recorded gateway call
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub provider: String,
    pub model: String,
    pub request: LlmRequest,
}

/// Gateway that returns queued completions in order
pub struct MockGateway {
    responses: Mutex<VecDeque<Result<String, LlmError>>>,
    providers: HashSet<String>,
    /// Record of all calls made
    pub calls: Mutex<Vec<RecordedCall>>,
}

impl MockGateway {
    /// Gateway that only knows the `mock` provider
    pub fn new() -> Self {
        Self::with_providers(["mock"])
    }

    pub fn with_providers<'a>(providers: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            providers: providers.into_iter().map(str::to_string).collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful completion
    pub fn queue_response(&self, text: impl Into<String>) {
        self.responses.lock().unwrap().push_back(Ok(text.into()));
    }

    /// Queue a failure
    pub fn queue_error(&self, error: LlmError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn recorded_calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record_and_pop(
        &self,
        provider: &str,
        model: &str,
        request: &LlmRequest,
    ) -> Result<String, LlmError> {
        self.calls.lock().unwrap().push(RecordedCall {
            provider: provider.to_string(),
            model: model.to_string(),
            request: request.clone(),
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("No mock response queued")))
    }
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmGateway for MockGateway {
    async fn complete(
        &self,
        provider: &str,
        model: &str,
        request: &LlmRequest,
    ) -> Result<String, LlmError> {
        self.record_and_pop(provider, model, request)
    }

    fn has_provider(&self, provider: &str) -> bool {
        self.providers.contains(provider)
    }
}

// ============================================================================
// Delayed Mock Gateway (for cancellation testing)
// ============================================================================

/// Mock gateway whose calls take `delay` to complete
pub struct DelayedMockGateway {
    inner: MockGateway,
    delay: Duration,
}

impl DelayedMockGateway {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: MockGateway::new(),
            delay,
        }
    }

    pub fn queue_response(&self, text: impl Into<String>) {
        self.inner.queue_response(text);
    }

    pub fn call_count(&self) -> usize {
        self.inner.call_count()
    }
}

#[async_trait]
impl LlmGateway for DelayedMockGateway {
    async fn complete(
        &self,
        provider: &str,
        model: &str,
        request: &LlmRequest,
    ) -> Result<String, LlmError> {
        // Record before sleeping so an in-flight call is visible to the test
        self.inner.calls.lock().unwrap().push(RecordedCall {
            provider: provider.to_string(),
            model: model.to_string(),
            request: request.clone(),
        });
        tokio::time::sleep(self.delay).await;
        self.inner
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("No mock response queued")))
    }

    fn has_provider(&self, provider: &str) -> bool {
        self.inner.has_provider(provider)
    }
}

// ============================================================================
// Static Example Source
// ============================================================================

/// Example source with fixed entries that counts lookups
#[derive(Default)]
pub struct StaticExamples {
    entries: HashMap<String, String>,
    lookups: AtomicUsize,
}

impl StaticExamples {
    pub fn with_entry(mut self, journal: &str, text: &str) -> Self {
        self.entries.insert(journal.to_string(), text.to_string());
        self
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl ExampleSource for StaticExamples {
    fn lookup(&self, journal: &str) -> Option<String> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.entries.get(journal.trim()).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorkflowConfig;
    use crate::llm::LlmErrorKind;
    use crate::runtime::{FrameworkRuntime, StreamEvent, WorkflowError};
    use crate::state_machine::{
        Role, SessionInputs, SessionRecord, Stage, Transcript, Turn, ValidatedInputs,
    };
    use futures::StreamExt;
    use std::sync::Arc;

    type TestRuntime = FrameworkRuntime<Arc<MockGateway>, Arc<StaticExamples>>;

    fn inputs(max_refinements: i64) -> SessionInputs {
        SessionInputs {
            topic: "X".to_string(),
            methodology: "Y".to_string(),
            journal_requirements: "Unknown".to_string(),
            max_refinements,
            model_selector: "test-model".to_string(),
            provider_selector: "mock".to_string(),
            initial_transcript: Transcript::new(),
        }
    }

    fn runtime_with(
        gateway: &Arc<MockGateway>,
        examples: &Arc<StaticExamples>,
        config: WorkflowConfig,
    ) -> TestRuntime {
        FrameworkRuntime::new(Arc::clone(gateway), Arc::clone(examples), config)
    }

    fn runtime(gateway: &Arc<MockGateway>) -> TestRuntime {
        runtime_with(
            gateway,
            &Arc::new(StaticExamples::default()),
            WorkflowConfig::default(),
        )
    }

    /// Gateway answering Generate, `n` Refines and Validate
    fn scripted_gateway(n: usize) -> Arc<MockGateway> {
        let gateway = Arc::new(MockGateway::new());
        gateway.queue_response("draft");
        for i in 1..=n {
            gateway.queue_response(format!("refined {i}"));
        }
        gateway.queue_response("assessment");
        gateway
    }

    #[tokio::test]
    async fn test_mock_gateway_empty_queue() {
        let gateway = MockGateway::new();
        let err = gateway
            .complete("mock", "m", &LlmRequest::prompt("s", "u"))
            .await
            .unwrap_err();
        assert!(err.message.contains("No mock response queued"));
        assert_eq!(gateway.call_count(), 1);
    }

    #[tokio::test]
    async fn test_zero_refinements_goes_straight_to_validate() {
        let gateway = scripted_gateway(0);
        let output = runtime(&gateway).run(inputs(0)).await.unwrap();

        assert_eq!(output.refinement_count, 0);
        assert_eq!(output.final_framework, "draft");
        assert_eq!(output.transcript.len(), 4);
        assert_eq!(output.transcript.turns()[1], Turn::assistant("draft"));
        assert_eq!(output.transcript.turns()[3], Turn::assistant("assessment"));
        assert_eq!(gateway.call_count(), 2);
    }

    #[tokio::test]
    async fn test_two_refinements_in_order() {
        let gateway = scripted_gateway(2);
        let events: Vec<StreamEvent> = runtime(&gateway).stream(inputs(2)).collect().await;

        let completed: Vec<(Stage, u32)> = events
            .iter()
            .filter_map(|e| match e {
                StreamEvent::StageComplete { stage, snapshot } => {
                    Some((*stage, snapshot.refinement_count))
                }
                _ => None,
            })
            .collect();
        assert_eq!(
            completed,
            vec![
                (Stage::Generate, 0),
                (Stage::Refine, 1),
                (Stage::Refine, 2),
                (Stage::Validate, 2),
            ]
        );
        assert!(matches!(
            events.last(),
            Some(StreamEvent::StageComplete {
                stage: Stage::Validate,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_gateway_failure_on_second_refine() {
        let gateway = Arc::new(MockGateway::new());
        gateway.queue_response("draft");
        gateway.queue_response("refined 1");
        gateway.queue_error(LlmError::server_error("upstream unavailable"));

        let failure = runtime(&gateway).run(inputs(3)).await.unwrap_err();

        match &failure.error {
            WorkflowError::Gateway {
                stage,
                refinement,
                source,
            } => {
                assert_eq!(*stage, Stage::Refine);
                assert_eq!(*refinement, Some(2));
                assert_eq!(source.kind, LlmErrorKind::ServerError);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(failure.transcript.len(), 4);
        assert!(failure
            .transcript
            .turns()
            .iter()
            .all(|t| t.text != "assessment"));
        assert_eq!(gateway.call_count(), 3);
    }

    #[tokio::test]
    async fn test_call_count_and_transcript_length_for_each_bound() {
        for n in 0..5 {
            let gateway = scripted_gateway(n);
            let output = runtime(&gateway)
                .run(inputs(i64::try_from(n).unwrap()))
                .await
                .unwrap();

            assert_eq!(gateway.call_count(), n + 2);
            assert_eq!(output.transcript.len(), 2 * (n + 2));
            assert_eq!(output.refinement_count, u32::try_from(n).unwrap());
            let expected = if n == 0 {
                "draft".to_string()
            } else {
                format!("refined {n}")
            };
            assert_eq!(output.final_framework, expected);
            for (i, turn) in output.transcript.turns().iter().enumerate() {
                let role = if i % 2 == 0 { Role::Human } else { Role::Assistant };
                assert_eq!(turn.role, role);
            }
        }
    }

    #[tokio::test]
    async fn test_stream_matches_run() {
        let run_output = runtime(&scripted_gateway(2)).run(inputs(2)).await.unwrap();
        let events: Vec<StreamEvent> = runtime(&scripted_gateway(2))
            .stream(inputs(2))
            .collect()
            .await;

        let Some(StreamEvent::StageComplete { snapshot, .. }) = events.last() else {
            panic!("stream did not end with a stage completion");
        };
        assert_eq!(snapshot.transcript, run_output.transcript);
        assert_eq!(
            snapshot.final_framework.as_deref(),
            Some(run_output.final_framework.as_str())
        );
        assert_eq!(snapshot.refinement_count, run_output.refinement_count);

        // One message per assistant turn, each preceding its stage completion
        let messages: Vec<&Turn> = events
            .iter()
            .filter_map(|e| match e {
                StreamEvent::Message { turn, .. } => Some(turn),
                _ => None,
            })
            .collect();
        let assistant_turns: Vec<&Turn> = run_output
            .transcript
            .turns()
            .iter()
            .filter(|t| t.role == Role::Assistant)
            .collect();
        assert_eq!(messages, assistant_turns);
        assert!(matches!(events[0], StreamEvent::Message { stage: Stage::Generate, .. }));
        assert!(matches!(
            events[1],
            StreamEvent::StageComplete {
                stage: Stage::Generate,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_stream_failure_ends_with_error_event() {
        let gateway = Arc::new(MockGateway::new());
        gateway.queue_response("draft");
        gateway.queue_error(LlmError::rate_limit("quota exceeded"));

        let events: Vec<StreamEvent> = runtime(&gateway).stream(inputs(2)).collect().await;

        assert_eq!(events.len(), 3);
        match events.last() {
            Some(StreamEvent::Error {
                stage,
                refinement,
                message,
                transcript,
            }) => {
                assert_eq!(*stage, Some(Stage::Refine));
                assert_eq!(*refinement, Some(1));
                assert!(message.contains("quota exceeded"));
                assert_eq!(transcript.len(), 2);
            }
            other => panic!("expected error event, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_configuration_makes_no_calls() {
        let gateway = scripted_gateway(2);
        let runtime = runtime(&gateway);

        let mut negative = inputs(-1);
        negative.initial_transcript = Transcript::from(vec![Turn::human("hi")]);
        let failure = runtime.run(negative).await.unwrap_err();
        assert!(matches!(
            failure.error,
            WorkflowError::InvalidConfiguration(_)
        ));
        assert_eq!(failure.transcript.len(), 1);

        let mut empty_model = inputs(1);
        empty_model.model_selector = "  ".to_string();
        assert!(matches!(
            runtime.run(empty_model).await.unwrap_err().error,
            WorkflowError::InvalidConfiguration(_)
        ));

        let mut unknown_provider = inputs(1);
        unknown_provider.provider_selector = "api9".to_string();
        let err = runtime.run(unknown_provider).await.unwrap_err().error;
        assert!(err.to_string().contains("api9"));

        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn test_stream_invalid_configuration_single_error() {
        let gateway = scripted_gateway(0);
        let events: Vec<StreamEvent> = runtime(&gateway).stream(inputs(-3)).collect().await;

        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            StreamEvent::Error { stage: None, refinement: None, message, .. }
                if message.contains("negative")
        ));
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn test_dropping_stream_stops_further_calls() {
        let gateway = Arc::new(DelayedMockGateway::new(Duration::from_millis(50)));
        for _ in 0..5 {
            gateway.queue_response("framework");
        }
        let runtime = FrameworkRuntime::new(
            Arc::clone(&gateway),
            StaticExamples::default(),
            WorkflowConfig::default(),
        );

        let mut stream = runtime.stream(inputs(3));
        let first = stream.next().await.unwrap();
        assert!(matches!(
            first,
            StreamEvent::Message {
                stage: Stage::Generate,
                ..
            }
        ));
        drop(stream);

        // A full run would make five calls
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(gateway.call_count() <= 2);
    }

    #[tokio::test]
    async fn test_initial_transcript_preserved() {
        let gateway = scripted_gateway(1);
        let prior = vec![Turn::human("earlier question"), Turn::assistant("earlier answer")];
        let mut request = inputs(1);
        request.initial_transcript = Transcript::from(prior.clone());

        let output = runtime(&gateway).run(request).await.unwrap();

        assert_eq!(output.transcript.len(), 2 + 2 * 3);
        assert_eq!(&output.transcript.turns()[..2], prior.as_slice());
        assert_eq!(output.transcript.turns()[3], Turn::assistant("draft"));
    }

    #[tokio::test]
    async fn test_examples_rendered_into_every_stage() {
        let gateway = scripted_gateway(1);
        let examples = Arc::new(StaticExamples::default().with_entry("Unknown", "1. Theory\n2. Model"));
        let output = runtime_with(&gateway, &examples, WorkflowConfig::default())
            .run(inputs(1))
            .await
            .unwrap();

        assert_eq!(output.refinement_count, 1);
        assert_eq!(examples.lookup_count(), 3);
        for call in gateway.recorded_calls() {
            assert!(call.request.system_text().contains("1. Theory\n2. Model"));
            assert_eq!(call.provider, "mock");
            assert_eq!(call.model, "test-model");
            assert_eq!(call.request.max_tokens, Some(4096));
            let temperature = call.request.temperature.unwrap();
            assert!((temperature - 0.7).abs() < f32::EPSILON);
        }
    }

    #[tokio::test]
    async fn test_few_shot_disabled_skips_lookup() {
        let gateway = scripted_gateway(0);
        let examples = Arc::new(StaticExamples::default().with_entry("Unknown", "EXAMPLE"));
        let config = WorkflowConfig {
            include_few_shot_examples: false,
            ..WorkflowConfig::default()
        };
        runtime_with(&gateway, &examples, config)
            .run(inputs(0))
            .await
            .unwrap();

        assert_eq!(examples.lookup_count(), 0);
        assert!(gateway
            .recorded_calls()
            .iter()
            .all(|c| !c.request.system_text().contains("EXAMPLE")));
    }

    #[tokio::test]
    async fn test_refine_stage_noop_when_exhausted() {
        let gateway = Arc::new(MockGateway::new());
        gateway.queue_response("draft");
        let runtime = runtime(&gateway);

        let record = SessionRecord::new(
            ValidatedInputs {
                topic: "X".to_string(),
                methodology: "Y".to_string(),
                journal_requirements: "Unknown".to_string(),
                max_refinements: 0,
                model_selector: "test-model".to_string(),
                provider_selector: "mock".to_string(),
            },
            Transcript::new(),
        );
        let record = runtime.run_stage(Stage::Generate, record).await.unwrap();
        let before = record.clone();
        let after = runtime.run_stage(Stage::Refine, record).await.unwrap();

        assert_eq!(after, before);
        assert_eq!(gateway.call_count(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_runs_are_independent() {
        let first = scripted_gateway(1);
        let second = scripted_gateway(3);
        let first_runtime = runtime(&first);
        let second_runtime = runtime(&second);
        let (a, b) = tokio::join!(
            first_runtime.run(inputs(1)),
            second_runtime.run(inputs(3))
        );
        assert_eq!(a.unwrap().final_framework, "refined 1");
        assert_eq!(b.unwrap().final_framework, "refined 3");
    }
}
