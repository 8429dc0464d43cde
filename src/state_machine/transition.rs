//! Pure state transition function
//!
//! Everything here is I/O free: given the same record and the same stage
//! outcome it always produces the same next record and the same next stage.
//! The runtime owns the gateway call that produces a [`StageOutcome`].

use super::{SessionRecord, Stage};

/// What a stage produced: the human summary and the model's reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageOutcome {
    pub stage: Stage,
    pub summary: String,
    pub completion: String,
}

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub record: SessionRecord,
    /// `None` once the terminal stage has run
    pub next: Option<Stage>,
}

/// Routing rule evaluated after `Generate` and after every `Refine`.
///
/// `Validate` has no outgoing transition.
pub fn next_stage(stage: Stage, refinement_count: u32, max_refinements: u32) -> Option<Stage> {
    if stage.is_terminal() {
        None
    } else if refinement_count < max_refinements {
        Some(Stage::Refine)
    } else {
        Some(Stage::Validate)
    }
}

/// Apply a stage's outcome to the record.
///
/// A `Refine` outcome on an exhausted record is a no-op, as is a second
/// `Validate`-freeze of `final_framework` (the transcript still records the
/// assessment in that case).
pub fn apply(mut record: SessionRecord, outcome: StageOutcome) -> SessionRecord {
    let StageOutcome {
        stage,
        summary,
        completion,
    } = outcome;

    match stage {
        Stage::Generate => {
            record.transcript.push_exchange(summary, completion.clone());
            record.current_framework = completion;
            record.refinement_count = 0;
        }
        Stage::Refine => {
            if !record.can_refine() {
                return record;
            }
            record.transcript.push_exchange(summary, completion.clone());
            record.current_framework = completion;
            record.refinement_count += 1;
        }
        Stage::Validate => {
            record.transcript.push_exchange(summary, completion);
            if record.final_framework.is_none() {
                record.final_framework = Some(record.current_framework.clone());
            }
        }
    }

    record
}

/// Apply an outcome and route to the next stage.
pub fn transition(record: SessionRecord, outcome: StageOutcome) -> TransitionResult {
    let stage = outcome.stage;
    let record = apply(record, outcome);
    let next = next_stage(stage, record.refinement_count, record.max_refinements);
    TransitionResult { record, next }
}
