//! Framework refinement state machine
//!
//! Three stages (`Generate`, `Refine`, `Validate`) over a session record that
//! is passed by value from one stage to the next. Routing and record updates
//! are pure; the runtime performs the LLM calls.

mod state;
mod transition;

#[cfg(test)]
mod proptests;

pub use state::{
    Effort, Role, SessionInputs, SessionRecord, Stage, Transcript, Turn, ValidatedInputs,
};
pub use transition::{apply, next_stage, transition, StageOutcome, TransitionResult};
