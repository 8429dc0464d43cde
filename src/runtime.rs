//! Runtime for executing framework workflows
//!
//! Owns the I/O side of a run: prompt rendering, gateway calls, and event
//! delivery for streaming consumers. All state changes go through the pure
//! functions in [`crate::state_machine`].

mod error;
mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use error::{RunFailure, WorkflowError};
pub use executor::{FrameworkRuntime, FrameworkStream, RunOutput, StageSnapshot, StreamEvent};
pub use traits::*;

use crate::journal_examples::JournalExamples;

/// Runtime bound to the configured providers and the built-in journal examples
pub type ProductionRuntime = FrameworkRuntime<RegistryGateway, JournalExamples>;
