// file: src/pipeline/mod.rs
// description: pipeline module exports and public api
// reference: pipeline orchestration

mod orchestrator;
mod report;

pub use orchestrator::PollingOrchestrator;
pub use report::{CycleOutcome, CycleReport};
