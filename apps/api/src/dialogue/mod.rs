// Dialogue Orchestrator: one interview turn, with at most one round of tool calls.

pub mod orchestrator;
pub mod prompts;

pub use orchestrator::{DialogueOrchestrator, TurnOutcome};
