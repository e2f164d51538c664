use std::sync::Arc;

use crate::config::Config;
use crate::dialogue::DialogueOrchestrator;
use crate::speech::SpeechService;

/// Shared application state injected into all route handlers via Axum extractors.
/// Every service is built once in `main` and cloned cheaply per request.
#[derive(Clone)]
pub struct AppState {
    /// Owns the chat model and tool gateway used for interview turns.
    pub orchestrator: DialogueOrchestrator,
    pub speech: Arc<dyn SpeechService>,
    pub config: Config,
}
