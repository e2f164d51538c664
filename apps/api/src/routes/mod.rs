pub mod health;

use axum::{
    http::Uri,
    routing::{get, post},
    Router,
};

use crate::errors::AppError;
use crate::interview::handlers as interview;
use crate::speech::handlers as speech;
use crate::state::AppState;

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {}", uri.path()))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Interview dialogue
        .route("/start_interview", post(interview::handle_start_interview))
        .route("/chat", post(interview::handle_chat))
        // Speech
        .route("/tts", post(speech::handle_tts))
        .route("/stt", post(speech::handle_stt))
        .fallback(not_found)
        .with_state(state)
}
