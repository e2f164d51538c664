//! Axum route handlers for the interview API.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::interview::documents::extract_document_text;
use crate::models::interview::InterviewConfig;
use crate::models::message::Conversation;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct StartInterviewResponse {
    pub history: Conversation,
    pub latest_response: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub history: Conversation,
    pub user_input: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub history: Conversation,
    pub latest_response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_coding: Option<String>,
}

#[derive(Debug, Default)]
struct StartForm {
    company: Option<String>,
    position: Option<String>,
    interview_type: Option<String>,
    resume_text: Option<String>,
    job_description_text: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /start_interview
///
/// Multipart form: `company`, `position`, optional `interview_type`,
/// optional `resume_file` and `jd_file` uploads (PDF or plain text).
/// Unreadable uploads are treated as not provided.
pub async fn handle_start_interview(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<StartInterviewResponse>, AppError> {
    let mut form = StartForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "company" | "position" | "interview_type" => {
                let value = field.text().await.map_err(|e| {
                    AppError::Validation(format!("Failed to read field '{name}': {e}"))
                })?;
                let value = Some(value.trim().to_string()).filter(|v| !v.is_empty());
                match name.as_str() {
                    "company" => form.company = value,
                    "position" => form.position = value,
                    _ => form.interview_type = value,
                }
            }
            "resume_file" | "jd_file" => {
                let filename = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let text = match field.bytes().await {
                    Ok(bytes) => {
                        extract_document_text(
                            &name,
                            filename.as_deref(),
                            content_type.as_deref(),
                            bytes,
                        )
                        .await
                    }
                    Err(e) => {
                        warn!("{name}: upload could not be read: {e}");
                        None
                    }
                };
                if name == "resume_file" {
                    form.resume_text = text;
                } else {
                    form.job_description_text = text;
                }
            }
            other => debug!("Ignoring unknown form field '{other}'"),
        }
    }

    let config = InterviewConfig {
        company: form
            .company
            .ok_or_else(|| AppError::Validation("company is required".to_string()))?,
        position: form
            .position
            .ok_or_else(|| AppError::Validation("position is required".to_string()))?,
        interview_type: form.interview_type,
        resume_text: form.resume_text,
        job_description_text: form.job_description_text,
    };

    let outcome = state.orchestrator.open_interview(&config).await?;

    Ok(Json(StartInterviewResponse {
        history: outcome.history,
        latest_response: outcome.reply,
    }))
}

/// POST /chat
///
/// Runs one dialogue turn over the caller-supplied history and returns the extended history.
pub async fn handle_chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    if request.user_input.trim().is_empty() {
        return Err(AppError::Validation("user_input cannot be empty".to_string()));
    }

    request.history.check_tool_links()?;

    let outcome = state
        .orchestrator
        .run_turn(request.history, &request.user_input)
        .await?;

    Ok(Json(ChatResponse {
        history: outcome.history,
        latest_response: outcome.reply,
        trigger_coding: outcome.trigger_coding,
    }))
}
