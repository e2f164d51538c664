//! Axum route handlers for the speech endpoints.

use axum::{
    body::Body,
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::speech::check_audio;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TtsRequest {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SttResponse {
    pub transcript: String,
}

/// POST /tts
///
/// Streams `audio/mpeg` as the upstream produces it.
pub async fn handle_tts(
    State(state): State<AppState>,
    Json(request): Json<TtsRequest>,
) -> Result<Response, AppError> {
    if request.text.trim().is_empty() {
        return Err(AppError::Validation("text cannot be empty".to_string()));
    }

    let audio = state.speech.synthesize(&request.text).await?;

    Ok(([(header::CONTENT_TYPE, "audio/mpeg")], Body::from_stream(audio)).into_response())
}

/// POST /stt
///
/// Multipart upload with the recording in a `file` (or `audio`) field.
pub async fn handle_stt(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<SttResponse>, AppError> {
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        if !matches!(name.as_deref(), Some("file" | "audio")) {
            continue;
        }

        let filename = field.file_name().unwrap_or("recording.webm").to_string();
        let mime_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read audio upload: {e}")))?;

        upload = Some((filename, mime_type, bytes));
    }

    let (filename, mime_type, bytes) = upload
        .ok_or_else(|| AppError::Validation("Missing audio field 'file'".to_string()))?;

    check_audio(&bytes, &mime_type)?;

    let transcript = state
        .speech
        .transcribe(bytes, &filename, &mime_type)
        .await?;

    Ok(Json(SttResponse { transcript }))
}
