//! Speech Adapters: single-shot text-to-speech and speech-to-text calls.
//!
//! Both operations are stateless. Synthesized audio is streamed back chunk by chunk as the
//! upstream produces it; audio for transcription is uploaded whole.

pub mod handlers;

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use reqwest::{
    multipart::{Form, Part},
    Client,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("audio payload is empty")]
    EmptyAudio,

    #[error("unsupported audio type '{0}'")]
    UnsupportedMedia(String),
}

/// Synthesized audio, yielded incrementally.
pub type AudioStream = Pin<Box<dyn Stream<Item = Result<Bytes, SpeechError>> + Send>>;

/// Carried in `AppState` as `Arc<dyn SpeechService>`.
#[async_trait]
pub trait SpeechService: Send + Sync {
    /// Returns an MP3 byte stream speaking `text`.
    async fn synthesize(&self, text: &str) -> Result<AudioStream, SpeechError>;

    /// Transcribes one complete audio file.
    async fn transcribe(
        &self,
        audio: Bytes,
        filename: &str,
        mime_type: &str,
    ) -> Result<String, SpeechError>;
}

/// Rejects payloads no transcription backend can use.
pub fn check_audio(audio: &[u8], mime_type: &str) -> Result<(), SpeechError> {
    if audio.is_empty() {
        return Err(SpeechError::EmptyAudio);
    }

    let essence = mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if essence.starts_with("audio/") || essence == "video/webm" || essence == "video/mp4" {
        Ok(())
    } else {
        Err(SpeechError::UnsupportedMedia(mime_type.to_string()))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// OpenAI-compatible backend
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    voice: &'a str,
    input: &'a str,
    response_format: &'static str,
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiError {
    error: OpenAiErrorBody,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct OpenAiSpeech {
    client: Client,
    api_base: String,
    api_key: String,
    tts_model: String,
    tts_voice: String,
    stt_model: String,
}

impl OpenAiSpeech {
    pub fn new(
        api_base: String,
        api_key: String,
        tts_model: String,
        tts_voice: String,
        stt_model: String,
    ) -> Self {
        Self {
            client: Client::new(),
            api_base,
            api_key,
            tts_model,
            tts_voice,
            stt_model,
        }
    }

    async fn error_from(response: reqwest::Response) -> SpeechError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<OpenAiError>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);
        SpeechError::Api { status, message }
    }
}

#[async_trait]
impl SpeechService for OpenAiSpeech {
    async fn synthesize(&self, text: &str) -> Result<AudioStream, SpeechError> {
        let response = self
            .client
            .post(format!("{}/audio/speech", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&SpeechRequest {
                model: &self.tts_model,
                voice: &self.tts_voice,
                input: text,
                response_format: "mp3",
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        debug!("TTS stream opened for {} characters", text.chars().count());
        Ok(Box::pin(
            response.bytes_stream().map(|chunk| chunk.map_err(SpeechError::from)),
        ))
    }

    async fn transcribe(
        &self,
        audio: Bytes,
        filename: &str,
        mime_type: &str,
    ) -> Result<String, SpeechError> {
        check_audio(&audio, mime_type)?;

        let size = audio.len();
        let part = Part::bytes(audio.to_vec())
            .file_name(filename.to_string())
            .mime_str(mime_type)?;
        let form = Form::new()
            .text("model", self.stt_model.clone())
            .part("file", part);

        let response = self
            .client
            .post(format!("{}/audio/transcriptions", self.api_base))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let transcription: TranscriptionResponse = response.json().await?;
        debug!("Transcribed {size} bytes of {mime_type}");
        Ok(transcription.text)
    }
}
