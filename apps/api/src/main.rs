mod config;
mod dialogue;
mod errors;
mod interview;
mod llm_client;
mod models;
mod routes;
mod speech;
mod state;
#[cfg(test)]
mod testing;
mod tools;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::dialogue::DialogueOrchestrator;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::speech::OpenAiSpeech;
use crate::state::AppState;
use crate::tools::StdioToolGateway;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing OPENAI_API_KEY)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log,
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Interview API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize chat model client
    let llm = LlmClient::new(
        &config.openai_api_base,
        config.openai_api_key.clone(),
        config.chat_model.clone(),
        config.chat_temperature,
    )?;
    info!("LLM client initialized (model: {})", llm.model());

    // Tool server is spawned per turn; nothing is started here
    let tools = StdioToolGateway::new(
        config.tool_server_command.clone(),
        config.tool_server_args.clone(),
        Duration::from_secs(config.tool_timeout_secs),
    );
    info!(
        "Tool gateway configured: {} {:?}",
        config.tool_server_command, config.tool_server_args
    );

    let speech = OpenAiSpeech::new(
        config.openai_api_base.clone(),
        config.openai_api_key.clone(),
        config.tts_model.clone(),
        config.tts_voice.clone(),
        config.stt_model.clone(),
    );

    // Build app state
    let state = AppState {
        orchestrator: DialogueOrchestrator::new(
            Arc::new(llm),
            Arc::new(tools),
            config.topic_guard,
        ),
        speech: Arc::new(speech),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
