//! Tool Gateway: short-lived sessions with the external tool-provider process.
//!
//! A session is opened per dialogue turn, asked for its manifest, used for at most one
//! round of calls and then closed. Nothing is pooled or cached between turns.
//!
//! `AppState` holds an `Arc<dyn ToolGateway>`; the production backend spawns a child
//! process and talks newline-delimited JSON-RPC over its stdin/stdout.

pub mod protocol;
pub mod stdio;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::models::message::ToolCall;

pub use stdio::StdioToolGateway;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("failed to start tool server '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("tool server I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("tool server did not answer '{method}' in time")]
    Timeout { method: String },

    #[error("tool server returned error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("tool server protocol error: {0}")]
    Protocol(String),

    #[error("tool server sent malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// One entry of the tool manifest advertised by the tool process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    /// JSON Schema of the tool's arguments object.
    pub input_schema: Value,
}

/// Text produced by one tool call, correlated with the model's request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocationResult {
    pub tool_name: String,
    pub tool_call_id: String,
    pub content: String,
}

/// An open connection to the tool process.
///
/// Callers must finish with `close()`. Implementations also release the
/// underlying resource on drop.
#[async_trait]
pub trait ToolSession: Send {
    async fn list_tools(&mut self) -> Result<Vec<ToolDescriptor>, ToolError>;

    /// Runs one tool call and waits for its result.
    async fn invoke(&mut self, call: &ToolCall) -> Result<ToolInvocationResult, ToolError>;

    async fn close(self: Box<Self>);
}

/// Opens tool sessions. Carried in `AppState` as `Arc<dyn ToolGateway>`.
#[async_trait]
pub trait ToolGateway: Send + Sync {
    async fn open(&self) -> Result<Box<dyn ToolSession>, ToolError>;
}

/// Arguments are forwarded as the model wrote them; anything that is not a JSON
/// object is left for the tool process to reject.
pub(crate) fn parse_arguments(raw: &str) -> Option<Value> {
    if raw.trim().is_empty() {
        return None;
    }
    Some(serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_arguments_object() {
        assert_eq!(
            parse_arguments(r#"{"difficulty": "easy"}"#),
            Some(json!({"difficulty": "easy"}))
        );
    }

    #[test]
    fn test_parse_arguments_blank_means_none() {
        assert_eq!(parse_arguments("   "), None);
    }

    #[test]
    fn test_parse_arguments_invalid_json_is_forwarded_raw() {
        assert_eq!(
            parse_arguments("difficulty=easy"),
            Some(Value::String("difficulty=easy".to_string()))
        );
    }
}
