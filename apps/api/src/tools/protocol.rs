//! Newline-delimited JSON-RPC 2.0 framing and the tool-server payload types.

use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use super::{ToolDescriptor, ToolError};

pub const PROTOCOL_VERSION: &str = "2024-11-05";

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<u64>,
    method: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<Value>,
}

/// Any inbound line: a response (id + result/error) or a server notification (method, no id).
#[derive(Debug, Deserialize)]
struct JsonRpcMessage {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcErrorObject {
    code: i64,
    message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Tool-server payloads
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolsListResult {
    pub tools: Vec<RemoteTool>,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteTool {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "empty_object_schema")]
    pub input_schema: Value,
}

fn empty_object_schema() -> Value {
    json!({"type": "object", "properties": {}})
}

impl From<RemoteTool> for ToolDescriptor {
    fn from(tool: RemoteTool) -> Self {
        ToolDescriptor {
            name: tool.name,
            description: tool.description.unwrap_or_default(),
            input_schema: tool.input_schema,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallToolResult {
    #[serde(default)]
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub is_error: bool,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: Option<String>,
}

impl CallToolResult {
    /// Joins every text block with newlines. Non-text blocks are skipped.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text.as_deref())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Channel
// ────────────────────────────────────────────────────────────────────────────

/// Request/response channel over any async byte pipe. One request in flight at a time.
pub struct JsonRpcChannel<W, R> {
    writer: W,
    reader: R,
    next_id: u64,
    request_timeout: Duration,
}

impl<W, R> JsonRpcChannel<W, R>
where
    W: AsyncWrite + Unpin + Send,
    R: AsyncBufRead + Unpin + Send,
{
    pub fn new(writer: W, reader: R, request_timeout: Duration) -> Self {
        Self {
            writer,
            reader,
            next_id: 1,
            request_timeout,
        }
    }

    /// Sends a request and waits for the matching response's `result`.
    pub async fn request(&mut self, method: &str, params: Option<Value>) -> Result<Value, ToolError> {
        let id = self.next_id;
        self.next_id += 1;

        self.write_line(&JsonRpcRequest {
            jsonrpc: "2.0",
            id: Some(id),
            method,
            params,
        })
        .await?;

        match tokio::time::timeout(self.request_timeout, self.read_response(id)).await {
            Ok(result) => result,
            Err(_) => Err(ToolError::Timeout {
                method: method.to_string(),
            }),
        }
    }

    /// Sends a notification. No response is expected.
    pub async fn notify(&mut self, method: &str, params: Option<Value>) -> Result<(), ToolError> {
        self.write_line(&JsonRpcRequest {
            jsonrpc: "2.0",
            id: None,
            method,
            params,
        })
        .await
    }

    async fn write_line(&mut self, message: &JsonRpcRequest<'_>) -> Result<(), ToolError> {
        let mut line = serde_json::to_vec(message)?;
        line.push(b'\n');
        self.writer.write_all(&line).await?;
        self.writer.flush().await?;
        Ok(())
    }

    async fn read_response(&mut self, id: u64) -> Result<Value, ToolError> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.reader.read_line(&mut line).await? == 0 {
                return Err(ToolError::Protocol(
                    "tool server closed its output".to_string(),
                ));
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let message: JsonRpcMessage = serde_json::from_str(trimmed)?;

            match (&message.id, &message.method) {
                (None, Some(method)) => {
                    debug!("Skipping tool server notification: method={method}");
                    continue;
                }
                (Some(_), Some(method)) => {
                    warn!("Ignoring request from tool server: method={method}");
                    continue;
                }
                _ => {}
            }

            if message.id.as_ref().and_then(Value::as_u64) != Some(id) {
                warn!("Discarding response for unexpected id {:?}", message.id);
                continue;
            }

            if let Some(error) = message.error {
                return Err(ToolError::Rpc {
                    code: error.code,
                    message: error.message,
                });
            }

            return Ok(message.result.unwrap_or(Value::Null));
        }
    }

    /// Gives back the write half so the caller can close it.
    pub fn into_writer(self) -> W {
        self.writer
    }
}

/// Fetches the full tool manifest, following `nextCursor` pages until the server stops.
pub async fn list_all_tools<W, R>(
    channel: &mut JsonRpcChannel<W, R>,
) -> Result<Vec<ToolDescriptor>, ToolError>
where
    W: AsyncWrite + Unpin + Send,
    R: AsyncBufRead + Unpin + Send,
{
    let mut tools = Vec::new();
    let mut seen = HashSet::new();
    let mut cursor: Option<String> = None;

    loop {
        let params = cursor.as_ref().map(|c| json!({ "cursor": c }));
        let page: ToolsListResult =
            serde_json::from_value(channel.request("tools/list", params).await?)?;

        tools.extend(page.tools.into_iter().map(ToolDescriptor::from));

        match page.next_cursor {
            Some(next) if !next.is_empty() => {
                if !seen.insert(next.clone()) {
                    return Err(ToolError::Protocol(format!(
                        "tools/list repeated cursor '{next}'"
                    )));
                }
                cursor = Some(next);
            }
            _ => break,
        }
    }

    Ok(tools)
}
