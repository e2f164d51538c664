//! Tool gateway backed by a child process speaking JSON-RPC on stdin/stdout.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::{debug, info, warn};

use super::protocol::{list_all_tools, CallToolResult, JsonRpcChannel, PROTOCOL_VERSION};
use super::{parse_arguments, ToolDescriptor, ToolError, ToolGateway, ToolInvocationResult, ToolSession};
use crate::models::message::ToolCall;

/// How long a closing tool server gets to exit on its own before it is killed.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

/// Spawns the configured tool server once per `open()`.
#[derive(Debug, Clone)]
pub struct StdioToolGateway {
    command: String,
    args: Vec<String>,
    request_timeout: Duration,
}

impl StdioToolGateway {
    pub fn new(command: String, args: Vec<String>, request_timeout: Duration) -> Self {
        Self {
            command,
            args,
            request_timeout,
        }
    }
}

#[async_trait]
impl ToolGateway for StdioToolGateway {
    async fn open(&self) -> Result<Box<dyn ToolSession>, ToolError> {
        let mut child = Command::new(&self.command)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ToolError::Spawn {
                command: self.command.clone(),
                source,
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ToolError::Protocol("tool server stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ToolError::Protocol("tool server stdout unavailable".to_string()))?;

        let mut session = StdioToolSession {
            child,
            channel: JsonRpcChannel::new(stdin, BufReader::new(stdout), self.request_timeout),
        };

        if let Err(e) = session.handshake().await {
            Box::new(session).close().await;
            return Err(e);
        }

        debug!("Tool server '{}' ready", self.command);
        Ok(Box::new(session))
    }
}

/// One running tool server. Dropping it kills the process.
pub struct StdioToolSession {
    child: Child,
    channel: JsonRpcChannel<ChildStdin, BufReader<ChildStdout>>,
}

impl StdioToolSession {
    async fn handshake(&mut self) -> Result<(), ToolError> {
        let result = self
            .channel
            .request(
                "initialize",
                Some(json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": {},
                    "clientInfo": {
                        "name": env!("CARGO_PKG_NAME"),
                        "version": env!("CARGO_PKG_VERSION"),
                    }
                })),
            )
            .await?;

        if let Some(server) = result.get("serverInfo").and_then(|s| s.get("name")) {
            info!("Connected to tool server {server}");
        }

        self.channel.notify("notifications/initialized", None).await
    }
}

#[async_trait]
impl ToolSession for StdioToolSession {
    async fn list_tools(&mut self) -> Result<Vec<ToolDescriptor>, ToolError> {
        list_all_tools(&mut self.channel).await
    }

    async fn invoke(&mut self, call: &ToolCall) -> Result<ToolInvocationResult, ToolError> {
        debug!("Calling tool: name={} id={}", call.name, call.id);

        let mut params = json!({ "name": call.name });
        if let Some(arguments) = parse_arguments(&call.arguments) {
            params["arguments"] = arguments;
        }

        let result: CallToolResult =
            serde_json::from_value(self.channel.request("tools/call", Some(params)).await?)?;

        if result.is_error {
            warn!("Tool '{}' reported an error: {}", call.name, result.text());
        }

        Ok(ToolInvocationResult {
            tool_name: call.name.clone(),
            tool_call_id: call.id.clone(),
            content: result.text(),
        })
    }

    async fn close(self: Box<Self>) {
        let StdioToolSession { mut child, channel } = *self;

        // Closing stdin is the shutdown signal for a stdio server.
        let mut stdin = channel.into_writer();
        let _ = stdin.shutdown().await;
        drop(stdin);

        match tokio::time::timeout(SHUTDOWN_GRACE, child.wait()).await {
            Ok(Ok(status)) => debug!("Tool server exited: {status}"),
            Ok(Err(e)) => warn!("Failed to reap tool server: {e}"),
            Err(_) => {
                debug!("Tool server still running after stdin closed; killing it");
                if let Err(e) = child.kill().await {
                    warn!("Failed to kill tool server: {e}");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let gateway = StdioToolGateway::new(
            "definitely-not-a-real-tool-server-binary".to_string(),
            vec![],
            Duration::from_secs(1),
        );
        let err = gateway.open().await.err().unwrap();
        assert!(matches!(err, ToolError::Spawn { .. }));
    }
}
