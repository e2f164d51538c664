//! Test doubles shared by the orchestrator and router tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream;
use serde_json::json;

use crate::llm_client::{ChatModel, Completion, LlmError};
use crate::models::message::{Message, ToolCall};
use crate::speech::{AudioStream, SpeechError, SpeechService};
use crate::tools::{ToolDescriptor, ToolError, ToolGateway, ToolInvocationResult, ToolSession};

/// Tool output in the shape the problem server produces.
pub const PROBLEM_TEXT: &str = "Please ask the candidate to solve Two Sum. \
    Requirement: Analyze Time Complexity. https://leetcode.com/problems/two-sum/";

/// One recorded model call: the messages sent and how many tools were bound.
#[derive(Debug, Clone)]
pub struct ModelCall {
    pub messages: Vec<Message>,
    pub tools: usize,
}

#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<Completion, LlmError>>>,
    calls: Mutex<Vec<ModelCall>>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<Result<Completion, LlmError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<ModelCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn complete(
        &self,
        messages: &[Message],
        tools: &[ToolDescriptor],
    ) -> Result<Completion, LlmError> {
        self.calls.lock().unwrap().push(ModelCall {
            messages: messages.to_vec(),
            tools: tools.len(),
        });
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("model called more often than scripted")
    }
}

#[derive(Default)]
pub struct GatewayLog {
    pub opens: AtomicUsize,
    pub closes: AtomicUsize,
    pub invoked: Mutex<Vec<String>>,
}

pub struct FakeGateway {
    reachable: bool,
    tool_output: Result<String, String>,
    log: Arc<GatewayLog>,
}

impl FakeGateway {
    pub fn with_output(output: &str) -> (Arc<Self>, Arc<GatewayLog>) {
        let log = Arc::new(GatewayLog::default());
        let gateway = Arc::new(Self {
            reachable: true,
            tool_output: Ok(output.to_string()),
            log: log.clone(),
        });
        (gateway, log)
    }

    pub fn failing_tool() -> (Arc<Self>, Arc<GatewayLog>) {
        let log = Arc::new(GatewayLog::default());
        let gateway = Arc::new(Self {
            reachable: true,
            tool_output: Err("tool process crashed".to_string()),
            log: log.clone(),
        });
        (gateway, log)
    }

    pub fn unreachable() -> (Arc<Self>, Arc<GatewayLog>) {
        let log = Arc::new(GatewayLog::default());
        let gateway = Arc::new(Self {
            reachable: false,
            tool_output: Ok(String::new()),
            log: log.clone(),
        });
        (gateway, log)
    }
}

pub struct FakeSession {
    tool_output: Result<String, String>,
    log: Arc<GatewayLog>,
}

#[async_trait]
impl ToolGateway for FakeGateway {
    async fn open(&self) -> Result<Box<dyn ToolSession>, ToolError> {
        if !self.reachable {
            return Err(ToolError::Spawn {
                command: "problem-server".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
            });
        }
        self.log.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeSession {
            tool_output: self.tool_output.clone(),
            log: self.log.clone(),
        }))
    }
}

#[async_trait]
impl ToolSession for FakeSession {
    async fn list_tools(&mut self) -> Result<Vec<ToolDescriptor>, ToolError> {
        Ok(vec![ToolDescriptor {
            name: "get_coding_problems".to_string(),
            description: "Get a random coding problem".to_string(),
            input_schema: json!({"type": "object"}),
        }])
    }

    async fn invoke(&mut self, call: &ToolCall) -> Result<ToolInvocationResult, ToolError> {
        self.log
            .invoked
            .lock()
            .unwrap()
            .push(format!("{}:{}", call.id, call.arguments));
        match &self.tool_output {
            Ok(text) => Ok(ToolInvocationResult {
                tool_name: call.name.clone(),
                tool_call_id: call.id.clone(),
                content: text.clone(),
            }),
            Err(msg) => Err(ToolError::Protocol(msg.clone())),
        }
    }

    async fn close(self: Box<Self>) {
        self.log.closes.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn text(reply: &str) -> Result<Completion, LlmError> {
    Ok(Completion {
        content: Some(reply.to_string()),
        tool_calls: vec![],
    })
}

pub fn wants(calls: &[(&str, &str)]) -> Result<Completion, LlmError> {
    Ok(Completion {
        content: None,
        tool_calls: calls
            .iter()
            .map(|(id, args)| ToolCall {
                id: id.to_string(),
                name: "get_coding_problems".to_string(),
                arguments: args.to_string(),
            })
            .collect(),
    })
}

/// Speaks in two fixed chunks and transcribes everything to the same sentence.
pub struct FakeSpeech;

#[async_trait]
impl SpeechService for FakeSpeech {
    async fn synthesize(&self, text: &str) -> Result<AudioStream, SpeechError> {
        let chunks: Vec<Result<Bytes, SpeechError>> = vec![
            Ok(Bytes::from_static(b"ID3")),
            Ok(Bytes::from(text.as_bytes().to_vec())),
        ];
        Ok(Box::pin(stream::iter(chunks)))
    }

    async fn transcribe(
        &self,
        audio: Bytes,
        _filename: &str,
        mime_type: &str,
    ) -> Result<String, SpeechError> {
        crate::speech::check_audio(&audio, mime_type)?;
        Ok("I would use a hash map".to_string())
    }
}
