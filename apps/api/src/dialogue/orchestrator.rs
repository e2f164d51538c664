//! Dialogue Orchestrator: runs one interview turn.
//!
//! Flow per turn:
//!   BUILD_CONTEXT → OFFER_TOOLS → AWAIT_MODEL → (TOOL_ROUND | DIRECT_REPLY) → DONE
//!
//! - A tool server that cannot be reached degrades to a tool-less model call.
//! - A failure inside the tool round discards the round and retries the turn model-only.
//! - Failures of the first model call propagate to the caller.
//! - Exactly one tool round per turn. The follow-up call is made without tools bound.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::dialogue::prompts::{
    CODING_LINK_DIRECTIVE, CODING_LINK_LINE, CODING_LINK_PREFIX, TOPIC_GUARD_REMINDER,
};
use crate::interview::prompt_builder::build_system_prompt;
use crate::llm_client::{ChatModel, LlmError};
use crate::models::interview::InterviewConfig;
use crate::models::message::{Conversation, Message};
use crate::tools::{ToolDescriptor, ToolError, ToolGateway, ToolSession};

/// Result of one turn, handed back to the HTTP layer.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub history: Conversation,
    pub reply: String,
    /// Tool result text that carried a coding-problem link, if any.
    pub trigger_coding: Option<String>,
}

/// Why a tool round was abandoned. Always recovered by a model-only retry.
#[derive(Debug, Error)]
enum ToolRoundError {
    #[error("tool call failed: {0}")]
    Tool(#[from] ToolError),

    #[error("follow-up model call failed: {0}")]
    Model(#[from] LlmError),
}

/// Outcome of AWAIT_MODEL while a tool session is open.
enum ToolTurn {
    Direct(String),
    Round {
        reply: String,
        trigger_coding: Option<String>,
    },
}

#[derive(Clone)]
pub struct DialogueOrchestrator {
    model: Arc<dyn ChatModel>,
    tools: Arc<dyn ToolGateway>,
    topic_guard: bool,
}

impl DialogueOrchestrator {
    pub fn new(model: Arc<dyn ChatModel>, tools: Arc<dyn ToolGateway>, topic_guard: bool) -> Self {
        Self {
            model,
            tools,
            topic_guard,
        }
    }

    /// Starts a new interview: renders the system prompt and asks for the opening line.
    pub async fn open_interview(&self, config: &InterviewConfig) -> Result<TurnOutcome, LlmError> {
        let mut history = Conversation::new();
        history.push(Message::system(build_system_prompt(config)));

        let opening = self.model.complete(history.messages(), &[]).await?;
        let reply = opening.text().to_string();
        if reply.is_empty() {
            return Err(LlmError::EmptyContent);
        }

        info!(
            "Interview opened for {} / {}",
            config.company, config.position
        );
        history.push(Message::assistant(reply.clone()));

        Ok(TurnOutcome {
            history,
            reply,
            trigger_coding: None,
        })
    }

    /// Runs one turn against the caller's history and returns the extended history.
    pub async fn run_turn(
        &self,
        conversation: Conversation,
        user_input: &str,
    ) -> Result<TurnOutcome, LlmError> {
        let turn_id = Uuid::new_v4();
        self.turn(conversation, user_input)
            .instrument(info_span!("turn", %turn_id))
            .await
    }

    async fn turn(
        &self,
        mut conversation: Conversation,
        user_input: &str,
    ) -> Result<TurnOutcome, LlmError> {
        // BUILD_CONTEXT
        conversation.push(Message::user(user_input));
        let context_len = conversation.len();

        // OFFER_TOOLS
        let Some((session, tools)) = self.offer_tools().await else {
            let reply = self.direct_reply(&conversation).await?;
            return Ok(finish(conversation, reply, None));
        };

        match self.tool_turn(session, &tools, &mut conversation).await {
            Ok(ToolTurn::Direct(reply)) => Ok(finish(conversation, reply, None)),
            Ok(ToolTurn::Round {
                reply,
                trigger_coding,
            }) => Ok(finish(conversation, reply, trigger_coding)),
            Err(TurnFailure::Model(e)) => Err(e),
            Err(TurnFailure::ToolRound(e)) => {
                warn!("Tool round abandoned, retrying turn without tools: {e}");
                conversation.truncate(context_len);
                let reply = self.direct_reply(&conversation).await?;
                Ok(finish(conversation, reply, None))
            }
        }
    }

    /// Opens a tool session and fetches its manifest. `None` means continue without tools.
    async fn offer_tools(&self) -> Option<(Box<dyn ToolSession>, Vec<ToolDescriptor>)> {
        let mut session = match self.tools.open().await {
            Ok(session) => session,
            Err(e) => {
                warn!("Tool server unavailable, continuing without tools: {e}");
                return None;
            }
        };

        match session.list_tools().await {
            Ok(tools) if !tools.is_empty() => Some((session, tools)),
            Ok(_) => {
                info!("Tool server advertised no tools");
                session.close().await;
                None
            }
            Err(e) => {
                warn!("Failed to list tools, continuing without tools: {e}");
                session.close().await;
                None
            }
        }
    }

    /// AWAIT_MODEL with tools bound, then TOOL_ROUND if requested.
    /// The session is closed on every path before this returns.
    async fn tool_turn(
        &self,
        mut session: Box<dyn ToolSession>,
        tools: &[ToolDescriptor],
        conversation: &mut Conversation,
    ) -> Result<ToolTurn, TurnFailure> {
        let first = match self
            .model
            .complete(&self.outgoing(conversation), tools)
            .await
        {
            Ok(completion) => completion,
            Err(e) => {
                session.close().await;
                return Err(TurnFailure::Model(e));
            }
        };

        if !first.wants_tools() {
            session.close().await;
            return Ok(ToolTurn::Direct(first.text().to_string()));
        }

        conversation.push(Message::Assistant {
            content: first.content.clone().unwrap_or_default(),
            tool_calls: first.tool_calls.clone(),
        });

        // Calls run sequentially, in the order the model listed them.
        let mut link: Option<(String, String)> = None;
        for call in &first.tool_calls {
            let result = match session.invoke(call).await {
                Ok(result) => result,
                Err(e) => {
                    session.close().await;
                    return Err(TurnFailure::ToolRound(e.into()));
                }
            };
            info!("Tool '{}' answered call {}", result.tool_name, result.tool_call_id);

            if link.is_none() {
                if let Some(url) = extract_coding_link(&result.content) {
                    info!("Coding problem link detected: {url}");
                    link = Some((url.to_string(), result.content.clone()));
                }
            }
            conversation.push(Message::tool_result(result));
        }
        session.close().await;

        let mut messages = self.outgoing(conversation);
        if let Some((url, _)) = &link {
            messages.push(Message::system(
                CODING_LINK_DIRECTIVE
                    .replace("{link_line}", &link_line(url))
                    .replace("{url}", url),
            ));
        }

        let reply = self
            .model
            .complete(&messages, &[])
            .await
            .map_err(|e| TurnFailure::ToolRound(e.into()))?;

        if reply.wants_tools() {
            warn!(
                "Model requested {} more tool call(s) after the tool round; ignoring",
                reply.tool_calls.len()
            );
        }

        let text = reply.text().to_string();
        if text.is_empty() {
            return Err(TurnFailure::ToolRound(LlmError::EmptyContent.into()));
        }

        Ok(match link {
            Some((url, tool_text)) => ToolTurn::Round {
                reply: ensure_link(text, &url),
                trigger_coding: Some(tool_text),
            },
            None => ToolTurn::Round {
                reply: text,
                trigger_coding: None,
            },
        })
    }

    /// DIRECT_REPLY without tools bound.
    async fn direct_reply(&self, conversation: &Conversation) -> Result<String, LlmError> {
        let completion = self.model.complete(&self.outgoing(conversation), &[]).await?;
        let text = completion.text().to_string();
        if text.is_empty() {
            return Err(LlmError::EmptyContent);
        }
        Ok(text)
    }

    /// The message list actually sent to the model. The stored history is left untouched.
    fn outgoing(&self, conversation: &Conversation) -> Vec<Message> {
        let mut messages = conversation.messages().to_vec();
        if self.topic_guard {
            if let Some(idx) = conversation.last_user_index() {
                if let Message::User { content } = &mut messages[idx] {
                    content.push_str(TOPIC_GUARD_REMINDER);
                }
            }
        }
        messages
    }
}

enum TurnFailure {
    Model(LlmError),
    ToolRound(ToolRoundError),
}

fn finish(mut conversation: Conversation, reply: String, trigger_coding: Option<String>) -> TurnOutcome {
    conversation.push(Message::assistant(reply.clone()));
    TurnOutcome {
        history: conversation,
        reply,
        trigger_coding,
    }
}

fn link_line(url: &str) -> String {
    CODING_LINK_LINE.replace("{url}", url)
}

/// Finds the first coding-problem URL in a tool result.
pub fn extract_coding_link(text: &str) -> Option<&str> {
    let start = text.find(CODING_LINK_PREFIX)?;
    let rest = &text[start..];
    let end = rest
        .find(|c: char| c.is_whitespace() || matches!(c, ')' | ']' | '>' | '"' | '\''))
        .unwrap_or(rest.len());
    let url = rest[..end].trim_end_matches(['.', ',', ';', ':', '!', '?']);
    (url.len() > CODING_LINK_PREFIX.len()).then_some(url)
}

/// Guarantees the reply surfaces the link, appending the required line if the model left it out.
fn ensure_link(reply: String, url: &str) -> String {
    if reply.contains(url) {
        reply
    } else {
        format!("{reply}\n\n{}", link_line(url))
    }
}
