use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tools::ToolInvocationResult;

/// A tool invocation requested by the model inside an assistant message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    /// Raw JSON argument string exactly as the model produced it.
    pub arguments: String,
}

/// One role-tagged entry of a conversation. Serialised as `{"role": ..., "content": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Message {
    System {
        content: String,
    },
    User {
        content: String,
    },
    Assistant {
        #[serde(default)]
        content: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCall>,
    },
    Tool {
        content: String,
        tool_call_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tool_name: Option<String>,
    },
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Message::System {
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Message::User {
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Message::Assistant {
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    pub fn tool_result(result: ToolInvocationResult) -> Self {
        Message::Tool {
            content: result.content,
            tool_call_id: result.tool_call_id,
            tool_name: Some(result.tool_name),
        }
    }

    pub fn role(&self) -> &'static str {
        match self {
            Message::System { .. } => "system",
            Message::User { .. } => "user",
            Message::Assistant { .. } => "assistant",
            Message::Tool { .. } => "tool",
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConversationError {
    #[error("message {index} answers tool call '{tool_call_id}' that no preceding assistant message requested")]
    OrphanToolResult { index: usize, tool_call_id: String },

    #[error("tool call '{tool_call_id}' requested by message {index} is never answered")]
    UnresolvedToolCall { index: usize, tool_call_id: String },
}

/// Ordered, caller-owned message history. The server keeps no copy between requests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conversation(Vec<Message>);

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.0.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Drops every message after the first `len`. Used to discard a failed tool round.
    pub fn truncate(&mut self, len: usize) {
        self.0.truncate(len);
    }

    /// Index of the most recent user message, if any.
    pub fn last_user_index(&self) -> Option<usize> {
        self.0.iter().rposition(|m| matches!(m, Message::User { .. }))
    }

    /// Checks that every tool message answers a call of the assistant message before it,
    /// and that every requested call is answered before the conversation moves on.
    pub fn check_tool_links(&self) -> Result<(), ConversationError> {
        // Calls of the latest assistant message still waiting for a result.
        let mut open: Vec<&str> = Vec::new();
        let mut requested_at = 0;

        for (index, message) in self.0.iter().enumerate() {
            if let Message::Tool { tool_call_id, .. } = message {
                let pos = open
                    .iter()
                    .position(|id| *id == tool_call_id.as_str())
                    .ok_or_else(|| ConversationError::OrphanToolResult {
                        index,
                        tool_call_id: tool_call_id.clone(),
                    })?;
                open.remove(pos);
                continue;
            }

            unresolved(&open, requested_at)?;

            if let Message::Assistant { tool_calls, .. } = message {
                open = tool_calls.iter().map(|c| c.id.as_str()).collect();
                requested_at = index;
            }
        }

        unresolved(&open, requested_at)
    }
}

fn unresolved(open: &[&str], requested_at: usize) -> Result<(), ConversationError> {
    match open.first() {
        Some(id) => Err(ConversationError::UnresolvedToolCall {
            index: requested_at,
            tool_call_id: id.to_string(),
        }),
        None => Ok(()),
    }
}

impl From<Vec<Message>> for Conversation {
    fn from(messages: Vec<Message>) -> Self {
        Conversation(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn call(id: &str) -> ToolCall {
        ToolCall {
            id: id.to_string(),
            name: "get_coding_problems".to_string(),
            arguments: "{}".to_string(),
        }
    }

    fn tool(id: &str) -> Message {
        Message::Tool {
            content: "ok".to_string(),
            tool_call_id: id.to_string(),
            tool_name: None,
        }
    }

    #[test]
    fn test_plain_messages_use_role_and_content_shape() {
        let value = serde_json::to_value(Message::user("hello")).unwrap();
        assert_eq!(value, json!({"role": "user", "content": "hello"}));

        let value = serde_json::to_value(Message::assistant("hi")).unwrap();
        assert_eq!(value, json!({"role": "assistant", "content": "hi"}));
    }

    #[test]
    fn test_history_from_browser_client_deserializes() {
        let raw = r#"[
            {"role": "system", "content": "You are an interviewer."},
            {"role": "assistant", "content": "Welcome!"},
            {"role": "user", "content": "Thanks"}
        ]"#;
        let conversation: Conversation = serde_json::from_str(raw).unwrap();
        assert_eq!(conversation.len(), 3);
        assert_eq!(conversation.messages()[1].role(), "assistant");
        assert_eq!(conversation.messages()[2], Message::user("Thanks"));
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        let raw = r#"[{"role": "narrator", "content": "x"}]"#;
        assert!(serde_json::from_str::<Conversation>(raw).is_err());
    }

    #[test]
    fn test_tool_message_keeps_call_id() {
        let message = Message::tool_result(ToolInvocationResult {
            tool_name: "get_coding_problems".to_string(),
            tool_call_id: "call_1".to_string(),
            content: "Two Sum".to_string(),
        });
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["role"], "tool");
        assert_eq!(value["tool_call_id"], "call_1");
        assert_eq!(value["tool_name"], "get_coding_problems");
    }

    #[test]
    fn test_tool_links_accept_answered_calls() {
        let conversation = Conversation::from(vec![
            Message::user("give me a problem"),
            Message::Assistant {
                content: String::new(),
                tool_calls: vec![call("a"), call("b")],
            },
            tool("a"),
            tool("b"),
            Message::assistant("Here it is"),
        ]);
        assert!(conversation.check_tool_links().is_ok());
    }

    #[test]
    fn test_tool_links_reject_orphan_result() {
        let conversation = Conversation::from(vec![Message::user("hi"), tool("ghost")]);
        assert_eq!(
            conversation.check_tool_links(),
            Err(ConversationError::OrphanToolResult {
                index: 1,
                tool_call_id: "ghost".to_string()
            })
        );
    }

    #[test]
    fn test_tool_links_reject_result_after_user_turn() {
        let conversation = Conversation::from(vec![
            Message::Assistant {
                content: String::new(),
                tool_calls: vec![call("a")],
            },
            Message::user("interrupt"),
            tool("a"),
        ]);
        assert!(conversation.check_tool_links().is_err());
    }

    #[test]
    fn test_tool_links_reject_call_left_open_before_next_message() {
        let conversation = Conversation::from(vec![
            Message::system("s"),
            Message::Assistant {
                content: String::new(),
                tool_calls: vec![call("a"), call("b")],
            },
            tool("a"),
            Message::user("moving on"),
        ]);
        assert_eq!(
            conversation.check_tool_links(),
            Err(ConversationError::UnresolvedToolCall {
                index: 1,
                tool_call_id: "b".to_string()
            })
        );
    }

    #[test]
    fn test_tool_links_reject_call_left_open_at_end() {
        let conversation = Conversation::from(vec![
            Message::system("s"),
            Message::Assistant {
                content: String::new(),
                tool_calls: vec![call("a")],
            },
        ]);
        assert_eq!(
            conversation.check_tool_links(),
            Err(ConversationError::UnresolvedToolCall {
                index: 1,
                tool_call_id: "a".to_string()
            })
        );
    }

    #[test]
    fn test_last_user_index() {
        let conversation = Conversation::from(vec![
            Message::system("s"),
            Message::user("first"),
            Message::assistant("a"),
            Message::user("second"),
            Message::assistant("b"),
        ]);
        assert_eq!(conversation.last_user_index(), Some(3));
        assert_eq!(Conversation::new().last_user_index(), None);
    }
}
