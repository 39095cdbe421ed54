//! Wire frames exchanged over the chat WebSocket and the history endpoint

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Who produced a chat entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
    System,
}

/// One line of a session transcript. Also the frame sent for replies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatEntry {
    pub role: ChatRole,
    pub content: String,
    pub timestamp: String,
}

impl ChatEntry {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: now_timestamp(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(ChatRole::System, content)
    }
}

/// Client → server frame
#[derive(Debug, Clone, Deserialize)]
pub struct InboundFrame {
    pub message: String,
}

/// Sent once per turn before the coordinator runs
#[derive(Debug, Clone, Serialize)]
pub struct ThinkingFrame {
    pub status: &'static str,
    pub timestamp: String,
}

impl ThinkingFrame {
    pub fn new() -> Self {
        Self {
            status: "thinking",
            timestamp: now_timestamp(),
        }
    }
}

impl Default for ThinkingFrame {
    fn default() -> Self {
        Self::new()
    }
}

/// Body of `GET /chat_history/{session_id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub messages: Vec<ChatEntry>,
}

pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
