use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// How the message text should be rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Plain,
    Markdown,
    List,
}

/// A single message in a conversation. Immutable once appended to a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ContentKind>,
    /// Follow-up prompts offered by the assistant
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            kind: None,
            suggestions: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text)
    }

    /// Build the assistant message for a successful backend reply.
    pub fn from_reply(reply: AssistantReply) -> Self {
        Self {
            kind: reply.kind,
            suggestions: reply.suggestions,
            ..Self::new(Role::Assistant, reply.text)
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}

/// The parsed payload of a successful backend round trip
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AssistantReply {
    pub text: String,
    pub kind: Option<ContentKind>,
    pub suggestions: Vec<String>,
}

impl AssistantReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}
