use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ChatError;
use crate::message::Message;

pub type SessionId = String;

/// Title given to a session before its first message
pub const DEFAULT_TITLE: &str = "New Chat";

/// Number of characters of the first message kept in a derived title
pub const TITLE_MAX_CHARS: usize = 30;

const TITLE_ELLIPSIS: &str = "...";

/// Routing hint forwarded to the backend to bias its response style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    General,
    Spiritual,
}

impl Mode {
    pub fn all() -> &'static [Mode] {
        &[Mode::General, Mode::Spiritual]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::General => "general",
            Mode::Spiritual => "spiritual",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Mode::General => "General",
            Mode::Spiritual => "Spiritual",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ChatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "general" => Ok(Mode::General),
            "spiritual" => Ok(Mode::Spiritual),
            other => Err(ChatError::Validation(format!("unknown mode: {}", other))),
        }
    }
}

/// One conversation thread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: SessionId,
    pub title: String,
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub mode: Mode,
}

impl ChatSession {
    pub fn new(mode: Mode) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: DEFAULT_TITLE.to_string(),
            messages: Vec::new(),
            created_at: Utc::now(),
            mode,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }
}

/// Derive a session title from the first message of a conversation.
///
/// Counts characters, not bytes, so multi-byte text is never split.
pub fn derive_title(content: &str) -> String {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return DEFAULT_TITLE.to_string();
    }
    match trimmed.char_indices().nth(TITLE_MAX_CHARS) {
        Some((cut, _)) => format!("{}{}", &trimmed[..cut], TITLE_ELLIPSIS),
        None => trimmed.to_string(),
    }
}

/// Summary of a session for the sidebar
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub id: SessionId,
    pub title: String,
    pub mode: Mode,
    pub message_count: usize,
    pub created_at: DateTime<Utc>,
}

impl From<&ChatSession> for SessionSummary {
    fn from(session: &ChatSession) -> Self {
        Self {
            id: session.id.clone(),
            title: session.title.clone(),
            mode: session.mode,
            message_count: session.messages.len(),
            created_at: session.created_at,
        }
    }
}
