//! JSON bodies exchanged with the AI backend and with proxy clients.
//!
//! Both gateway implementations (browser `fetch` and the native proxy)
//! interpret backend replies through [`interpret_chat_reply`] and
//! [`interpret_health`], so the error mapping lives in one place.

use serde::{Deserialize, Serialize};

use crate::message::{AssistantReply, ContentKind};
use crate::session::Mode;
use crate::{ChatError, Result};

/// Outbound body of `POST <backend>/get_response`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequestBody {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,
}

impl ChatRequestBody {
    pub fn new(message: impl Into<String>, mode: Mode, forward_mode: bool) -> Self {
        Self {
            message: message.into(),
            mode: forward_mode.then_some(mode),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyStatus {
    Success,
    Error,
}

/// Body returned by the backend's chat endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatReplyBody {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub status: Option<ReplyStatus>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub kind: Option<ContentKind>,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

/// Body returned by the backend's health endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthBody {
    pub ai_assistant_ready: bool,
}

/// Inbound body accepted by the proxy's chat endpoint.
/// Fields are optional so a missing message is a 400, not an extractor rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InboundChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundChatResponse {
    pub response: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Map an HTTP status and body from the chat endpoint to a reply or a gateway error.
pub fn interpret_chat_reply(status: u16, body: &str) -> Result<AssistantReply> {
    if !is_success(status) {
        return Err(ChatError::Backend {
            status,
            body: body.to_string(),
        });
    }

    let reply: ChatReplyBody = serde_json::from_str(body).map_err(|e| ChatError::Backend {
        status,
        body: format!("malformed reply: {}", e),
    })?;

    if reply.status == Some(ReplyStatus::Error) {
        return Err(ChatError::Backend {
            status,
            body: reply
                .error
                .unwrap_or_else(|| "backend reported an error".to_string()),
        });
    }

    let text = reply.response.ok_or_else(|| ChatError::Backend {
        status,
        body: "reply has no response field".to_string(),
    })?;

    Ok(AssistantReply {
        text,
        kind: reply.kind,
        suggestions: reply.suggestions,
    })
}

/// Map an HTTP status and body from the health endpoint to the readiness flag.
pub fn interpret_health(status: u16, body: &str) -> Result<bool> {
    if !is_success(status) {
        return Err(ChatError::Backend {
            status,
            body: body.to_string(),
        });
    }
    let health: HealthBody = serde_json::from_str(body)?;
    Ok(health.ai_assistant_ready)
}
