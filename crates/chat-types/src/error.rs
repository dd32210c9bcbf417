use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChatError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error("Backend unreachable: {0}")]
    Unreachable(String),

    #[error("Backend error (HTTP {status}): {body}")]
    Backend { status: u16, body: String },

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JS interop error: {0}")]
    JsInterop(String),
}

impl ChatError {
    /// Errors raised by the backend gateway. These become the apology reply.
    pub fn is_gateway_failure(&self) -> bool {
        matches!(
            self,
            ChatError::Timeout(_) | ChatError::Unreachable(_) | ChatError::Backend { .. }
        )
    }
}

impl From<serde_json::Error> for ChatError {
    fn from(e: serde_json::Error) -> Self {
        ChatError::Serialization(e.to_string())
    }
}
