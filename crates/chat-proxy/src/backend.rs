//! Outbound client for the AI backend.
//!
//! The server talks to [`ChatBackend`] so handlers can be exercised without
//! a network; [`BackendClient`] is the reqwest implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use chat_types::{
    ChatError, Result,
    config::GatewayConfig,
    message::AssistantReply,
    session::Mode,
    wire::{interpret_chat_reply, interpret_health, ChatRequestBody},
};

#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn chat(&self, message: &str, mode: Mode) -> Result<AssistantReply>;

    async fn health(&self) -> Result<bool>;
}

#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    config: GatewayConfig,
}

impl BackendClient {
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| ChatError::Config(format!("http client: {}", e)))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Classify a reqwest failure. Timeouts keep the configured budget.
fn transport_error(e: reqwest::Error, timeout_ms: u64) -> ChatError {
    if e.is_timeout() {
        ChatError::Timeout(timeout_ms)
    } else {
        ChatError::Unreachable(e.to_string())
    }
}

#[async_trait]
impl ChatBackend for BackendClient {
    async fn chat(&self, message: &str, mode: Mode) -> Result<AssistantReply> {
        let url = self.config.chat_url();
        let timeout_ms = self.config.request_timeout_ms;
        let body = ChatRequestBody::new(message, mode, self.config.forward_mode);
        log::debug!("POST {} ({} chars, mode {})", url, message.len(), mode);

        let response = self
            .client
            .post(&url)
            .timeout(Duration::from_millis(timeout_ms))
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(e, timeout_ms))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| transport_error(e, timeout_ms))?;

        interpret_chat_reply(status, &text)
    }

    async fn health(&self) -> Result<bool> {
        let timeout_ms = self.config.health_timeout_ms;
        let response = self
            .client
            .get(self.config.health_url())
            .timeout(Duration::from_millis(timeout_ms))
            .send()
            .await
            .map_err(|e| transport_error(e, timeout_ms))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| transport_error(e, timeout_ms))?;

        interpret_health(status, &text)
    }
}
