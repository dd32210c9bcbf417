//! Backend gateway over browser `fetch()` via gloo-net.
//!
//! Every exchange, body included, races a gloo-timers timeout; when the
//! timer wins, the request's `AbortController` is fired so the browser drops
//! the connection.

use std::future::Future;

use async_trait::async_trait;
use futures::future::{select, Either};
use gloo_net::http::{Request, Response};
use gloo_timers::future::TimeoutFuture;
use web_sys::AbortController;

use chat_core::ports::GatewayPort;
use chat_types::{
    ChatError, Result,
    config::GatewayConfig,
    message::AssistantReply,
    session::Mode,
    wire::{interpret_chat_reply, interpret_health, ChatRequestBody},
};

use crate::storage::local::describe;

pub struct HttpGateway {
    config: GatewayConfig,
}

impl HttpGateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

fn abort_controller() -> Result<AbortController> {
    AbortController::new().map_err(|e| ChatError::JsInterop(describe(&e)))
}

/// Resolve `work`, or fail with `Timeout` once `timeout_ms` passes first.
/// `on_timeout` runs only when the timer wins.
pub async fn within_timeout<T, F>(work: F, timeout_ms: u64, on_timeout: impl FnOnce()) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let work = Box::pin(work);
    let timer = Box::pin(TimeoutFuture::new(timeout_ms.min(u32::MAX as u64) as u32));

    match select(work, timer).await {
        Either::Left((result, _)) => result,
        Either::Right(_) => {
            on_timeout();
            Err(ChatError::Timeout(timeout_ms))
        }
    }
}

/// Send `request` and read its body under one deadline. Returns the status
/// and the body text.
async fn dispatch(
    request: Request,
    controller: &AbortController,
    timeout_ms: u64,
) -> Result<(u16, String)> {
    let exchange = async move {
        let response: Response = request
            .send()
            .await
            .map_err(|e| ChatError::Unreachable(e.to_string()))?;
        let status = response.status();
        let body = response.text().await.unwrap_or_else(|e| {
            log::debug!("could not read response body: {}", e);
            String::new()
        });
        Ok::<_, ChatError>((status, body))
    };

    within_timeout(exchange, timeout_ms, || controller.abort()).await
}

#[async_trait(?Send)]
impl GatewayPort for HttpGateway {
    async fn send(&self, message: &str, mode: Mode) -> Result<AssistantReply> {
        let url = self.config.chat_url();
        let body = ChatRequestBody::new(message, mode, self.config.forward_mode);
        log::debug!("POST {} ({} chars, mode {})", url, message.len(), mode);

        let controller = abort_controller()?;
        let request = Request::post(&url)
            .abort_signal(Some(&controller.signal()))
            .json(&body)
            .map_err(|e| ChatError::Serialization(e.to_string()))?;

        let (status, text) = dispatch(request, &controller, self.config.request_timeout_ms).await?;

        interpret_chat_reply(status, &text)
    }

    async fn check_health(&self) -> Result<bool> {
        let url = self.config.health_url();
        let controller = abort_controller()?;
        let request = Request::get(&url)
            .abort_signal(Some(&controller.signal()))
            .build()
            .map_err(|e| ChatError::JsInterop(e.to_string()))?;

        let (status, text) = dispatch(request, &controller, self.config.health_timeout_ms).await?;

        interpret_health(status, &text)
    }
}
