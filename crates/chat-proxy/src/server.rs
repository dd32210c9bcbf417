//! HTTP server: `POST /api/chat` and `GET /api/health`.

use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use chat_types::{
    ChatError,
    session::Mode,
    wire::{ErrorBody, HealthBody, InboundChatRequest, InboundChatResponse},
};

use crate::backend::{BackendClient, ChatBackend};
use crate::config::ProxyConfig;

#[derive(Clone)]
pub struct AppState {
    backend: Arc<dyn ChatBackend>,
}

impl AppState {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self { backend }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/chat", post(chat))
        .route("/api/health", get(health))
        .with_state(state)
}

/// Bind, serve until Ctrl-C, then drain in-flight requests.
pub async fn run(config: ProxyConfig) -> anyhow::Result<()> {
    let backend = BackendClient::new(config.gateway.clone())?;
    log::info!("forwarding to {}", config.gateway.chat_url());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("binding to {}", config.bind_addr))?;
    log::info!("chat proxy listening on {}", config.bind_addr);

    axum::serve(listener, router(AppState::new(Arc::new(backend))))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("chat proxy exited")?;
    log::info!("chat proxy stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("could not install Ctrl-C handler: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("shutdown signal received, draining connections");
}

pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<InboundChatRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "Invalid request body",
                Some(rejection.body_text()),
            );
        }
    };

    let message = match request.message.as_deref().map(str::trim) {
        Some(m) if !m.is_empty() => m.to_string(),
        _ => return error_response(StatusCode::BAD_REQUEST, "Message is required", None),
    };

    let mode = match request.mode.as_deref() {
        None => Mode::default(),
        Some(raw) => match raw.parse::<Mode>() {
            Ok(mode) => mode,
            Err(e) => {
                return error_response(StatusCode::BAD_REQUEST, "Invalid mode", Some(e.to_string()))
            }
        },
    };

    log::debug!("chat request ({} chars, mode {})", message.len(), mode);

    match state.backend.chat(&message, mode).await {
        Ok(reply) => Json(InboundChatResponse { response: reply.text }).into_response(),
        Err(e) => {
            log::warn!("backend call failed: {}", e);
            gateway_error(&e)
        }
    }
}

/// Backend readiness. A failed check is reported as not ready.
pub async fn health(State(state): State<AppState>) -> Response {
    match state.backend.health().await {
        Ok(ready) => Json(HealthBody { ai_assistant_ready: ready }).into_response(),
        Err(e) => {
            log::warn!("backend health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthBody { ai_assistant_ready: false }),
            )
                .into_response()
        }
    }
}

pub fn status_for(error: &ChatError) -> StatusCode {
    match error {
        ChatError::Validation(_) => StatusCode::BAD_REQUEST,
        ChatError::Timeout(_) => StatusCode::REQUEST_TIMEOUT,
        ChatError::Unreachable(_) => StatusCode::SERVICE_UNAVAILABLE,
        ChatError::Backend { .. } => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn gateway_error(error: &ChatError) -> Response {
    let status = status_for(error);
    match error {
        ChatError::Validation(detail) => error_response(status, "Invalid request", Some(detail.clone())),
        ChatError::Timeout(_) => error_response(
            status,
            "Request timeout - AI assistant is taking too long to respond",
            None,
        ),
        ChatError::Unreachable(_) => error_response(status, "AI assistant backend is not available", None),
        ChatError::Backend { status: upstream, body } => error_response(
            status,
            &format!("Backend server error: {}", upstream),
            Some(body.clone()),
        ),
        other => error_response(status, "Internal server error", Some(other.to_string())),
    }
}

fn error_response(status: StatusCode, error: &str, details: Option<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            error: error.to_string(),
            details,
        }),
    )
        .into_response()
}
