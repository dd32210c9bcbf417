#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use axum::{body::to_bytes, extract::State, http::StatusCode, response::Response, Json};
    use serde_json::Value;

    use crate::backend::ChatBackend;
    use crate::config::{ProxyConfig, DEFAULT_PROXY_ADDR, PROXY_ADDR_ENV};
    use crate::server::{self, status_for, AppState};
    use chat_types::config::{BACKEND_URL_ENV, DEFAULT_BACKEND_URL};
    use chat_types::message::AssistantReply;
    use chat_types::session::Mode;
    use chat_types::wire::InboundChatRequest;
    use chat_types::ChatError;

    /// Replays a fixed outcome and records what it was asked
    struct MockBackend {
        reply: Result<String, ChatError>,
        healthy: Result<bool, ChatError>,
        calls: Mutex<Vec<(String, Mode)>>,
    }

    impl MockBackend {
        fn replying(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(text.to_string()),
                healthy: Ok(true),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn failing(error: ChatError) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(error.clone()),
                healthy: Err(error),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<(String, Mode)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatBackend for MockBackend {
        async fn chat(&self, message: &str, mode: Mode) -> chat_types::Result<AssistantReply> {
            self.calls.lock().unwrap().push((message.to_string(), mode));
            self.reply.clone().map(AssistantReply::text)
        }

        async fn health(&self) -> chat_types::Result<bool> {
            self.healthy.clone()
        }
    }

    fn state(backend: &Arc<MockBackend>) -> State<AppState> {
        State(AppState::new(backend.clone()))
    }

    fn request(message: Option<&str>, mode: Option<&str>) -> Result<Json<InboundChatRequest>, axum::extract::rejection::JsonRejection> {
        Ok(Json(InboundChatRequest {
            message: message.map(str::to_string),
            mode: mode.map(str::to_string),
        }))
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    // ─── Chat endpoint ───────────────────────────────────────

    #[tokio::test]
    async fn test_chat_success() {
        let backend = MockBackend::replying("Hi there");
        let response = server::chat(state(&backend), request(Some("  Hello "), Some("spiritual"))).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["response"], "Hi there");
        assert_eq!(backend.calls(), vec![("Hello".to_string(), Mode::Spiritual)]);
    }

    #[tokio::test]
    async fn test_chat_defaults_to_general() {
        let backend = MockBackend::replying("ok");
        server::chat(state(&backend), request(Some("hi"), None)).await;
        assert_eq!(backend.calls()[0].1, Mode::General);
    }

    #[tokio::test]
    async fn test_chat_blank_message_rejected() {
        let backend = MockBackend::replying("never");
        for message in [None, Some(""), Some("   ")] {
            let response = server::chat(state(&backend), request(message, None)).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(body_json(response).await["error"], "Message is required");
        }
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_chat_invalid_mode_rejected() {
        let backend = MockBackend::replying("never");
        let response = server::chat(state(&backend), request(Some("hi"), Some("cosmic"))).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Invalid mode");
        assert!(body["details"].is_string());
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_chat_gateway_failures() {
        let cases = [
            (ChatError::Timeout(30_000), StatusCode::REQUEST_TIMEOUT),
            (ChatError::Unreachable("refused".into()), StatusCode::SERVICE_UNAVAILABLE),
            (
                ChatError::Backend { status: 500, body: "boom".into() },
                StatusCode::BAD_GATEWAY,
            ),
            (ChatError::Serialization("bad".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, expected) in cases {
            let backend = MockBackend::failing(error);
            let response = server::chat(state(&backend), request(Some("hi"), None)).await;
            assert_eq!(response.status(), expected);
            assert!(body_json(response).await["error"].is_string());
        }
    }

    #[tokio::test]
    async fn test_chat_backend_error_details() {
        let backend = MockBackend::failing(ChatError::Backend {
            status: 500,
            body: "model crashed".into(),
        });
        let body = body_json(server::chat(state(&backend), request(Some("hi"), None)).await).await;
        assert_eq!(body["error"], "Backend server error: 500");
        assert_eq!(body["details"], "model crashed");
    }

    // ─── Health endpoint ─────────────────────────────────────

    #[tokio::test]
    async fn test_health_ready() {
        let backend = MockBackend::replying("");
        let response = server::health(state(&backend)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["ai_assistant_ready"], true);
    }

    #[tokio::test]
    async fn test_health_down() {
        let backend = MockBackend::failing(ChatError::Unreachable("refused".into()));
        let response = server::health(state(&backend)).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body_json(response).await["ai_assistant_ready"], false);
    }

    // ─── Status mapping & config ─────────────────────────────

    #[test]
    fn test_status_for() {
        assert_eq!(status_for(&ChatError::Validation("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(&ChatError::Config("x".into())), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_config_defaults() {
        let config = ProxyConfig::from_lookup(|_| None);
        assert_eq!(config.bind_addr, DEFAULT_PROXY_ADDR);
        assert_eq!(config.gateway.base_url, DEFAULT_BACKEND_URL);
    }

    #[test]
    fn test_config_from_lookup() {
        let config = ProxyConfig::from_lookup(|key| match key {
            k if k == PROXY_ADDR_ENV => Some(" 0.0.0.0:8080 ".to_string()),
            k if k == BACKEND_URL_ENV => Some("http://ai.local:9000/".to_string()),
            _ => None,
        });
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.gateway.chat_url(), "http://ai.local:9000/get_response");
    }
}
