use serde::{Deserialize, Serialize};

/// Environment variable selecting the backend base URL
pub const BACKEND_URL_ENV: &str = "CHAT_BACKEND_URL";

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5000";

/// Top-level configuration, built once at startup and handed to each component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    pub gateway: GatewayConfig,
    pub storage: StorageConfig,
    pub scroll: ScrollConfig,
    /// Seed an empty collection with the built-in demo conversations
    pub seed_mock_sessions: bool,
    /// Seconds between backend health checks
    pub health_poll_secs: f64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig::default(),
            storage: StorageConfig::default(),
            scroll: ScrollConfig::default(),
            seed_mock_sessions: false,
            health_poll_secs: 30.0,
        }
    }
}

impl ChatConfig {
    /// Override the backend URL; blank or missing values keep the default.
    pub fn with_backend_url(mut self, url: Option<&str>) -> Self {
        if let Some(url) = url.map(str::trim).filter(|u| !u.is_empty()) {
            self.gateway.base_url = url.trim_end_matches('/').to_string();
        }
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub base_url: String,
    pub chat_path: String,
    pub health_path: String,
    pub request_timeout_ms: u64,
    pub health_timeout_ms: u64,
    /// Send `{message, mode}`; when false only `{message}` is sent
    pub forward_mode: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BACKEND_URL.to_string(),
            chat_path: "/get_response".to_string(),
            health_path: "/health".to_string(),
            request_timeout_ms: 30_000,
            health_timeout_ms: 5_000,
            forward_mode: true,
        }
    }
}

impl GatewayConfig {
    pub fn chat_url(&self) -> String {
        format!("{}{}", self.base_url, self.chat_path)
    }

    pub fn health_url(&self) -> String {
        format!("{}{}", self.base_url, self.health_path)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackendType,
    /// Prefix for every persisted key
    pub namespace: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackendType::Auto,
            namespace: "chat".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageBackendType {
    /// Use `localStorage` when the browser offers it, memory otherwise
    Auto,
    Memory,
    LocalStorage,
}

/// Tuning for the scroll/viewport controller. Distances in points, times in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrollConfig {
    pub bottom_threshold: f32,
    pub top_threshold: f32,
    pub manual_cooldown_secs: f64,
    pub follow_interval_secs: f64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            bottom_threshold: 48.0,
            top_threshold: 8.0,
            manual_cooldown_secs: 1.0,
            follow_interval_secs: 0.1,
        }
    }
}
