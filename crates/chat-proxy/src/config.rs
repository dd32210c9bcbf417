use chat_types::config::{ChatConfig, GatewayConfig, BACKEND_URL_ENV};

/// Environment variable selecting the listen address
pub const PROXY_ADDR_ENV: &str = "CHAT_PROXY_ADDR";

pub const DEFAULT_PROXY_ADDR: &str = "127.0.0.1:3000";

#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub bind_addr: String,
    pub gateway: GatewayConfig,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_PROXY_ADDR.to_string(),
            gateway: GatewayConfig::default(),
        }
    }
}

impl ProxyConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Blank values keep the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let gateway = ChatConfig::default()
            .with_backend_url(lookup(BACKEND_URL_ENV).as_deref())
            .gateway;
        let bind_addr = lookup(PROXY_ADDR_ENV)
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| DEFAULT_PROXY_ADDR.to_string());
        Self { bind_addr, gateway }
    }
}
