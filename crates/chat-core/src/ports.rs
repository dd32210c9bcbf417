//! Port traits: the hexagonal architecture boundary.
//!
//! These traits are defined here in `chat-core` (pure Rust).
//! Implementations live in `chat-platform` (browser adapters).
//! The core never imports platform code; it only depends on these traits.

use async_trait::async_trait;
use chat_types::{message::AssistantReply, session::Mode, Result};

// ─── Gateway Port ────────────────────────────────────────────

/// The remote AI backend. One request shape, one reply shape.
#[async_trait(?Send)]
pub trait GatewayPort {
    /// Send a user message and wait for the assistant's reply.
    /// Fails with `Timeout`, `Unreachable` or `Backend`.
    async fn send(&self, message: &str, mode: Mode) -> Result<AssistantReply>;

    /// Whether the backend reports itself ready. Display only.
    async fn check_health(&self) -> Result<bool>;
}

// ─── Storage Port ────────────────────────────────────────────

/// Synchronous string key-value store (browser `localStorage` semantics).
pub trait StoragePort {
    /// Get a value by key
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Set a value
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a value
    fn delete(&self, key: &str) -> Result<()>;

    /// List keys with a given prefix
    fn list_keys(&self, prefix: &str) -> Result<Vec<String>>;

    /// Check if a key exists
    fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Name of this backend (for logging/debug)
    fn backend_name(&self) -> &str;
}
