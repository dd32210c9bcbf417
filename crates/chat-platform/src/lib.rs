//! Browser adapters for the chat-core ports.
//!
//! - [`storage`]: `localStorage` and in-memory key-value stores
//! - [`gateway`]: the backend gateway over `fetch`

pub mod storage;
pub mod gateway;
