//! Chat proxy: the inbound `/api/chat` endpoint.
//!
//! Accepts chat requests from the web front-end, validates them, forwards
//! them to the AI backend and maps gateway failures to HTTP statuses.

pub mod backend;
pub mod config;
pub mod server;

#[cfg(test)]
mod tests;
