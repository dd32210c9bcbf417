//! WASM-target tests for chat-types.
//!
//! Mirrors a subset of the native unit tests under wasm32-unknown-unknown
//! via `wasm-pack test --node`.

use wasm_bindgen_test::*;

use chat_types::message::*;
use chat_types::session::*;
use chat_types::wire::*;
use chat_types::ChatError;

#[wasm_bindgen_test]
fn message_user() {
    let msg = Message::user("Hello");
    assert_eq!(msg.role, Role::User);
    assert_eq!(msg.content, "Hello");
}

#[wasm_bindgen_test]
fn message_timestamp_serializes_as_rfc3339() {
    let msg = Message::assistant("Hi");
    let json = serde_json::to_value(&msg).unwrap();
    let stamp = json["created_at"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(stamp).is_ok());
}

#[wasm_bindgen_test]
fn session_roundtrip() {
    let mut session = ChatSession::new(Mode::Spiritual);
    session.messages.push(Message::user("peace"));
    let json = serde_json::to_string(&session).unwrap();
    let back: ChatSession = serde_json::from_str(&json).unwrap();
    assert_eq!(back, session);
}

#[wasm_bindgen_test]
fn title_truncation() {
    let title = derive_title("0123456789012345678901234567890123456789");
    assert_eq!(title, "012345678901234567890123456789...");
}

#[wasm_bindgen_test]
fn reply_error_status_is_backend_error() {
    let err = interpret_chat_reply(200, r#"{"status":"error"}"#).unwrap_err();
    assert!(matches!(err, ChatError::Backend { .. }));
}
