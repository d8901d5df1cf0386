//! Common test utilities for integration tests.
//!
//! Frame builders and session fixtures shared by the test binaries.
//!
//! # Example
//!
//! ```ignore
//! let mock = MockHttpClient::new();
//! mock.set_response(CHAT_URL, MockResponse::chunks([message("Hi"), message_end("conv-1")]));
//! let mut session = test_session(&mock);
//! ```

#![allow(dead_code)]

use std::sync::Arc;

use bytes::Bytes;

pub use tutorchat::adapters::mock::{MockHttpClient, MockResponse, SequentialIdGenerator};
use tutorchat::config::ChatConfig;
use tutorchat::session::ConversationSession;
use tutorchat::stream::ChatStreamClient;

/// Base URL every mock-backed session talks to.
pub const BASE_URL: &str = "https://tutor.example.com/v1";
/// The chat endpoint under [`BASE_URL`].
pub const CHAT_URL: &str = "https://tutor.example.com/v1/chat-messages";
pub const API_KEY: &str = "app-test-key";

/// A `data: ` line followed by the blank separator line.
pub fn frame(payload: serde_json::Value) -> String {
    format!("data: {}\n\n", payload)
}

pub fn message(answer: &str) -> String {
    frame(serde_json::json!({
        "event": "message",
        "task_id": "task-1",
        "message_id": "msg-1",
        "answer": answer,
        "created_at": 1_705_395_332
    }))
}

pub fn message_end(conversation_id: &str) -> String {
    frame(serde_json::json!({
        "event": "message_end",
        "task_id": "task-1",
        "message_id": "msg-1",
        "conversation_id": conversation_id
    }))
}

pub fn error_event(message: &str) -> String {
    frame(serde_json::json!({
        "event": "error",
        "status": 400,
        "code": "invalid_param",
        "message": message
    }))
}

/// Split `body` into chunks of at most `size` bytes, ignoring UTF-8 boundaries.
pub fn chunked(body: &str, size: usize) -> Vec<Bytes> {
    body.as_bytes()
        .chunks(size)
        .map(Bytes::copy_from_slice)
        .collect()
}

pub fn test_client(mock: &MockHttpClient) -> Arc<ChatStreamClient<MockHttpClient>> {
    Arc::new(ChatStreamClient::new(
        ChatConfig::new(BASE_URL, API_KEY),
        mock.clone(),
    ))
}

/// A session over `mock` with deterministic ids.
pub fn test_session(mock: &MockHttpClient) -> ConversationSession<MockHttpClient> {
    ConversationSession::new(test_client(mock), Arc::new(SequentialIdGenerator::new()))
}
