//! Request body for a streamed chat turn.

use serde::{Deserialize, Serialize};

/// How the backend should deliver the answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseMode {
    /// Newline-delimited `data: ` frames
    #[default]
    Streaming,
}

/// Request body for `POST /chat-messages`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatRequest {
    /// The user's message
    pub query: String,
    /// Participant id
    pub user: String,
    pub response_mode: ResponseMode,
    /// Continuity token; empty starts a new conversation
    pub conversation_id: String,
    /// App variables; always an object
    pub inputs: serde_json::Value,
    /// Attached files; none are sent
    pub files: Vec<serde_json::Value>,
}

impl ChatRequest {
    /// Create a streaming request.
    ///
    /// Pass an empty `conversation_id` to start a new conversation.
    pub fn new(
        query: impl Into<String>,
        user: impl Into<String>,
        conversation_id: impl Into<String>,
    ) -> Self {
        Self {
            query: query.into(),
            user: user.into(),
            response_mode: ResponseMode::Streaming,
            conversation_id: conversation_id.into(),
            inputs: serde_json::Value::Object(serde_json::Map::new()),
            files: Vec::new(),
        }
    }

    /// Set the app input variables.
    pub fn with_inputs(mut self, inputs: serde_json::Map<String, serde_json::Value>) -> Self {
        self.inputs = serde_json::Value::Object(inputs);
        self
    }

    /// Whether this request starts a new conversation.
    pub fn is_new_conversation(&self) -> bool {
        self.conversation_id.is_empty()
    }
}
