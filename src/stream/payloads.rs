//! Field access over raw JSON frames.
//!
//! Frames are parsed into a `serde_json::Value` first and fields are pulled
//! out individually, so an unexpected type on an informational field (say, a
//! numeric `message_id`) never fails the whole frame.

use serde_json::Value;

use crate::error::StreamError;
use crate::stream::events::{EventRecord, FrameMeta};

/// Message used when an `error` event carries no `message`.
pub(crate) const UNKNOWN_SERVER_ERROR: &str = "Unknown server error";

/// Read a string field, accepting numbers as their decimal form.
fn string_field(frame: &Value, name: &str) -> Option<String> {
    match frame.get(name)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

fn frame_meta(frame: &Value) -> FrameMeta {
    FrameMeta {
        task_id: string_field(frame, "task_id"),
        message_id: string_field(frame, "message_id"),
        created_at: frame.get("created_at").and_then(Value::as_i64),
    }
}

/// Turn one parsed frame into a record, or the backend error it reports.
pub(crate) fn decode_frame(frame: &Value) -> Result<EventRecord, StreamError> {
    if !frame.is_object() {
        return Err(StreamError::Protocol {
            message: format!("frame payload is not a JSON object: {}", frame),
        });
    }

    let event = string_field(frame, "event").unwrap_or_default();
    let meta = frame_meta(frame);

    match event.as_str() {
        "message" | "agent_message" => Ok(EventRecord::Message {
            answer: string_field(frame, "answer").unwrap_or_default(),
            meta,
        }),
        "message_end" => Ok(EventRecord::MessageEnd {
            conversation_id: non_empty(string_field(frame, "conversation_id")),
            meta,
        }),
        "error" => Err(StreamError::Backend {
            message: non_empty(string_field(frame, "message"))
                .unwrap_or_else(|| UNKNOWN_SERVER_ERROR.to_string()),
            code: string_field(frame, "code"),
        }),
        _ => Ok(EventRecord::Other { event, meta }),
    }
}
