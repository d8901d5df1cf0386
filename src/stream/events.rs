//! Decoded stream records.

/// Metadata the backend attaches to frames.
///
/// Informational only; nothing in the pipeline depends on it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FrameMeta {
    /// Backend task executing this turn
    pub task_id: Option<String>,
    /// Id of the assistant message being produced
    pub message_id: Option<String>,
    /// Unix timestamp in seconds
    pub created_at: Option<i64>,
}

/// One decoded frame from the response stream.
///
/// `error` frames never become records; the decoder raises them as
/// [`crate::error::StreamError::Backend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventRecord {
    /// Next chunk of assistant text
    Message { answer: String, meta: FrameMeta },
    /// Stream completion; carries the conversation id the backend assigned
    MessageEnd {
        conversation_id: Option<String>,
        meta: FrameMeta,
    },
    /// Any other event the backend emits (`ping`, `workflow_started`, ...)
    Other { event: String, meta: FrameMeta },
}

impl EventRecord {
    /// Returns the event type name as a string for debugging purposes.
    pub fn event_type_name(&self) -> &str {
        match self {
            EventRecord::Message { .. } => "message",
            EventRecord::MessageEnd { .. } => "message_end",
            EventRecord::Other { event, .. } => event,
        }
    }

    /// The answer fragment, for `Message` records.
    pub fn answer(&self) -> Option<&str> {
        match self {
            EventRecord::Message { answer, .. } => Some(answer),
            _ => None,
        }
    }

    pub fn meta(&self) -> &FrameMeta {
        match self {
            EventRecord::Message { meta, .. }
            | EventRecord::MessageEnd { meta, .. }
            | EventRecord::Other { meta, .. } => meta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let record = EventRecord::Message {
            answer: "Hi".to_string(),
            meta: FrameMeta {
                task_id: Some("task-1".to_string()),
                ..FrameMeta::default()
            },
        };
        assert_eq!(record.event_type_name(), "message");
        assert_eq!(record.answer(), Some("Hi"));
        assert_eq!(record.meta().task_id.as_deref(), Some("task-1"));

        let other = EventRecord::Other {
            event: "ping".to_string(),
            meta: FrameMeta::default(),
        };
        assert_eq!(other.event_type_name(), "ping");
        assert_eq!(other.answer(), None);
    }
}
