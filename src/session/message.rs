//! Messages published to the UI.

use chrono::{DateTime, Utc};

use super::splitter::{split_assistant, split_user, ParsedContent, ReasoningMarkers};

/// Shown when a turn completes without any answer text.
pub const EMPTY_ANSWER_FALLBACK: &str = "I'm drawing a blank here! 🤔 Could you rephrase your question? I want to make sure I give you the best possible answer!";

/// Shown when a turn fails for any transport, protocol or backend reason.
pub const TRANSIENT_FAILURE_FALLBACK: &str = "Oops! 🤖 Looks like my circuits are a bit overloaded right now. Let's try that again in a moment when I've had a chance to cool down my processors! 🌬️";

/// Appended to the partial answer of a stopped turn.
pub const STOPPED_MARKER: &str = " [Stopped by user]";

/// Content of the assistant message before its first fragment arrives.
pub const THINKING_PLACEHOLDER: &str = "Thinking...";

/// Opening message for a tutor chat.
pub fn tutor_greeting(tutor_name: &str, subject: &str) -> String {
    format!(
        "Hi! I'm {}. Feel free to ask any questions about this {} lesson. I'm here to help you understand the content better! 📚",
        tutor_name, subject
    )
}

/// One entry of the conversation as the UI renders it.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: String,
    /// Raw text as received
    pub content: String,
    pub is_ai: bool,
    /// Placeholder still waiting for the first fragment
    pub thinking: bool,
    pub is_error: bool,
    pub is_stopped: bool,
    /// `content` split into reasoning and answer
    pub display: ParsedContent,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(id: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            id: id.into(),
            display: split_user(&content),
            content,
            is_ai: false,
            thinking: false,
            is_error: false,
            is_stopped: false,
            created_at: Utc::now(),
        }
    }

    /// A complete assistant message, e.g. a greeting.
    pub fn assistant(
        id: impl Into<String>,
        content: impl Into<String>,
        markers: &ReasoningMarkers,
    ) -> Self {
        let content = content.into();
        Self {
            id: id.into(),
            display: split_assistant(&content, markers),
            content,
            is_ai: true,
            thinking: false,
            is_error: false,
            is_stopped: false,
            created_at: Utc::now(),
        }
    }

    /// The assistant message of a turn that has just been sent.
    ///
    /// `content` holds the placeholder text; `display` carries no answer yet.
    pub fn placeholder(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: THINKING_PLACEHOLDER.to_string(),
            is_ai: true,
            thinking: true,
            is_error: false,
            is_stopped: false,
            display: ParsedContent::default(),
            created_at: Utc::now(),
        }
    }

    /// Replace the content with a fixed fallback and flag the message.
    pub(crate) fn set_error(&mut self, fallback: &str) {
        self.content = fallback.to_string();
        self.display = split_user(fallback);
        self.thinking = false;
        self.is_error = true;
    }

    /// Text the UI shows as the answer.
    pub fn answer_text(&self) -> Option<&str> {
        self.display.answer_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder() {
        let msg = ChatMessage::placeholder("m1");
        assert!(msg.is_ai);
        assert!(msg.thinking);
        assert_eq!(msg.content, THINKING_PLACEHOLDER);
        assert_eq!(msg.answer_text(), Some(""));
        assert!(!msg.display.has_reasoning_block());
    }

    #[test]
    fn test_user_message_is_trimmed_for_display() {
        let msg = ChatMessage::user("m1", "  What is inertia? ");
        assert!(!msg.is_ai);
        assert_eq!(msg.content, "  What is inertia? ");
        assert_eq!(msg.answer_text(), Some("What is inertia?"));
    }

    #[test]
    fn test_set_error() {
        let mut msg = ChatMessage::placeholder("m1");
        msg.set_error(TRANSIENT_FAILURE_FALLBACK);
        assert!(msg.is_error);
        assert!(!msg.thinking);
        assert_eq!(msg.answer_text(), Some(TRANSIENT_FAILURE_FALLBACK));
    }

    #[test]
    fn test_greeting() {
        let greeting = tutor_greeting("Ada", "Physics");
        assert!(greeting.starts_with("Hi! I'm Ada."));
        assert!(greeting.contains("this Physics lesson"));

        let msg = ChatMessage::assistant("m0", greeting.clone(), &ReasoningMarkers::dify());
        assert!(msg.is_ai);
        assert_eq!(msg.answer_text(), Some(greeting.as_str()));
    }
}
