//! Conversation id handoff between turns.

/// Conversation id threading several turns into one backend conversation.
///
/// Empty until the backend assigns an id; after that the first committed
/// value is kept for the life of the session. Only [`clear`](Self::clear)
/// (a new conversation) resets it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContinuityToken(Option<String>);

impl ContinuityToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the id assigned by the backend.
    ///
    /// Returns `true` if the token was empty and now holds `id`. Empty ids
    /// and any id after the first are ignored.
    pub fn commit(&mut self, id: &str) -> bool {
        if self.0.is_some() || id.is_empty() {
            return false;
        }
        self.0 = Some(id.to_string());
        true
    }

    /// The committed id, or `""` for a new conversation.
    pub fn as_str(&self) -> &str {
        self.0.as_deref().unwrap_or("")
    }

    pub fn get(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    pub fn clear(&mut self) {
        self.0 = None;
    }
}
