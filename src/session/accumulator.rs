//! Answer text accumulated over one turn.

/// Answer text of one turn, built from streamed fragments.
///
/// Append-only until frozen. A turn freezes its accumulator when it ends for
/// any reason, after which late fragments are rejected.
#[derive(Debug, Clone, Default)]
pub struct ResponseAccumulator {
    full_text: String,
    fragments: usize,
    frozen: bool,
}

impl ResponseAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fragment. Returns `false` (and drops it) once frozen.
    pub fn append(&mut self, fragment: &str) -> bool {
        if self.frozen {
            tracing::debug!(len = fragment.len(), "dropping fragment after freeze");
            return false;
        }
        self.full_text.push_str(fragment);
        self.fragments += 1;
        true
    }

    pub fn full_text(&self) -> &str {
        &self.full_text
    }

    /// Number of fragments appended so far, empty ones included.
    pub fn fragment_count(&self) -> usize {
        self.fragments
    }

    /// Whether the answer carries no visible text.
    pub fn is_empty(&self) -> bool {
        self.full_text.trim().is_empty()
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }
}
