//! Identifier generation trait.
//!
//! Participant ids and message ids are produced through this trait so tests
//! can substitute a deterministic sequence.

/// Number of random characters in a participant id.
const PARTICIPANT_SUFFIX_LEN: usize = 9;

/// Source of unique identifiers.
pub trait IdGenerator: Send + Sync {
    /// Produce a fresh identifier.
    fn next_id(&self) -> String;

    /// Produce a participant id of the form `user-<suffix>`.
    ///
    /// The suffix is the first nine ASCII alphanumerics of [`next_id`](Self::next_id),
    /// lowercased.
    fn participant_id(&self) -> String {
        let suffix: String = self
            .next_id()
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_lowercase())
            .take(PARTICIPANT_SUFFIX_LEN)
            .collect();
        format!("user-{}", suffix)
    }
}
