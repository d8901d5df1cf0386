//! Session status and turn identity.

use std::fmt;

use crate::error::FailureKind;

/// Lifecycle state of a conversation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    /// No turn has been started yet
    #[default]
    Idle,
    /// Request sent, no answer fragment received yet
    AwaitingFirstByte,
    /// At least one answer fragment received
    Streaming,
    /// Completed with a non-empty answer
    Settled,
    /// Ended with a fallback message
    Errored(FailureKind),
    /// Stopped by the user; partial text kept
    StoppedByUser,
}

impl SessionStatus {
    /// Whether a turn is currently in flight.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::AwaitingFirstByte | Self::Streaming)
    }

    /// Whether the last turn has ended (or none was started).
    pub fn is_terminal(&self) -> bool {
        !self.is_in_flight()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::AwaitingFirstByte => "awaiting_first_byte",
            Self::Streaming => "streaming",
            Self::Settled => "settled",
            Self::Errored(_) => "errored",
            Self::StoppedByUser => "stopped_by_user",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Errored(kind) => write!(f, "errored ({})", kind.as_str()),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Identifies one send within a session.
///
/// Ids increase monotonically; updates tagged with anything but the active
/// turn's id are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TurnId(pub(crate) u64);

impl TurnId {
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TurnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "turn-{}", self.0)
    }
}
