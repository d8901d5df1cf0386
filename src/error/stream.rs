//! Streaming-related error types.
//!
//! These errors end a streamed turn. The session converts each of them into a
//! terminal `Errored` state with a fixed, friendly fallback text; the details
//! here are for logs only.

use thiserror::Error;

use crate::traits::HttpError;

/// Generic message used when a failed response carries no usable `message`.
pub const GENERIC_NETWORK_FAILURE: &str = "Network response was not ok";

/// Stream-specific error variants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    /// The request never produced a response, or the body read failed.
    #[error("transport failure: {message}")]
    Transport { message: String },

    /// The backend answered with a non-success status.
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// A `data: ` frame could not be decoded.
    #[error("malformed stream frame: {message}")]
    Protocol { message: String },

    /// The backend reported a failure through an `error` event.
    #[error("backend error: {message}")]
    Backend {
        message: String,
        code: Option<String>,
    },
}

impl StreamError {
    /// Build a [`StreamError::Server`] from a failed response body.
    ///
    /// The body is expected to be a JSON object with a `message` field; any
    /// other shape falls back to [`GENERIC_NETWORK_FAILURE`].
    pub fn from_error_body(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| {
                v.get("message")
                    .and_then(|m| m.as_str())
                    .filter(|m| !m.is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| GENERIC_NETWORK_FAILURE.to_string());
        StreamError::Server { status, message }
    }

    /// The classification recorded on the session for this error.
    pub fn kind(&self) -> FailureKind {
        match self {
            StreamError::Transport { .. } => FailureKind::Transport,
            StreamError::Server { .. } => FailureKind::Server,
            StreamError::Protocol { .. } => FailureKind::Protocol,
            StreamError::Backend { .. } => FailureKind::Backend,
        }
    }

    /// Check if this error is likely transient and the turn can be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            StreamError::Transport { .. } => true,
            StreamError::Server { status, .. } => *status >= 500 || *status == 429,
            StreamError::Protocol { .. } | StreamError::Backend { .. } => false,
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            StreamError::Transport { .. } => "E_STREAM_TRANSPORT",
            StreamError::Server { .. } => "E_STREAM_SERVER",
            StreamError::Protocol { .. } => "E_STREAM_PROTOCOL",
            StreamError::Backend { .. } => "E_STREAM_BACKEND",
        }
    }
}

impl From<HttpError> for StreamError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::ServerError { status, message } => {
                StreamError::from_error_body(status, &message)
            }
            other => StreamError::Transport {
                message: other.to_string(),
            },
        }
    }
}

/// Why a turn ended in the `Errored` state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Connection or body-read failure
    Transport,
    /// Non-success HTTP status
    Server,
    /// Malformed frame
    Protocol,
    /// `error` event from the backend
    Backend,
    /// The stream completed but carried no answer text
    EmptyAnswer,
}

impl FailureKind {
    /// Returns a short label suitable for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Transport => "transport",
            FailureKind::Server => "server",
            FailureKind::Protocol => "protocol",
            FailureKind::Backend => "backend",
            FailureKind::EmptyAnswer => "empty_answer",
        }
    }
}
