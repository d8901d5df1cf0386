//! Error types for the chat streaming pipeline.
//!
//! - [`StreamError`] - everything that can end a streamed turn early
//! - [`FailureKind`] - the coarse classification a session records when a turn errors
//! - [`ConfigError`] - missing or invalid configuration
//!
//! User cancellation has no variant here: a stopped turn is a clean
//! termination, never an error.

mod config;
mod stream;

pub use config::ConfigError;
pub use stream::{FailureKind, StreamError};
