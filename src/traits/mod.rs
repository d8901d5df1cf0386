//! Trait abstractions for dependency injection and testability.
//!
//! # Traits
//!
//! - [`HttpClient`] - streaming POST against the chat backend
//! - [`IdGenerator`] - participant and message identifiers

pub mod http;
pub mod ids;

pub use http::{ByteStream, Headers, HttpClient, HttpError};
pub use ids::IdGenerator;
