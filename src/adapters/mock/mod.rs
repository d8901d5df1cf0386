//! Mock implementations for testing.
//!
//! # Available Mocks
//!
//! - [`MockHttpClient`] - HTTP client with configurable streamed responses
//! - [`SequentialIdGenerator`] - Counter-based identifiers

pub mod http;
pub mod ids;

pub use http::{MockHttpClient, MockResponse, RecordedRequest};
pub use ids::SequentialIdGenerator;
