//! Concrete implementations of trait abstractions.
//!
//! # Adapters
//!
//! - [`ReqwestHttpClient`] - HTTP client using reqwest
//! - [`UuidIdGenerator`] - random identifiers from UUID v4
//!
//! # Mock Implementations
//!
//! The [`mock`] submodule provides test doubles:
//! - [`mock::MockHttpClient`] - Configurable streamed responses
//! - [`mock::SequentialIdGenerator`] - Deterministic identifiers

pub mod ids;
pub mod mock;
pub mod reqwest_http;

pub use ids::UuidIdGenerator;
pub use mock::{MockHttpClient, SequentialIdGenerator};
pub use reqwest_http::ReqwestHttpClient;
