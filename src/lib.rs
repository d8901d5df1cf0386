//! tutorchat - streaming chat client for an AI tutor backend
//!
//! This library exposes modules for use in integration tests.

pub mod adapters;
pub mod config;
pub mod error;
pub mod session;
pub mod stream;
pub mod traits;
