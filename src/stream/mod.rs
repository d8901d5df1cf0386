//! Streaming chat protocol consumer.
//!
//! The chat backend answers a POST to `/chat-messages` with a body of
//! newline-terminated lines; lines of the form `data: <json>` carry one event
//! each. This module turns that byte stream into ordered [`EventRecord`]s.
//!
//! # Module structure
//! - `events` - Decoded record types ([`EventRecord`], [`FrameMeta`])
//! - `payloads` - Field access over the raw JSON frame
//! - `decoder` - Line splitting and frame decoding ([`FrameDecoder`])
//! - `cancel` - Owned cancellation handle ([`CancelHandle`], [`CancelSignal`])
//! - `request` - Request body ([`ChatRequest`])
//! - `client` - HTTP call and pull-based record stream ([`ChatStreamClient`])

mod cancel;
mod client;
mod decoder;
mod events;
mod payloads;
mod request;

pub use cancel::{CancelHandle, CancelSignal};
pub use client::{decode_stream, ChatStreamClient, EventStream};
pub use decoder::{FrameDecoder, DATA_PREFIX};
pub use events::{EventRecord, FrameMeta};
pub use request::{ChatRequest, ResponseMode};
