//! Chat backend client.
//!
//! Sends one turn to `POST {base}/chat-messages` and exposes the response as a
//! pull-based stream of [`EventRecord`]s.

use futures_util::stream::{self, Stream};
use futures_util::StreamExt;
use std::pin::Pin;

use crate::config::ChatConfig;
use crate::error::StreamError;
use crate::stream::cancel::CancelSignal;
use crate::stream::decoder::FrameDecoder;
use crate::stream::events::EventRecord;
use crate::stream::request::ChatRequest;
use crate::traits::{ByteStream, Headers, HttpClient};

/// Ordered records of one turn.
///
/// Ends after the first `Err`, at end of body, or as soon as the turn is
/// cancelled. Cancellation ends it silently.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<EventRecord, StreamError>> + Send>>;

/// Client for the streaming chat endpoint.
pub struct ChatStreamClient<C> {
    config: ChatConfig,
    http: C,
}

impl<C: HttpClient> ChatStreamClient<C> {
    pub fn new(config: ChatConfig, http: C) -> Self {
        Self { config, http }
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    pub fn http(&self) -> &C {
        &self.http
    }

    fn headers(&self) -> Headers {
        let mut headers = Headers::new();
        headers.insert("Authorization".to_string(), self.config.authorization());
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert("Accept".to_string(), "text/event-stream".to_string());
        headers
    }

    /// Start a turn and return its record stream.
    ///
    /// Fails with [`StreamError::Transport`] or [`StreamError::Server`] when
    /// no response body could be obtained. If `signal` fires before the
    /// response arrives, an empty stream is returned instead of an error.
    pub async fn stream_chat(
        &self,
        request: &ChatRequest,
        signal: CancelSignal,
    ) -> Result<EventStream, StreamError> {
        let url = self.config.chat_messages_url();
        let body = serde_json::to_string(request).map_err(|e| StreamError::Protocol {
            message: format!("failed to encode request: {}", e),
        })?;
        let headers = self.headers();

        tracing::debug!(
            url = %url,
            user = %request.user,
            new_conversation = request.is_new_conversation(),
            "opening chat stream"
        );

        let bytes = tokio::select! {
            biased;
            _ = signal.cancelled() => {
                tracing::debug!("turn cancelled before response arrived");
                let empty: EventStream = Box::pin(stream::empty());
                return Ok(empty);
            }
            result = self.http.post_stream(&url, &body, &headers) => result.map_err(|e| {
                tracing::warn!(error = %e, "chat request failed");
                StreamError::from(e)
            })?,
        };

        Ok(decode_stream(bytes, signal))
    }
}

struct DecodeState {
    bytes: ByteStream,
    decoder: FrameDecoder,
    signal: CancelSignal,
    done: bool,
}

/// Decode a response body into records, honouring `signal`.
///
/// A transport chunk is only read once every record decoded from the previous
/// chunk has been pulled, and cancellation is checked before every record is
/// handed out, so records already sitting in the decoder are dropped too.
pub fn decode_stream(bytes: ByteStream, signal: CancelSignal) -> EventStream {
    let state = DecodeState {
        bytes,
        decoder: FrameDecoder::new(),
        signal,
        done: false,
    };

    let records = stream::unfold(state, |mut state| async move {
        if state.done {
            return None;
        }
        loop {
            if state.signal.is_cancelled() {
                tracing::debug!(
                    records = state.decoder.records_decoded(),
                    "stream stopped by cancellation"
                );
                return None;
            }

            if let Some(item) = state.decoder.next_record() {
                state.done = item.is_err();
                return Some((item, state));
            }

            let next = tokio::select! {
                biased;
                _ = state.signal.cancelled() => continue,
                next = state.bytes.next() => next,
            };

            match next {
                Some(Ok(chunk)) => state.decoder.push(&chunk),
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "stream read failed");
                    state.done = true;
                    return Some((Err(StreamError::from(e)), state));
                }
                None => {
                    state.decoder.finish();
                    tracing::debug!(
                        records = state.decoder.records_decoded(),
                        "stream ended"
                    );
                    return None;
                }
            }
        }
    });

    Box::pin(records.fuse())
}
