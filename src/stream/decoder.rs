//! Incremental frame decoder.
//!
//! Bytes arrive split wherever the transport split them. The decoder buffers
//! raw bytes and only decodes a line once its terminating `\n` has arrived, so
//! a multi-byte UTF-8 sequence cut between two chunks is reassembled before it
//! is interpreted. `\n` never occurs inside a multi-byte sequence, which makes
//! splitting on the byte safe. Bytes that are still not valid UTF-8 are
//! replaced with U+FFFD rather than failing the frame.

use bytes::BytesMut;

use crate::error::StreamError;
use crate::stream::events::EventRecord;
use crate::stream::payloads::decode_frame;

/// Prefix marking a line that carries a frame.
pub const DATA_PREFIX: &str = "data: ";

/// Stateful decoder turning raw chunks into [`EventRecord`]s.
///
/// Feeding is push-based ([`push`](Self::push)); extraction is pull-based
/// ([`next_record`](Self::next_record)), one record per call, so callers
/// control how far ahead of the consumer decoding runs.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: BytesMut,
    /// Bytes at the start of `buffer` already known to contain no newline
    scanned: usize,
    /// Set after the first fatal error; the decoder yields nothing afterwards
    failed: bool,
    records: u64,
}

impl FrameDecoder {
    /// Create a new decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a raw chunk to the internal buffer.
    pub fn push(&mut self, chunk: &[u8]) {
        if self.failed {
            return;
        }
        self.buffer.extend_from_slice(chunk);
    }

    /// Pull the next record out of the buffered complete lines.
    ///
    /// Returns:
    /// - `Some(Ok(record))` - a frame was decoded
    /// - `Some(Err(error))` - a frame was malformed or reported a backend error;
    ///   the decoder is now failed
    /// - `None` - no complete frame is buffered (or the decoder has failed)
    pub fn next_record(&mut self) -> Option<Result<EventRecord, StreamError>> {
        while !self.failed {
            let line = self.take_line()?;
            if let Some(result) = self.decode_line(&line) {
                match &result {
                    Ok(record) => {
                        self.records += 1;
                        tracing::trace!(
                            event = record.event_type_name(),
                            index = self.records,
                            "decoded frame"
                        );
                    }
                    Err(_) => self.failed = true,
                }
                return Some(result);
            }
        }
        None
    }

    /// Signal end of input; any unterminated trailing data is discarded.
    ///
    /// Returns the number of bytes discarded.
    pub fn finish(&mut self) -> usize {
        let leftover = self.buffer.len();
        if leftover > 0 {
            tracing::debug!(bytes = leftover, "discarding unterminated trailing data");
        }
        self.buffer.clear();
        self.scanned = 0;
        leftover
    }

    /// Whether a fatal error has been reported.
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    /// Number of records decoded so far.
    pub fn records_decoded(&self) -> u64 {
        self.records
    }

    /// Bytes buffered but not yet part of a complete line.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Split the next complete line (newline included) off the buffer.
    fn take_line(&mut self) -> Option<BytesMut> {
        match self.buffer[self.scanned..].iter().position(|b| *b == b'\n') {
            Some(offset) => {
                let end = self.scanned + offset + 1;
                self.scanned = 0;
                Some(self.buffer.split_to(end))
            }
            None => {
                self.scanned = self.buffer.len();
                None
            }
        }
    }

    /// Decode one line; `None` means the line carries no frame.
    fn decode_line(&self, line: &[u8]) -> Option<Result<EventRecord, StreamError>> {
        let line = line.strip_suffix(b"\n").unwrap_or(line);
        let line = line.strip_suffix(b"\r").unwrap_or(line);

        if line.iter().all(u8::is_ascii_whitespace) {
            return None;
        }

        let Some(payload) = line.strip_prefix(DATA_PREFIX.as_bytes()) else {
            tracing::trace!(len = line.len(), "skipping non-data line");
            return None;
        };

        // Bad bytes become U+FFFD; only the JSON structure can fail a frame.
        let payload = String::from_utf8_lossy(payload);

        let frame: serde_json::Value = match serde_json::from_str(&payload) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(error = %e, payload = %payload, "failed to parse frame JSON");
                return Some(Err(StreamError::Protocol {
                    message: format!("invalid JSON in data frame: {}", e),
                }));
            }
        };

        Some(decode_frame(&frame))
    }
}
