//! Line decoder for the `text/event-stream` format served by `api/sse`.
//!
//! ```text
//! id: 7
//! event: health
//! data: {"peer":"tls://1.2.3.4:443","ping":12}
//!
//! ```
//!
//! The decoder is fed one line at a time (without the line terminator) and
//! yields a frame on every blank line that follows at least one field.

use crate::error::Result;
use crate::events::{EventKind, RawEvent};

/// Event name used when a frame carries no `event:` field.
pub const DEFAULT_EVENT: &str = "message";

/// A complete frame before its event name has been checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    pub id: Option<String>,
    pub event: String,
    pub data: String,
}

impl SseFrame {
    /// Tag the frame with its kind and arrival time.
    pub fn into_raw(self, received_at_ms: u64) -> Result<RawEvent> {
        let kind: EventKind = self.event.parse()?;
        Ok(RawEvent {
            id: self.id,
            kind,
            data: self.data,
            received_at_ms,
        })
    }
}

/// Incremental decoder state.
#[derive(Debug, Default)]
pub struct SseDecoder {
    id: Option<String>,
    event: Option<String>,
    data: Vec<String>,
    dirty: bool,
    poisoned: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one line. Returns a frame when the line terminates one.
    pub fn push_line(&mut self, line: &str) -> Option<SseFrame> {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.is_empty() {
            return self.take_frame();
        }
        if line.starts_with(':') {
            return None;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "id" => self.id = Some(value.to_string()),
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            other => {
                tracing::trace!(field = other, "ignoring sse field");
                return None;
            }
        }
        self.dirty = true;
        None
    }

    /// Record a line that could not be decoded as text. The frame it
    /// belongs to is dropped when it terminates.
    pub fn push_invalid(&mut self) {
        self.dirty = true;
        self.poisoned = true;
    }

    /// Flush a trailing frame not followed by a blank line.
    pub fn finish(&mut self) -> Option<SseFrame> {
        self.take_frame()
    }

    fn take_frame(&mut self) -> Option<SseFrame> {
        if !std::mem::take(&mut self.dirty) {
            return None;
        }
        if std::mem::take(&mut self.poisoned) {
            self.id = None;
            self.event = None;
            self.data.clear();
            tracing::warn!("dropping sse frame with undecodable line");
            return None;
        }
        let frame = SseFrame {
            id: self.id.take(),
            event: self.event.take().unwrap_or_else(|| DEFAULT_EVENT.to_string()),
            data: std::mem::take(&mut self.data).join("\n"),
        };
        Some(frame)
    }
}

/// Decode a whole transcript.
pub fn decode_all(text: &str) -> Vec<SseFrame> {
    let mut decoder = SseDecoder::new();
    let mut frames: Vec<SseFrame> = text.lines().filter_map(|l| decoder.push_line(l)).collect();
    frames.extend(decoder.finish());
    frames
}
