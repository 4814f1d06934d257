//! Line framing for `text/event-stream` bodies.
//!
//! Network chunks do not respect line boundaries, so [`SseLineDecoder`]
//! keeps the undelimited tail of every chunk and only hands out complete
//! lines. It buffers bytes rather than text: a multi-byte character split
//! across two chunks is decoded once both halves have arrived.

use gemchat_models::{DATA_PREFIX, StreamPayload};

#[derive(Debug, Default)]
pub struct SseLineDecoder {
    buffer: Vec<u8>,
}

impl SseLineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk and return every line it completed, without the line
    /// terminator (`\n` or `\r\n`).
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut lines = Vec::new();
        let mut start = 0;
        while let Some(offset) = self.buffer[start..].iter().position(|b| *b == b'\n') {
            let end = start + offset;
            lines.push(decode_line(&self.buffer[start..end]));
            start = end + 1;
        }
        self.buffer.drain(..start);

        lines
    }

    /// End of stream: return the trailing unterminated line, if any.
    pub fn finish(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }
        let line = decode_line(&self.buffer);
        self.buffer.clear();
        Some(line)
    }
}

fn decode_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

/// The value of a `data: ` line, or `None` for any other line.
pub fn data_field(line: &str) -> Option<&str> {
    line.strip_prefix(DATA_PREFIX)
}

/// Parse a chat stream line. `None` when the line carries no payload.
pub fn parse_payload(line: &str) -> Option<Result<StreamPayload, serde_json::Error>> {
    data_field(line).map(serde_json::from_str)
}
