//! Incremental UTF-8 decoding across chunk boundaries.

use crate::error::{Error, Result};

/// Decodes a byte stream chunk by chunk.
///
/// A multi-byte sequence split across two chunks is held back and completed
/// by the next call, so every returned string is valid on its own.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `chunk`, returning all text that is complete so far.
    pub fn decode(&mut self, chunk: &[u8]) -> Result<String> {
        self.pending.extend_from_slice(chunk);
        match std::str::from_utf8(&self.pending) {
            Ok(text) => {
                let text = text.to_string();
                self.pending.clear();
                Ok(text)
            }
            // Incomplete sequence at the tail: keep it for the next chunk.
            Err(e) if e.error_len().is_none() => {
                let valid = e.valid_up_to();
                let tail = self.pending.split_off(valid);
                let text = String::from_utf8(std::mem::replace(&mut self.pending, tail))
                    .map_err(|e| Error::Decode(e.to_string()))?;
                Ok(text)
            }
            Err(e) => Err(Error::Decode(e.to_string())),
        }
    }

    /// Signal end of input. Fails if a truncated sequence is still pending.
    pub fn finish(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            Ok(())
        } else {
            let len = self.pending.len();
            self.pending.clear();
            Err(Error::Decode(format!(
                "stream ended inside a multi-byte sequence ({len} dangling bytes)"
            )))
        }
    }
}

/// Decode a complete body.
pub fn decode_text(bytes: &[u8]) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| Error::Decode(e.to_string()))
}
