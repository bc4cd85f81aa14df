//! Bounded, progress-counting reads over a response body stream.

use bytes::Bytes;
use futures_util::{Stream, StreamExt};

use crate::core::Utf8Decoder;
use crate::data::ProgressCounter;
use crate::error::{Error, Result};

/// One decoded slice of the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub text: String,
    /// Raw bytes consumed for this chunk.
    pub len: usize,
    /// Cumulative bytes delivered, including this chunk.
    pub progress: u64,
    pub total: Option<u64>,
}

/// Reads a body in pieces of at most `chunk_size` bytes.
///
/// Transport frames larger than the bound are split; a declared total is
/// never read past, and trailing bytes beyond it are discarded.
pub struct IncrementalReader<S> {
    stream: S,
    chunk_size: usize,
    counter: ProgressCounter,
    decoder: Utf8Decoder,
    buffered: Bytes,
    finished: bool,
}

impl<S, E> IncrementalReader<S>
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Unpin,
    E: std::error::Error,
{
    pub fn new(stream: S, total: Option<u64>, chunk_size: usize) -> Self {
        Self {
            stream,
            chunk_size: chunk_size.max(1),
            counter: ProgressCounter::new(total),
            decoder: Utf8Decoder::new(),
            buffered: Bytes::new(),
            finished: false,
        }
    }

    pub fn progress(&self) -> &ProgressCounter {
        &self.counter
    }

    /// Read the next chunk. `Ok(None)` marks a clean end of stream.
    pub async fn next_chunk(&mut self) -> Result<Option<Chunk>> {
        loop {
            if self.finished {
                return Ok(None);
            }
            if self.counter.is_complete() {
                return self.finish();
            }
            if self.buffered.is_empty() {
                match self.stream.next().await {
                    None => return self.finish(),
                    Some(Err(e)) => return Err(Error::transport(e)),
                    Some(Ok(bytes)) => {
                        self.buffered = bytes;
                        continue;
                    }
                }
            }

            let mut take = self.chunk_size.min(self.buffered.len());
            if let Some(remaining) = self.counter.remaining() {
                take = take.min(usize::try_from(remaining).unwrap_or(usize::MAX));
            }
            let piece = self.buffered.split_to(take);
            let progress = self.counter.advance(piece.len() as u64);
            let text = self.decoder.decode(&piece)?;
            return Ok(Some(Chunk {
                text,
                len: piece.len(),
                progress,
                total: self.counter.total(),
            }));
        }
    }

    fn finish(&mut self) -> Result<Option<Chunk>> {
        self.finished = true;
        self.buffered.clear();
        self.decoder.finish()?;
        Ok(None)
    }
}
