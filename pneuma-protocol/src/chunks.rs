//! Delimiter-based record boundaries over a raw byte stream.
//!
//! A chunk is a run of non-delimiter bytes terminated by a delimiter byte
//! (default `0x00`), at most [`CHUNK_MAX_SIZE`] bytes including the
//! delimiter. The splitter tolerates oversized input by discarding bytes
//! until the next delimiter and reporting the overflow exactly once, so the
//! stream resynchronizes on its own after a corrupt record.

use heapless::Vec;

use crate::InputStatus;

/// Maximum chunk size in bytes, including the trailing delimiter.
pub const CHUNK_MAX_SIZE: usize = 256;

/// Default chunk delimiter byte.
pub const CHUNK_DELIMITER: u8 = 0x00;

/// Errors that can occur while splitting or merging chunks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChunkError {
    /// Chunk body exceeded the buffer capacity, or no spare capacity for
    /// the delimiter when merging
    InvalidLength,
}

/// Splits delimited chunks from a byte stream.
///
/// Feed bytes with [`input`](Self::input) until it reports
/// [`InputStatus::OutputReady`], then drain the pending chunk with
/// [`output`](Self::output) before feeding further bytes.
#[derive(Debug, Clone)]
pub struct ChunkSplitter<const N: usize = CHUNK_MAX_SIZE> {
    buffer: Vec<u8, N>,
    delimiter: u8,
    ready: bool,
    overflowed: bool,
}

impl<const N: usize> Default for ChunkSplitter<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> ChunkSplitter<N> {
    /// Create a splitter using the default `0x00` delimiter
    pub fn new() -> Self {
        Self::with_delimiter(CHUNK_DELIMITER)
    }

    /// Create a splitter using a custom delimiter byte
    pub fn with_delimiter(delimiter: u8) -> Self {
        Self {
            buffer: Vec::new(),
            delimiter,
            ready: false,
            overflowed: false,
        }
    }

    /// Feed a single byte.
    ///
    /// Returns [`InputStatus::OutputReady`] when the delimiter is seen.
    /// Returns `Err(ChunkError::InvalidLength)` once capacity is exceeded;
    /// subsequent non-delimiter bytes are discarded with the same error
    /// until a delimiter resynchronizes the stream.
    pub fn input(&mut self, byte: u8) -> Result<InputStatus, ChunkError> {
        if byte == self.delimiter {
            self.ready = true;
            return Ok(InputStatus::OutputReady);
        }
        if self.overflowed || self.buffer.push(byte).is_err() {
            self.overflowed = true;
            return Err(ChunkError::InvalidLength);
        }
        Ok(InputStatus::Accumulating)
    }

    /// Drain the pending chunk.
    ///
    /// Returns `Ok(None)` while no complete chunk is pending. If the
    /// pending chunk overflowed, returns `Err(ChunkError::InvalidLength)`
    /// exactly once and resets for the next chunk.
    pub fn output(&mut self) -> Result<Option<Vec<u8, N>>, ChunkError> {
        if !self.ready {
            return Ok(None);
        }
        self.ready = false;
        if self.overflowed {
            self.overflowed = false;
            self.buffer.clear();
            return Err(ChunkError::InvalidLength);
        }
        Ok(Some(core::mem::take(&mut self.buffer)))
    }
}

/// Merges chunks into a stream by appending the delimiter in place.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChunkMerger {
    delimiter: u8,
}

impl ChunkMerger {
    /// Create a merger using the default `0x00` delimiter
    pub fn new() -> Self {
        Self {
            delimiter: CHUNK_DELIMITER,
        }
    }

    /// Append the delimiter to `buffer` in place.
    ///
    /// Fails with `ChunkError::InvalidLength` if the buffer has no spare
    /// capacity, leaving the buffer unmodified.
    pub fn transform<const N: usize>(&self, buffer: &mut Vec<u8, N>) -> Result<(), ChunkError> {
        buffer
            .push(self.delimiter)
            .map_err(|_| ChunkError::InvalidLength)
    }
}
