//! Frame layer: chunking and COBS composed.
//!
//! A frame on the wire is a COBS-encoded body followed by the `0x00` chunk
//! delimiter. [`FrameReceiver`] splits chunks out of the byte stream and
//! COBS-decodes them; [`FrameSender`] COBS-encodes a payload and appends
//! the delimiter. Whatever the outcome of decoding, the receiver resets
//! for the next frame, so a corrupt frame costs exactly one record.

use heapless::Vec;

use crate::chunks::{ChunkError, ChunkMerger, ChunkSplitter, CHUNK_MAX_SIZE};
use crate::cobs::{self, CobsError};
use crate::InputStatus;

/// Maximum decoded frame payload length.
pub const FRAME_PAYLOAD_MAX: usize = CHUNK_MAX_SIZE - 2;

/// A decoded frame payload.
pub type FramePayload = Vec<u8, FRAME_PAYLOAD_MAX>;

/// A wire-ready chunk buffer (COBS body plus delimiter).
pub type ChunkBuffer = Vec<u8, CHUNK_MAX_SIZE>;

/// Errors that can occur in the frame layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Chunk exceeded the maximum chunk size
    InvalidChunkLength,
    /// COBS body was malformed or decoded past the payload capacity
    InvalidCobsLength,
}

impl From<ChunkError> for FrameError {
    fn from(_: ChunkError) -> Self {
        FrameError::InvalidChunkLength
    }
}

impl From<CobsError> for FrameError {
    fn from(_: CobsError) -> Self {
        FrameError::InvalidCobsLength
    }
}

/// Receives frames from a byte stream: chunk splitting, then COBS decoding.
#[derive(Debug, Clone, Default)]
pub struct FrameReceiver {
    splitter: ChunkSplitter<CHUNK_MAX_SIZE>,
}

impl FrameReceiver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a single byte from the stream.
    pub fn input(&mut self, byte: u8) -> Result<InputStatus, FrameError> {
        Ok(self.splitter.input(byte)?)
    }

    /// Decode the pending chunk into a frame payload.
    ///
    /// Returns `Ok(None)` while no chunk is pending; calling this twice for
    /// one frame yields `Ok(None)` the second time. Decoding failures
    /// surface as [`FrameError`] and the receiver still resets for the
    /// next frame.
    pub fn output(&mut self) -> Result<Option<FramePayload>, FrameError> {
        let chunk = match self.splitter.output()? {
            Some(chunk) => chunk,
            None => return Ok(None),
        };
        let mut payload = FramePayload::new();
        cobs::decode(&chunk, &mut payload)?;
        Ok(Some(payload))
    }
}

/// Sends frames onto a byte stream: COBS encoding, then chunk merging.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameSender {
    merger: ChunkMerger,
}

impl FrameSender {
    pub fn new() -> Self {
        Self {
            merger: ChunkMerger::new(),
        }
    }

    /// Encode `payload` into a delimited, wire-ready chunk.
    pub fn transform(&self, payload: &[u8], output: &mut ChunkBuffer) -> Result<(), FrameError> {
        cobs::encode(payload, output)?;
        self.merger.transform(output)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_receiver_literal_frame() {
        // 0x03 0x11 0x22 0x02 0x33 0x00 decodes to 0x11 0x22 0x00 0x33
        let mut receiver = FrameReceiver::new();
        let bytes = [0x03, 0x11, 0x22, 0x02, 0x33];
        for byte in bytes {
            assert_eq!(receiver.input(byte), Ok(InputStatus::Accumulating));
        }
        assert_eq!(receiver.input(0x00), Ok(InputStatus::OutputReady));

        let payload = receiver.output().unwrap().unwrap();
        assert_eq!(&payload[..], &[0x11, 0x22, 0x00, 0x33]);

        // Exactly one output per frame
        assert_eq!(receiver.output(), Ok(None));
    }

    #[test]
    fn test_receiver_malformed_cobs_resets() {
        let mut receiver = FrameReceiver::new();
        // Code 0x05 claims more bytes than the chunk holds
        for byte in [0x05, 0x11] {
            receiver.input(byte).unwrap();
        }
        receiver.input(0x00).unwrap();
        assert_eq!(receiver.output(), Err(FrameError::InvalidCobsLength));

        // The next frame is unaffected
        receiver.input(0x02).unwrap();
        receiver.input(0x42).unwrap();
        receiver.input(0x00).unwrap();
        let payload = receiver.output().unwrap().unwrap();
        assert_eq!(&payload[..], &[0x42]);
    }

    #[test]
    fn test_sender_produces_delimited_chunk() {
        let sender = FrameSender::new();
        let mut output = ChunkBuffer::new();
        sender.transform(&[0x11, 0x22, 0x00, 0x33], &mut output).unwrap();
        assert_eq!(&output[..], &[0x03, 0x11, 0x22, 0x02, 0x33, 0x00]);
    }

    #[test]
    fn test_sender_rejects_oversized_payload() {
        let sender = FrameSender::new();
        let mut output = ChunkBuffer::new();
        let payload = [0u8; FRAME_PAYLOAD_MAX + 1];
        assert_eq!(
            sender.transform(&payload, &mut output),
            Err(FrameError::InvalidCobsLength)
        );
    }

    proptest! {
        #[test]
        fn test_roundtrip_any_payload(payload in proptest::collection::vec(any::<u8>(), 0..=FRAME_PAYLOAD_MAX)) {
            let sender = FrameSender::new();
            let mut wire = ChunkBuffer::new();
            sender.transform(&payload, &mut wire).unwrap();

            let mut receiver = FrameReceiver::new();
            let mut received = None;
            for &byte in wire.iter() {
                if receiver.input(byte).unwrap() == InputStatus::OutputReady {
                    received = receiver.output().unwrap();
                }
            }
            let received = received.expect("frame should complete at the delimiter");
            prop_assert_eq!(&received[..], &payload[..]);
        }
    }
}
