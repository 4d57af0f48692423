//! Integrity and sequencing layer.
//!
//! Wire layout of a datagram inside a frame payload:
//!
//! ```text
//! ┌───────────────┬───────┬──────────┬────────────────┐
//! │ crc32 (4B BE) │ seq   │ length   │ payload        │
//! │               │ (1B)  │ (1B)     │ 0..=248 bytes  │
//! └───────────────┴───────┴──────────┴────────────────┘
//! ```
//!
//! The CRC32-C covers `{seq, length, payload}`. The sender assigns an
//! 8-bit wrapping sequence number; the receiver verifies the CRC (mismatch
//! drops the payload) and tracks sequence continuity. A sequence gap is a
//! soft signal: the payload is still delivered, the receiver resynchronizes
//! to `seq + 1`, and a cumulative gap counter is incremented for the alarms
//! layer. Loss is detected here, never repaired.

use heapless::Vec;

use crate::crc::Crc32;
use crate::frames::FRAME_PAYLOAD_MAX;

/// Datagram header size: crc32 + seq + length.
pub const DATAGRAM_HEADER_SIZE: usize = 4 + 1 + 1;

/// Offset of the CRC-protected region (seq onward).
const PROTECTED_OFFSET: usize = 4;

/// Maximum datagram payload length.
pub const DATAGRAM_PAYLOAD_MAX: usize = FRAME_PAYLOAD_MAX - DATAGRAM_HEADER_SIZE;

/// A datagram payload buffer.
pub type DatagramPayload = Vec<u8, DATAGRAM_PAYLOAD_MAX>;

/// Errors that can occur in the datagram layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DatagramError {
    /// Input shorter than the datagram header
    InvalidParse,
    /// Computed CRC does not match the crc32 field
    InvalidCrc,
    /// The length field disagrees with the payload length, or the payload
    /// exceeds capacity
    InvalidLength,
}

/// Sequence continuity of a received datagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Sequencing {
    /// The sequence number matched the expected one.
    InOrder,
    /// A gap was detected; the receiver resynchronized to `seq + 1` and the
    /// payload was still delivered.
    Gap,
}

/// A parsed datagram.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Datagram {
    pub crc: u32,
    pub seq: u8,
    pub length: u8,
    pub payload: DatagramPayload,
}

impl Datagram {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Parses datagrams out of frame payloads, verifying integrity and
/// tracking sequence continuity.
#[derive(Debug)]
pub struct DatagramReceiver<C: Crc32> {
    expected_seq: u8,
    seq_gaps: u32,
    crc32: C,
}

impl<C: Crc32> DatagramReceiver<C> {
    pub fn new(crc32: C) -> Self {
        Self {
            expected_seq: 0,
            seq_gaps: 0,
            crc32,
        }
    }

    /// Cumulative count of sequence gap events since construction.
    pub fn seq_gaps(&self) -> u32 {
        self.seq_gaps
    }

    /// Parse and verify one frame payload into `datagram`.
    ///
    /// On any error the payload is discarded wholesale; on success the
    /// returned [`Sequencing`] says whether the datagram arrived in order.
    pub fn transform(
        &mut self,
        input: &[u8],
        datagram: &mut Datagram,
    ) -> Result<Sequencing, DatagramError> {
        if input.len() < DATAGRAM_HEADER_SIZE {
            return Err(DatagramError::InvalidParse);
        }

        let crc = u32::from_be_bytes([input[0], input[1], input[2], input[3]]);
        let protected = &input[PROTECTED_OFFSET..];
        if self.crc32.compute(protected) != crc {
            return Err(DatagramError::InvalidCrc);
        }

        let seq = input[4];
        let length = input[5];
        let payload = &input[DATAGRAM_HEADER_SIZE..];
        if length as usize != payload.len() || payload.len() > DATAGRAM_PAYLOAD_MAX {
            return Err(DatagramError::InvalidLength);
        }

        datagram.crc = crc;
        datagram.seq = seq;
        datagram.length = length;
        datagram.payload.clear();
        datagram
            .payload
            .extend_from_slice(payload)
            .map_err(|_| DatagramError::InvalidLength)?;

        let sequencing = if seq == self.expected_seq {
            Sequencing::InOrder
        } else {
            self.seq_gaps = self.seq_gaps.wrapping_add(1);
            Sequencing::Gap
        };
        self.expected_seq = seq.wrapping_add(1);
        Ok(sequencing)
    }
}

/// Wraps payloads into datagrams, assigning sequence numbers.
#[derive(Debug)]
pub struct DatagramSender<C: Crc32> {
    next_seq: u8,
    crc32: C,
}

impl<C: Crc32> DatagramSender<C> {
    pub fn new(crc32: C) -> Self {
        Self { next_seq: 0, crc32 }
    }

    /// Wrap `payload` into a datagram written to `output`.
    ///
    /// The sequence number is consumed only on success.
    pub fn transform<const N: usize>(
        &mut self,
        payload: &[u8],
        output: &mut Vec<u8, N>,
    ) -> Result<(), DatagramError> {
        if payload.len() > DATAGRAM_PAYLOAD_MAX || DATAGRAM_HEADER_SIZE + payload.len() > N {
            return Err(DatagramError::InvalidLength);
        }

        output.clear();
        // Reserve the CRC field; the protected region follows it
        output
            .extend_from_slice(&[0; 4])
            .map_err(|_| DatagramError::InvalidLength)?;
        output.push(self.next_seq).map_err(|_| DatagramError::InvalidLength)?;
        output
            .push(payload.len() as u8)
            .map_err(|_| DatagramError::InvalidLength)?;
        output
            .extend_from_slice(payload)
            .map_err(|_| DatagramError::InvalidLength)?;

        let crc = self.crc32.compute(&output[PROTECTED_OFFSET..]);
        output[..4].copy_from_slice(&crc.to_be_bytes());

        self.next_seq = self.next_seq.wrapping_add(1);
        Ok(())
    }
}
