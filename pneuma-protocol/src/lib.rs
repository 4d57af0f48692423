//! Serial transport protocol stack for the Pneuma ventilator controller.
//!
//! This crate implements the layered protocol carrying ventilator state
//! between the control computer (MCU) and its companion computer over an
//! unreliable point-to-point byte link. Every layer is statically
//! allocated, non-blocking, and returns a status immediately.
//!
//! # Layers (leaf to root)
//!
//! ```text
//! byte stream
//!   └─ chunks:    delimiter-bounded records        (ChunkSplitter/ChunkMerger)
//!       └─ cobs:  zero-byte elimination            (cobs::encode/decode)
//!           └─ frames:   chunking + COBS composed  (FrameReceiver/FrameSender)
//!               └─ datagrams: CRC32-C + seq number (DatagramReceiver/DatagramSender)
//!                   └─ messages: type byte + body  (MessageReceiver/MessageSender)
//!                       └─ transport: the pipeline (Receiver/Sender)
//! ```
//!
//! Loss is detected here (CRC mismatch, sequence gaps) but never repaired:
//! corrupted frames are dropped and the state-synchronization layer above
//! re-sends current state periodically. Protocol objects are owned by a
//! single cooperative poll loop; only the raw byte ring buffer beneath this
//! stack is shared with the UART interrupt handler.

#![cfg_attr(not(any(feature = "std", test)), no_std)]
#![deny(unsafe_code)]

pub mod chunks;
pub mod cobs;
pub mod crc;
pub mod datagrams;
pub mod frames;
pub mod messages;
pub mod transport;

pub use chunks::{ChunkError, ChunkMerger, ChunkSplitter, CHUNK_MAX_SIZE};
pub use crc::{Crc32, SoftCrc32c};
pub use datagrams::{
    Datagram, DatagramError, DatagramReceiver, DatagramSender, Sequencing, DATAGRAM_PAYLOAD_MAX,
};
pub use frames::{FrameError, FramePayload, FrameReceiver, FrameSender, FRAME_PAYLOAD_MAX};
pub use messages::{
    CodecError, Descriptor, DescriptorTable, Message, MessageError, MessageReceiver,
    MessageSender, Tagged, MESSAGE_PAYLOAD_MAX,
};
pub use transport::{Received, ReceiveError, Receiver, SendError, Sender};

/// Result of feeding one byte into a receive-side state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputStatus {
    /// Byte absorbed; more bytes are needed.
    Accumulating,
    /// A complete record is pending; call `output()` before feeding more.
    OutputReady,
}
