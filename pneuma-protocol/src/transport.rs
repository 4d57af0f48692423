//! Transport composition: frame → datagram → message.
//!
//! [`Receiver`] turns a byte stream into typed messages; [`Sender`] turns a
//! payload into one wire-ready chunk. Exactly one message comes out per
//! frame that goes in. A frame that fails any stage is dropped — never
//! retried — and the receiver returns to awaiting the next frame;
//! resilience against loss is the state-synchronization layer's job.

use crate::crc::Crc32;
use crate::datagrams::{
    Datagram, DatagramError, DatagramPayload, DatagramReceiver, DatagramSender, Sequencing,
};
use crate::frames::{ChunkBuffer, FrameError, FramePayload, FrameReceiver, FrameSender};
use crate::messages::{
    DescriptorTable, Message, MessageError, MessageReceiver, MessageSender, Tagged,
};
use crate::InputStatus;

/// Errors that can drop an inbound frame, verbatim from the failing layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReceiveError {
    Frame(FrameError),
    Datagram(DatagramError),
    Message(MessageError),
}

impl From<FrameError> for ReceiveError {
    fn from(e: FrameError) -> Self {
        ReceiveError::Frame(e)
    }
}

impl From<DatagramError> for ReceiveError {
    fn from(e: DatagramError) -> Self {
        ReceiveError::Datagram(e)
    }
}

impl From<MessageError> for ReceiveError {
    fn from(e: MessageError) -> Self {
        ReceiveError::Message(e)
    }
}

/// Errors that can fail an outbound transform, verbatim from the failing
/// layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SendError {
    Message(MessageError),
    Datagram(DatagramError),
    Frame(FrameError),
}

impl From<MessageError> for SendError {
    fn from(e: MessageError) -> Self {
        SendError::Message(e)
    }
}

impl From<DatagramError> for SendError {
    fn from(e: DatagramError) -> Self {
        SendError::Datagram(e)
    }
}

impl From<FrameError> for SendError {
    fn from(e: FrameError) -> Self {
        SendError::Frame(e)
    }
}

/// Delivery note for a successfully received message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Received {
    /// Sequence number matched expectations.
    InOrder,
    /// One or more preceding datagrams were lost; the message itself is
    /// intact and was delivered.
    AfterSeqGap,
}

/// Receives typed messages from a byte stream.
pub struct Receiver<'a, S, C: Crc32, const N: usize> {
    frame: FrameReceiver,
    datagram: DatagramReceiver<C>,
    message: MessageReceiver<'a, S, N>,
    scratch: Datagram,
}

impl<'a, S, C: Crc32, const N: usize> Receiver<'a, S, C, N> {
    pub fn new(crc32: C, descriptors: &'a DescriptorTable<S, N>) -> Self {
        Self {
            frame: FrameReceiver::new(),
            datagram: DatagramReceiver::new(crc32),
            message: MessageReceiver::new(descriptors),
            scratch: Datagram::new(),
        }
    }

    /// Cumulative sequence gap count, for link statistics/alarms.
    pub fn seq_gaps(&self) -> u32 {
        self.datagram.seq_gaps()
    }

    /// Feed one byte from the link.
    ///
    /// Call until it reports [`InputStatus::OutputReady`], then call
    /// [`output`](Self::output).
    pub fn input(&mut self, byte: u8) -> Result<InputStatus, ReceiveError> {
        Ok(self.frame.input(byte)?)
    }

    /// Run the rest of the pipeline on the pending frame.
    ///
    /// Returns `Ok(None)` while no frame is pending. On success the decoded
    /// message is in `message` and the [`Received`] note reports sequence
    /// continuity. On error the frame is dropped and the receiver is ready
    /// for the next frame.
    pub fn output(&mut self, message: &mut Message<S>) -> Result<Option<Received>, ReceiveError> {
        let payload: FramePayload = match self.frame.output()? {
            Some(payload) => payload,
            None => return Ok(None),
        };
        let sequencing = self.datagram.transform(&payload, &mut self.scratch)?;
        self.message.transform(&self.scratch.payload, message)?;
        Ok(Some(match sequencing {
            Sequencing::InOrder => Received::InOrder,
            Sequencing::Gap => Received::AfterSeqGap,
        }))
    }
}

/// Sends typed payloads as wire-ready chunks.
pub struct Sender<'a, S: Tagged, C: Crc32, const N: usize> {
    message: MessageSender<'a, S, N>,
    datagram: DatagramSender<C>,
    frame: FrameSender,
}

impl<'a, S: Tagged, C: Crc32, const N: usize> Sender<'a, S, C, N> {
    pub fn new(crc32: C, descriptors: &'a DescriptorTable<S, N>) -> Self {
        Self {
            message: MessageSender::new(descriptors),
            datagram: DatagramSender::new(crc32),
            frame: FrameSender::new(),
        }
    }

    /// Serialize `payload` into one delimited chunk ready for the UART.
    pub fn transform(&mut self, payload: &S, output: &mut ChunkBuffer) -> Result<(), SendError> {
        let mut message_buffer: DatagramPayload = DatagramPayload::new();
        self.message.transform(payload, &mut message_buffer)?;
        let mut datagram_buffer: FramePayload = FramePayload::new();
        self.datagram.transform(&message_buffer, &mut datagram_buffer)?;
        self.frame.transform(&datagram_buffer, output)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crc::SoftCrc32c;
    use crate::messages::{CodecError, Descriptor};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    enum TestSegment {
        #[default]
        Heartbeat,
        Reading(u16),
    }

    impl Tagged for TestSegment {
        fn tag(&self) -> u8 {
            match self {
                TestSegment::Heartbeat => 0,
                TestSegment::Reading(_) => 1,
            }
        }
    }

    fn table() -> DescriptorTable<TestSegment, 2> {
        let mut table = DescriptorTable::new();
        table.insert(
            0,
            Descriptor {
                encode: |_, _| Ok(0),
                decode: |body| {
                    if body.is_empty() {
                        Ok(TestSegment::Heartbeat)
                    } else {
                        Err(CodecError::Malformed)
                    }
                },
            },
        );
        table.insert(
            1,
            Descriptor {
                encode: |segment, buf| match segment {
                    TestSegment::Reading(v) => {
                        if buf.len() < 2 {
                            return Err(CodecError::BufferTooSmall);
                        }
                        buf[..2].copy_from_slice(&v.to_be_bytes());
                        Ok(2)
                    }
                    _ => Err(CodecError::Malformed),
                },
                decode: |body| match body {
                    [hi, lo] => Ok(TestSegment::Reading(u16::from_be_bytes([*hi, *lo]))),
                    _ => Err(CodecError::Malformed),
                },
            },
        );
        table
    }

    fn pump(
        receiver: &mut Receiver<TestSegment, SoftCrc32c, 2>,
        wire: &[u8],
    ) -> Result<Option<(Received, Message<TestSegment>)>, ReceiveError> {
        let mut result = None;
        for &byte in wire {
            if receiver.input(byte)? == InputStatus::OutputReady {
                let mut message = Message::default();
                if let Some(note) = receiver.output(&mut message)? {
                    result = Some((note, message));
                }
            }
        }
        Ok(result)
    }

    #[test]
    fn test_end_to_end_roundtrip() {
        let table = table();
        let mut sender = Sender::new(SoftCrc32c::new(), &table);
        let mut receiver = Receiver::new(SoftCrc32c::new(), &table);

        let mut wire = ChunkBuffer::new();
        sender.transform(&TestSegment::Reading(1234), &mut wire).unwrap();

        let (note, message) = pump(&mut receiver, &wire).unwrap().unwrap();
        assert_eq!(note, Received::InOrder);
        assert_eq!(message.message_type, 1);
        assert_eq!(message.payload, TestSegment::Reading(1234));
    }

    #[test]
    fn test_corrupt_frame_dropped_link_stays_live() {
        let table = table();
        let mut sender = Sender::new(SoftCrc32c::new(), &table);
        let mut receiver = Receiver::new(SoftCrc32c::new(), &table);

        let mut wire = ChunkBuffer::new();
        sender.transform(&TestSegment::Reading(7), &mut wire).unwrap();
        // Corrupt a body byte with a non-zero value so the chunk boundary
        // stays intact and only the frame content is damaged
        wire[1] = if wire[1] == 0xAA { 0xAB } else { 0xAA };

        let mut error = None;
        for &byte in wire.iter() {
            match receiver.input(byte) {
                Ok(InputStatus::OutputReady) => {
                    let mut message = Message::default();
                    if let Err(e) = receiver.output(&mut message) {
                        error = Some(e);
                    }
                }
                Ok(InputStatus::Accumulating) => {}
                Err(e) => error = Some(e),
            }
        }
        assert!(error.is_some(), "corrupted frame must be rejected");

        // Next frame decodes; the gap from the dropped datagram is noted
        let mut wire = ChunkBuffer::new();
        sender.transform(&TestSegment::Reading(8), &mut wire).unwrap();
        let (note, message) = pump(&mut receiver, &wire).unwrap().unwrap();
        assert_eq!(note, Received::AfterSeqGap);
        assert_eq!(message.payload, TestSegment::Reading(8));
        assert_eq!(receiver.seq_gaps(), 1);
    }

    #[test]
    fn test_one_message_per_frame() {
        let table = table();
        let mut sender = Sender::new(SoftCrc32c::new(), &table);
        let mut receiver = Receiver::new(SoftCrc32c::new(), &table);

        let mut wire = ChunkBuffer::new();
        sender.transform(&TestSegment::Heartbeat, &mut wire).unwrap();
        let result = pump(&mut receiver, &wire).unwrap();
        assert!(result.is_some());

        // No second output for the same frame
        let mut message = Message::default();
        assert_eq!(receiver.output(&mut message), Ok(None));
    }

    #[test]
    fn test_unknown_type_surfaced_verbatim() {
        let table = table();
        let mut receiver = Receiver::new(SoftCrc32c::new(), &table);

        // Hand-build a datagram carrying type byte 9 (beyond the table)
        let mut datagram_sender = DatagramSender::new(SoftCrc32c::new());
        let mut datagram_buffer = FramePayload::new();
        datagram_sender.transform(&[9u8], &mut datagram_buffer).unwrap();
        let mut wire = ChunkBuffer::new();
        FrameSender::new().transform(&datagram_buffer, &mut wire).unwrap();

        let result = pump(&mut receiver, &wire);
        assert_eq!(result, Err(ReceiveError::Message(MessageError::InvalidType)));
    }
}
