//! Message layer: a type byte plus a codec-encoded body.
//!
//! The body codec is injected as a [`DescriptorTable`]: one encode/decode
//! function pair per message type ordinal, constructed by the composition
//! root and passed by reference. Tables may legitimately cover only a
//! subset of the type space (protocol version skew, test doubles); an
//! unknown type byte is a tolerated condition, not a fault.

use heapless::Vec;

use crate::datagrams::DATAGRAM_PAYLOAD_MAX;

/// Message header size: the type byte.
pub const MESSAGE_HEADER_SIZE: usize = 1;

/// Maximum encoded message body length.
pub const MESSAGE_PAYLOAD_MAX: usize = DATAGRAM_PAYLOAD_MAX - MESSAGE_HEADER_SIZE;

/// Errors surfaced by an injected body codec
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CodecError {
    /// Output buffer too small for the encoded body
    BufferTooSmall,
    /// Body bytes do not decode to a value of the expected type
    Malformed,
}

/// Errors that can occur in the message layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MessageError {
    /// Input empty, or encoded body too large for the output buffer
    InvalidLength,
    /// Type byte out of table range, or mapped to no descriptor
    InvalidType,
    /// Body failed to decode; the payload must be treated as unusable
    InvalidEncoding,
}

/// A payload that knows its wire type tag.
pub trait Tagged {
    fn tag(&self) -> u8;
}

/// Body codec for one message type.
pub struct Descriptor<S> {
    /// Encode the payload body into `buf`, returning the encoded length.
    pub encode: fn(&S, &mut [u8]) -> Result<usize, CodecError>,
    /// Decode a payload from the body bytes.
    pub decode: fn(&[u8]) -> Result<S, CodecError>,
}

impl<S> Clone for Descriptor<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for Descriptor<S> {}

impl<S> core::fmt::Debug for Descriptor<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Descriptor")
    }
}

/// Type-ordinal → body-codec table.
///
/// Unfilled entries are "unrecognized" placeholders; looking them up fails
/// the same way as an out-of-range type byte.
#[derive(Debug)]
pub struct DescriptorTable<S, const N: usize> {
    entries: [Option<Descriptor<S>>; N],
}

impl<S, const N: usize> Default for DescriptorTable<S, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, const N: usize> DescriptorTable<S, N> {
    pub const fn new() -> Self {
        Self { entries: [None; N] }
    }

    /// Register the codec for a type ordinal. Ordinals at or beyond the
    /// table size are ignored (the table is a declared subset of the type
    /// space).
    pub fn insert(&mut self, tag: u8, descriptor: Descriptor<S>) {
        if let Some(slot) = self.entries.get_mut(tag as usize) {
            *slot = Some(descriptor);
        }
    }

    pub fn get(&self, tag: u8) -> Option<&Descriptor<S>> {
        self.entries.get(tag as usize).and_then(|e| e.as_ref())
    }
}

/// A typed message: wire type byte plus decoded payload.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Message<S> {
    /// The observed wire type byte. Updated on every parse, even a failed
    /// one, so callers can report what arrived.
    pub message_type: u8,
    /// The decoded payload. Updated only on a successful parse.
    pub payload: S,
}

impl<S: Tagged> Message<S> {
    pub fn new(payload: S) -> Self {
        Self {
            message_type: payload.tag(),
            payload,
        }
    }
}

/// Parses message bodies through a descriptor table.
#[derive(Debug)]
pub struct MessageReceiver<'a, S, const N: usize> {
    descriptors: &'a DescriptorTable<S, N>,
}

impl<'a, S, const N: usize> MessageReceiver<'a, S, N> {
    pub fn new(descriptors: &'a DescriptorTable<S, N>) -> Self {
        Self { descriptors }
    }

    /// Parse `input` into `message`.
    ///
    /// `message.message_type` is set to the observed type byte before any
    /// validation; `message.payload` is replaced only on success.
    pub fn transform(&self, input: &[u8], message: &mut Message<S>) -> Result<(), MessageError> {
        let (&type_byte, body) = input.split_first().ok_or(MessageError::InvalidLength)?;
        message.message_type = type_byte;

        let descriptor = self.descriptors.get(type_byte).ok_or(MessageError::InvalidType)?;
        let payload = (descriptor.decode)(body).map_err(|e| match e {
            CodecError::Malformed => MessageError::InvalidEncoding,
            CodecError::BufferTooSmall => MessageError::InvalidLength,
        })?;
        message.payload = payload;
        Ok(())
    }
}

/// Serializes payloads through a descriptor table.
#[derive(Debug)]
pub struct MessageSender<'a, S, const N: usize> {
    descriptors: &'a DescriptorTable<S, N>,
}

impl<'a, S: Tagged, const N: usize> MessageSender<'a, S, N> {
    pub fn new(descriptors: &'a DescriptorTable<S, N>) -> Self {
        Self { descriptors }
    }

    /// Serialize `payload` as `{type byte, body}` into `output`.
    pub fn transform<const M: usize>(
        &self,
        payload: &S,
        output: &mut Vec<u8, M>,
    ) -> Result<(), MessageError> {
        let tag = payload.tag();
        let descriptor = self.descriptors.get(tag).ok_or(MessageError::InvalidType)?;

        output.clear();
        output.push(tag).map_err(|_| MessageError::InvalidLength)?;
        output
            .resize(M, 0)
            .map_err(|_| MessageError::InvalidLength)?;
        let body_len = (descriptor.encode)(payload, &mut output[MESSAGE_HEADER_SIZE..])
            .map_err(|_| MessageError::InvalidLength)?;
        output.truncate(MESSAGE_HEADER_SIZE + body_len);
        Ok(())
    }
}
