//! Postcard body codecs for every [`StateSegment`] variant.
//!
//! [`message_descriptors`] builds the descriptor table the transport layer
//! parses and serializes through. The table is sized for the full 8-bit tag
//! space so the diagnostic types at 254/255 fit; unfilled slots reject the
//! tag as unrecognized.

use serde::de::DeserializeOwned;
use serde::Serialize;

use pneuma_protocol::messages::{CodecError, Descriptor, DescriptorTable};

use crate::application::messages::{
    ActiveLogEvents, AlarmLimits, AlarmLimitsRequest, AlarmMute, AlarmMuteRequest, Announcement,
    CycleMeasurements, ExpectedLogEvent, MessageType, NextLogEvents, Parameters,
    ParametersRequest, Ping, SensorMeasurements, StateSegment,
};

/// One slot per possible wire tag.
pub const DESCRIPTOR_TABLE_SIZE: usize = 256;

/// The descriptor table type used across the application.
pub type Descriptors = DescriptorTable<StateSegment, DESCRIPTOR_TABLE_SIZE>;

fn encode_body<T: Serialize>(value: &T, buf: &mut [u8]) -> Result<usize, CodecError> {
    postcard::to_slice(value, buf)
        .map(|used| used.len())
        .map_err(|_| CodecError::BufferTooSmall)
}

fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, CodecError> {
    postcard::from_bytes(body).map_err(|_| CodecError::Malformed)
}

macro_rules! segment_descriptor {
    ($variant:ident) => {
        Descriptor {
            encode: |segment, buf| match segment {
                StateSegment::$variant(inner) => encode_body(inner, buf),
                _ => Err(CodecError::Malformed),
            },
            decode: |body| Ok(StateSegment::$variant(decode_body::<$variant>(body)?)),
        }
    };
}

/// Build the codec table covering every [`MessageType`].
pub fn message_descriptors() -> Descriptors {
    let mut table = Descriptors::new();
    table.insert(
        MessageType::SensorMeasurements.wire(),
        segment_descriptor!(SensorMeasurements),
    );
    table.insert(
        MessageType::CycleMeasurements.wire(),
        segment_descriptor!(CycleMeasurements),
    );
    table.insert(MessageType::Parameters.wire(), segment_descriptor!(Parameters));
    table.insert(
        MessageType::ParametersRequest.wire(),
        segment_descriptor!(ParametersRequest),
    );
    table.insert(MessageType::AlarmLimits.wire(), segment_descriptor!(AlarmLimits));
    table.insert(
        MessageType::AlarmLimitsRequest.wire(),
        segment_descriptor!(AlarmLimitsRequest),
    );
    table.insert(
        MessageType::ExpectedLogEvent.wire(),
        segment_descriptor!(ExpectedLogEvent),
    );
    table.insert(MessageType::NextLogEvents.wire(), segment_descriptor!(NextLogEvents));
    table.insert(
        MessageType::ActiveLogEvents.wire(),
        segment_descriptor!(ActiveLogEvents),
    );
    table.insert(MessageType::AlarmMute.wire(), segment_descriptor!(AlarmMute));
    table.insert(
        MessageType::AlarmMuteRequest.wire(),
        segment_descriptor!(AlarmMuteRequest),
    );
    table.insert(MessageType::Ping.wire(), segment_descriptor!(Ping));
    table.insert(MessageType::Announcement.wire(), segment_descriptor!(Announcement));
    table
}
