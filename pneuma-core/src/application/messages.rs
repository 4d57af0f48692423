//! Application message types and their wire type tags.
//!
//! Each state segment the controller exchanges with the backend gets one
//! wire type byte; [`StateSegment`] is the sum of all of them, and is what
//! flows through the transport's descriptor table. Tag values are protocol
//! ABI shared with the backend and must never be renumbered.

use heapless::Vec;
use serde::{Deserialize, Serialize};

use pneuma_protocol::Tagged;

use crate::util::containers::Ordinal;

/// Elements carried per next-log-events segment.
pub const LOG_EVENTS_SEGMENT_MAX: usize = 4;

/// Maximum concurrently active log events.
pub const ACTIVE_LOG_EVENTS_MAX: usize = 32;

/// Maximum announcement body length.
pub const ANNOUNCEMENT_MAX: usize = 64;

/// Wire type tags for every exchangeable state segment.
///
/// Tags 0 and 1 are reserved; 254/255 are link-diagnostic types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum MessageType {
    SensorMeasurements = 2,
    CycleMeasurements = 3,
    Parameters = 4,
    ParametersRequest = 5,
    AlarmLimits = 6,
    AlarmLimitsRequest = 7,
    ExpectedLogEvent = 8,
    NextLogEvents = 9,
    ActiveLogEvents = 10,
    AlarmMute = 11,
    AlarmMuteRequest = 12,
    Ping = 254,
    Announcement = 255,
}

impl MessageType {
    pub const fn wire(self) -> u8 {
        self as u8
    }
}

impl Ordinal for MessageType {
    const COUNT: usize = 13;

    fn ordinal(self) -> usize {
        match self {
            MessageType::SensorMeasurements => 0,
            MessageType::CycleMeasurements => 1,
            MessageType::Parameters => 2,
            MessageType::ParametersRequest => 3,
            MessageType::AlarmLimits => 4,
            MessageType::AlarmLimitsRequest => 5,
            MessageType::ExpectedLogEvent => 6,
            MessageType::NextLogEvents => 7,
            MessageType::ActiveLogEvents => 8,
            MessageType::AlarmMute => 9,
            MessageType::AlarmMuteRequest => 10,
            MessageType::Ping => 11,
            MessageType::Announcement => 12,
        }
    }
}

/// Ventilation mode selected through [`ParametersRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VentilationMode {
    /// Pressure control, assist-control.
    #[default]
    PcAc,
    /// High-flow nasal cannula.
    Hfnc,
}

/// Streaming sensor readings, sent every realtime slot.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorMeasurements {
    pub time: u64,
    pub cycle: u32,
    pub fio2: f32,
    pub spo2: f32,
    pub hr: f32,
    pub paw: f32,
    pub flow: f32,
    pub volume: f32,
}

/// Per-breath-cycle derived measurements.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CycleMeasurements {
    pub time: u64,
    pub vt: f32,
    pub rr: f32,
    pub peep: f32,
    pub pip: f32,
    pub ip: f32,
    pub ve: f32,
}

/// Operational settings in force on the controller.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Parameters {
    pub time: u64,
    pub ventilating: bool,
    pub mode: VentilationMode,
    pub fio2: f32,
    pub flow: f32,
    pub pip: f32,
    pub peep: f32,
    pub vt: f32,
    pub rr: f32,
    pub ie: f32,
}

/// Settings the backend asks the controller to adopt. The controller
/// clamps and validates before folding them into [`Parameters`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ParametersRequest {
    pub time: u64,
    pub ventilating: bool,
    pub mode: VentilationMode,
    pub fio2: f32,
    pub flow: f32,
    pub pip: f32,
    pub peep: f32,
    pub vt: f32,
    pub rr: f32,
    pub ie: f32,
}

/// An inclusive alarm band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Range {
    pub lower: i32,
    pub upper: i32,
}

/// Alarm bands in force on the controller.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlarmLimits {
    pub time: u64,
    pub fio2: Range,
    pub flow: Range,
    pub spo2: Range,
    pub hr: Range,
}

/// Alarm bands the backend asks the controller to adopt.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlarmLimitsRequest {
    pub time: u64,
    pub fio2: Range,
    pub flow: Range,
    pub spo2: Range,
    pub hr: Range,
}

/// What happened, for an entry in the event log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LogEventCode {
    #[default]
    Fio2TooLow,
    Fio2TooHigh,
    Spo2TooLow,
    Spo2TooHigh,
    HrTooLow,
    HrTooHigh,
    FlowTooLow,
    FlowTooHigh,
    VentilationOperationChanged,
    VentilationModeChanged,
    Fio2SettingChanged,
    FlowSettingChanged,
    AlarmLimitsChanged,
    AlarmsMuted,
    AlarmsUnmuted,
    BackendConnectionDown,
    BackendConnectionUp,
}

/// Which subsystem an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LogEventType {
    #[default]
    Patient,
    Control,
    Alarms,
    System,
}

/// One entry in the controller's event log.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LogEvent {
    /// Monotonically increasing within a session.
    pub id: u32,
    pub time: u64,
    pub code: LogEventCode,
    pub event_type: LogEventType,
    /// Band in force when a threshold event fired.
    pub alarm_limits: Range,
    pub old_value: f32,
    pub new_value: f32,
}

impl crate::sync::lists::ListElement for LogEvent {
    fn id(&self) -> u32 {
        self.id
    }
}

/// Backend acknowledgement of log delivery: the next event id it expects,
/// within the session it has been following.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ExpectedLogEvent {
    pub id: u32,
    pub session_id: u32,
}

/// A segment of the event log, sent controller → backend.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NextLogEvents {
    pub next_expected: u32,
    /// Events produced over the lifetime of this controller process.
    pub total: u32,
    /// Unacknowledged events still buffered, including these elements.
    pub remaining: u32,
    pub session_id: u32,
    pub elements: Vec<LogEvent, LOG_EVENTS_SEGMENT_MAX>,
}

/// Ids of log events whose condition is still active.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ActiveLogEvents {
    pub id: Vec<u32, ACTIVE_LOG_EVENTS_MAX>,
}

/// Alarm mute state in force on the controller.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlarmMute {
    pub active: bool,
    /// Seconds until the mute auto-expires.
    pub remaining: f32,
}

/// Mute state the backend asks the controller to adopt.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlarmMuteRequest {
    pub active: bool,
    pub remaining: f32,
}

/// Link liveness probe.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Ping {
    pub time: u64,
    pub id: u32,
}

/// Free-form broadcast, mostly for bring-up diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Announcement {
    pub time: u64,
    pub announcement: Vec<u8, ANNOUNCEMENT_MAX>,
}

/// The sum of every state segment that can cross the wire.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StateSegment {
    SensorMeasurements(SensorMeasurements),
    CycleMeasurements(CycleMeasurements),
    Parameters(Parameters),
    ParametersRequest(ParametersRequest),
    AlarmLimits(AlarmLimits),
    AlarmLimitsRequest(AlarmLimitsRequest),
    ExpectedLogEvent(ExpectedLogEvent),
    NextLogEvents(NextLogEvents),
    ActiveLogEvents(ActiveLogEvents),
    AlarmMute(AlarmMute),
    AlarmMuteRequest(AlarmMuteRequest),
    Ping(Ping),
    Announcement(Announcement),
}

impl Default for StateSegment {
    fn default() -> Self {
        StateSegment::SensorMeasurements(SensorMeasurements::default())
    }
}

impl StateSegment {
    pub fn message_type(&self) -> MessageType {
        match self {
            StateSegment::SensorMeasurements(_) => MessageType::SensorMeasurements,
            StateSegment::CycleMeasurements(_) => MessageType::CycleMeasurements,
            StateSegment::Parameters(_) => MessageType::Parameters,
            StateSegment::ParametersRequest(_) => MessageType::ParametersRequest,
            StateSegment::AlarmLimits(_) => MessageType::AlarmLimits,
            StateSegment::AlarmLimitsRequest(_) => MessageType::AlarmLimitsRequest,
            StateSegment::ExpectedLogEvent(_) => MessageType::ExpectedLogEvent,
            StateSegment::NextLogEvents(_) => MessageType::NextLogEvents,
            StateSegment::ActiveLogEvents(_) => MessageType::ActiveLogEvents,
            StateSegment::AlarmMute(_) => MessageType::AlarmMute,
            StateSegment::AlarmMuteRequest(_) => MessageType::AlarmMuteRequest,
            StateSegment::Ping(_) => MessageType::Ping,
            StateSegment::Announcement(_) => MessageType::Announcement,
        }
    }
}

impl Tagged for StateSegment {
    fn tag(&self) -> u8 {
        self.message_type().wire()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_tags_are_protocol_abi() {
        assert_eq!(MessageType::SensorMeasurements.wire(), 2);
        assert_eq!(MessageType::CycleMeasurements.wire(), 3);
        assert_eq!(MessageType::Parameters.wire(), 4);
        assert_eq!(MessageType::ParametersRequest.wire(), 5);
        assert_eq!(MessageType::AlarmLimits.wire(), 6);
        assert_eq!(MessageType::AlarmLimitsRequest.wire(), 7);
        assert_eq!(MessageType::ExpectedLogEvent.wire(), 8);
        assert_eq!(MessageType::NextLogEvents.wire(), 9);
        assert_eq!(MessageType::ActiveLogEvents.wire(), 10);
        assert_eq!(MessageType::AlarmMute.wire(), 11);
        assert_eq!(MessageType::AlarmMuteRequest.wire(), 12);
        assert_eq!(MessageType::Ping.wire(), 254);
        assert_eq!(MessageType::Announcement.wire(), 255);
    }

    #[test]
    fn test_ordinals_are_dense() {
        let all = [
            MessageType::SensorMeasurements,
            MessageType::CycleMeasurements,
            MessageType::Parameters,
            MessageType::ParametersRequest,
            MessageType::AlarmLimits,
            MessageType::AlarmLimitsRequest,
            MessageType::ExpectedLogEvent,
            MessageType::NextLogEvents,
            MessageType::ActiveLogEvents,
            MessageType::AlarmMute,
            MessageType::AlarmMuteRequest,
            MessageType::Ping,
            MessageType::Announcement,
        ];
        assert_eq!(all.len(), MessageType::COUNT);
        for (i, ty) in all.iter().enumerate() {
            assert_eq!(ty.ordinal(), i);
        }
    }

    #[test]
    fn test_segment_tag_matches_message_type() {
        let segment = StateSegment::Parameters(Parameters::default());
        assert_eq!(segment.tag(), 4);
        assert_eq!(segment.message_type(), MessageType::Parameters);
    }
}
